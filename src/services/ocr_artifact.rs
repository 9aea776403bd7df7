use diesel::prelude::*;

use crate::db::PgPool;
use crate::domain::ocr::OcrResult;
use crate::error::{AppError, AppResult};
use crate::models::{NewOcrArtifact, OcrArtifact};
use crate::schema::ocr_artifacts;

/// Append-only: a scan never overwrites a prior artifact, it adds a new
/// one. The "current" artifact for a document is whichever has the latest
/// `timestamp`.
pub struct OcrArtifactService {
    pool: PgPool,
}

impl OcrArtifactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, document_id: i32, result: &OcrResult) -> AppResult<OcrArtifact> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let result_value = serde_json::to_value(result)?;
        let new_artifact = NewOcrArtifact {
            document_id,
            result: result_value,
        };
        let artifact = diesel::insert_into(ocr_artifacts::table)
            .values(&new_artifact)
            .get_result(&mut conn)?;
        Ok(artifact)
    }

    pub fn latest(&self, document_id: i32) -> AppResult<Option<OcrArtifact>> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let artifact = ocr_artifacts::table
            .filter(ocr_artifacts::document_id.eq(document_id))
            .order(ocr_artifacts::timestamp.desc())
            .first(&mut conn)
            .optional()?;
        Ok(artifact)
    }
}
