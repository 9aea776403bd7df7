pub mod pool;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::db::PgPool;
use crate::domain::project_config::ProjectConfig;
use crate::error::AppResult;
use crate::label_synth;
use crate::providers::factory;
use crate::providers::file::FileProvider;
use crate::providers::ocr::OcrProvider;
use crate::services::document::DocumentService;
use crate::services::ocr_artifact::OcrArtifactService;
use crate::services::project::ProjectService;

const SCANNABLE_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff",
];

fn has_scannable_extension(path: &str) -> bool {
    let lower = path.to_lowercase();
    SCANNABLE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Lists the configured provider root and creates a `Document` for every
/// file not already tracked for this project. Returns the project's
/// resolved config so the caller can reuse the same providers for the
/// documents it just discovered.
async fn sync_project_file_system(
    pool: &PgPool,
    project_id: i32,
    file_provider: &dyn FileProvider,
) -> AppResult<()> {
    let documents = DocumentService::new(pool.clone());
    let existing_paths = documents.paths_for_project(project_id)?;

    let files = file_provider.list("").await?;
    for file in files {
        if !has_scannable_extension(&file) {
            continue;
        }
        if existing_paths.iter().any(|p| p == &file) {
            debug!(path = %file, "document already exists");
            continue;
        }
        debug!(path = %file, "creating document");
        documents.create(project_id, &file)?;
    }

    Ok(())
}

/// Entry point 1 of 2: discovers new files for a project and (re)scans
/// every document it owns. Errors loading the project itself are logged
/// and swallowed; a document's individual scan failure never aborts the
/// rest of the project.
pub async fn scan_project(
    pool: &PgPool,
    config: &AppConfig,
    project_id: i32,
    force: bool,
) -> AppResult<()> {
    debug!(project_id, "scanning project");

    let projects = ProjectService::new(pool.clone());
    let project = match projects.get(project_id) {
        Ok(project) => project,
        Err(err) => {
            warn!(project_id, error = %err, "project not found, aborting scan");
            return Ok(());
        }
    };

    let project_config = projects.config(&project)?;

    let file_provider = factory::build_file_provider(&project_config).await?;
    let ocr_provider = factory::build_ocr_provider(&project_config, config).await?;

    sync_project_file_system(pool, project_id, file_provider.as_ref()).await?;

    let documents = DocumentService::new(pool.clone());
    let doc_ids: Vec<i32> = documents
        .list_for_project(project_id, &Default::default())?
        .into_iter()
        .map(|d| d.id)
        .collect();

    for document_id in doc_ids {
        if let Err(err) = scan_document(
            pool,
            config,
            document_id,
            force,
            Some(file_provider.clone()),
            Some(ocr_provider.clone()),
        )
        .await
        {
            if !err.is_recoverable() {
                warn!(document_id, error = %err, "unrecoverable error, aborting project scan");
                return Err(err);
            }
            warn!(document_id, error = %err, "document scan failed, continuing project scan");
        }
    }

    debug!(project_id, "project scan complete");
    Ok(())
}

/// Entry point 2 of 2: OCRs a single document and synthesizes its label
/// data. Safe to call repeatedly with the same `document_id`: a document
/// that already has `data` is skipped unless `force` is set.
pub async fn scan_document(
    pool: &PgPool,
    config: &AppConfig,
    document_id: i32,
    force: bool,
    file_provider: Option<Arc<dyn FileProvider>>,
    ocr_provider: Option<Arc<dyn OcrProvider>>,
) -> AppResult<()> {
    debug!(document_id, "scanning document");

    let documents = DocumentService::new(pool.clone());
    let document = documents.get(document_id)?;

    if document.data.is_some() && !force {
        debug!(document_id, "document already scanned, skipping");
        return Ok(());
    }

    let (file_provider, ocr_provider) = match (file_provider, ocr_provider) {
        (Some(f), Some(o)) => (f, o),
        _ => {
            let projects = ProjectService::new(pool.clone());
            let project = projects.get(document.project_id)?;
            let project_config: ProjectConfig = projects.config(&project)?;
            (
                factory::build_file_provider(&project_config).await?,
                factory::build_ocr_provider(&project_config, config).await?,
            )
        }
    };

    let images = file_provider.read_as_images(&document.path, None).await?;
    let ocr_result = ocr_provider.ocr(&images).await?;

    let artifacts = OcrArtifactService::new(pool.clone());
    artifacts.create(document_id, &ocr_result)?;

    let label_data = label_synth::synthesize(&ocr_result);

    documents.complete_scan(document_id, &label_data)?;

    debug!(document_id, "document scan complete");
    Ok(())
}
