use diesel::prelude::*;

use crate::db::PgPool;
use crate::domain::label::DocumentLabelData;
use crate::error::{AppError, AppResult};
use crate::models::{Document, NewDocument};
use crate::schema::documents;

use super::{ListParams, Order, OrderBy};

pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_OPEN: &str = "open";
pub const STATUS_REVIEW: &str = "review";
pub const STATUS_DONE: &str = "done";

/// Statuses a caller may target directly. `processing` is withheld: only
/// the scan worker may enter or leave it (spec invariant on Document).
const ASSIGNABLE_STATUSES: [&str; 3] = [STATUS_OPEN, STATUS_REVIEW, STATUS_DONE];

pub struct DocumentService {
    pool: PgPool,
}

impl DocumentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, project_id: i32, path: &str) -> AppResult<Document> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let new_document = NewDocument {
            project_id,
            path: path.to_string(),
            status: STATUS_PROCESSING.to_string(),
        };
        let document = diesel::insert_into(documents::table)
            .values(&new_document)
            .get_result(&mut conn)?;
        Ok(document)
    }

    pub fn get(&self, id: i32) -> AppResult<Document> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        documents::table
            .find(id)
            .first(&mut conn)
            .map_err(AppError::from)
    }

    pub fn list_for_project(&self, project_id: i32, params: &ListParams) -> AppResult<Vec<Document>> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;

        let mut query = documents::table
            .filter(documents::project_id.eq(project_id))
            .into_boxed();

        if let Some(filter) = params.filter.as_ref().filter(|f| !f.is_empty()) {
            let pattern = format!("%{filter}%");
            if let Ok(id_filter) = filter.parse::<i32>() {
                query = query.filter(
                    documents::path
                        .like(pattern.clone())
                        .or(documents::status.like(pattern))
                        .or(documents::id.eq(id_filter)),
                );
            } else {
                query = query.filter(
                    documents::path
                        .like(pattern.clone())
                        .or(documents::status.like(pattern)),
                );
            }
        }

        query = match (params.order_by, params.order) {
            (OrderBy::Id, Order::Asc) => query.order(documents::id.asc()),
            (OrderBy::Id, Order::Desc) => query.order(documents::id.desc()),
            (OrderBy::Created, Order::Asc) => query.order(documents::created.asc()),
            (OrderBy::Created, Order::Desc) => query.order(documents::created.desc()),
            (OrderBy::Updated, Order::Asc) => query.order(documents::updated.asc()),
            (OrderBy::Updated, Order::Desc) => query.order(documents::updated.desc()),
        };

        Ok(query
            .limit(params.limit)
            .offset(params.offset)
            .load(&mut conn)?)
    }

    pub fn paths_for_project(&self, project_id: i32) -> AppResult<Vec<String>> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        Ok(documents::table
            .filter(documents::project_id.eq(project_id))
            .select(documents::path)
            .load(&mut conn)?)
    }

    pub fn update_label_data(&self, id: i32, data: &DocumentLabelData) -> AppResult<Document> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let data_value = serde_json::to_value(data)?;
        let document = diesel::update(documents::table.find(id))
            .set((
                documents::data.eq(Some(data_value)),
                documents::updated.eq(diesel::dsl::now),
            ))
            .get_result(&mut conn)?;
        Ok(document)
    }

    /// Used only by the scan pipeline: replaces `data` and moves the
    /// document out of `processing` in one transaction.
    pub fn complete_scan(&self, id: i32, data: &DocumentLabelData) -> AppResult<Document> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let data_value = serde_json::to_value(data)?;
        let document = diesel::update(documents::table.find(id))
            .set((
                documents::data.eq(Some(data_value)),
                documents::status.eq(STATUS_OPEN),
                documents::updated.eq(diesel::dsl::now),
            ))
            .get_result(&mut conn)?;
        Ok(document)
    }

    pub fn batch_update_assignee(&self, ids: &[i32], user_id: Option<i32>) -> AppResult<usize> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let updated = diesel::update(documents::table.filter(documents::id.eq_any(ids)))
            .set((
                documents::assignee_id.eq(user_id),
                documents::updated.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(updated)
    }

    pub fn batch_update_reviewer(&self, ids: &[i32], user_id: Option<i32>) -> AppResult<usize> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let updated = diesel::update(documents::table.filter(documents::id.eq_any(ids)))
            .set((
                documents::reviewer_id.eq(user_id),
                documents::updated.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(updated)
    }

    pub fn batch_update_status(&self, ids: &[i32], status: &str) -> AppResult<usize> {
        if !ASSIGNABLE_STATUSES.contains(&status) {
            return Err(AppError::bad_request(format!(
                "'{status}' is not a valid target status"
            )));
        }
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let updated = diesel::update(documents::table.filter(documents::id.eq_any(ids)))
            .set((
                documents::status.eq(status),
                documents::updated.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        Ok(updated)
    }

    pub fn status_counts(&self, project_id: i32) -> AppResult<StatusCounts> {
        let mut conn = self.pool.get().map_err(|err| AppError::internal(err.to_string()))?;
        let statuses: Vec<String> = documents::table
            .filter(documents::project_id.eq(project_id))
            .select(documents::status)
            .load(&mut conn)?;

        let mut counts = StatusCounts::default();
        for status in statuses {
            match status.as_str() {
                STATUS_PROCESSING => counts.processing += 1,
                STATUS_OPEN => counts.open += 1,
                STATUS_REVIEW => counts.review += 1,
                STATUS_DONE => counts.done += 1,
                _ => {}
            }
        }
        Ok(counts)
    }
}

#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct StatusCounts {
    pub processing: i64,
    pub open: i64,
    pub review: i64,
    pub done: i64,
}
