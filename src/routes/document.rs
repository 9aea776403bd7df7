use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::label::DocumentLabelData;
use crate::domain::project_config::ProjectConfig;
use crate::error::AppResult;
use crate::models::Document;
use crate::providers::factory;
use crate::providers::file::PageContent;
use crate::services::document::DocumentService;
use crate::services::project::ProjectService;
use crate::state::AppState;

use super::project::MessageResponse;

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i32,
    pub project_id: i32,
    pub path: String,
    pub status: String,
    pub data: Option<DocumentLabelData>,
    pub assignee_id: Option<i32>,
    pub reviewer_id: Option<i32>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl DocumentResponse {
    fn from_document(document: Document) -> AppResult<Self> {
        let data = match document.data {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };
        Ok(Self {
            id: document.id,
            project_id: document.project_id,
            path: document.path,
            status: document.status,
            data,
            assignee_id: document.assignee_id,
            reviewer_id: document.reviewer_id,
            created: document.created,
            updated: document.updated,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentList {
    pub id: i32,
    pub project_id: i32,
    pub path: String,
    pub status: String,
    pub assignee_id: Option<i32>,
    pub reviewer_id: Option<i32>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<Document> for DocumentList {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            project_id: document.project_id,
            path: document.path,
            status: document.status,
            assignee_id: document.assignee_id,
            reviewer_id: document.reviewer_id,
            created: document.created,
            updated: document.updated,
        }
    }
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DocumentResponse>> {
    let documents = DocumentService::new(state.pool.clone());
    let document = documents.get(id)?;
    Ok(Json(DocumentResponse::from_document(document)?))
}

pub async fn get_document_content(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<PageContent>>> {
    let documents = DocumentService::new(state.pool.clone());
    let projects = ProjectService::new(state.pool.clone());

    let document = documents.get(id)?;
    let project = projects.get(document.project_id)?;
    let project_config: ProjectConfig = projects.config(&project)?;
    let file_provider = factory::build_file_provider(&project_config).await?;

    let pages = file_provider
        .read_as_base64_images(&document.path, None)
        .await?;
    Ok(Json(pages))
}

pub async fn update_document_data(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<DocumentLabelData>,
) -> AppResult<Json<MessageResponse>> {
    let documents = DocumentService::new(state.pool.clone());
    documents.update_label_data(id, &data)?;
    Ok(Json(MessageResponse {
        message: "document data updated".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub force: bool,
}

pub async fn scan_document(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ScanQuery>,
) -> AppResult<Json<MessageResponse>> {
    state.scan_pool.submit_document_scan(id, query.force);
    Ok(Json(MessageResponse {
        message: "document scan scheduled".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchAssigneeRequest {
    pub document_ids: Vec<i32>,
    pub user_id: Option<i32>,
}

pub async fn update_assignee(
    State(state): State<AppState>,
    Json(body): Json<BatchAssigneeRequest>,
) -> AppResult<Json<MessageResponse>> {
    let documents = DocumentService::new(state.pool.clone());
    let updated = documents.batch_update_assignee(&body.document_ids, body.user_id)?;
    Ok(Json(MessageResponse {
        message: format!("{updated} document(s) updated"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchReviewerRequest {
    pub document_ids: Vec<i32>,
    pub user_id: Option<i32>,
}

pub async fn update_reviewer(
    State(state): State<AppState>,
    Json(body): Json<BatchReviewerRequest>,
) -> AppResult<Json<MessageResponse>> {
    let documents = DocumentService::new(state.pool.clone());
    let updated = documents.batch_update_reviewer(&body.document_ids, body.user_id)?;
    Ok(Json(MessageResponse {
        message: format!("{updated} document(s) updated"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchStatusRequest {
    pub document_ids: Vec<i32>,
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Json(body): Json<BatchStatusRequest>,
) -> AppResult<Json<MessageResponse>> {
    let documents = DocumentService::new(state.pool.clone());
    let updated = documents.batch_update_status(&body.document_ids, &body.status)?;
    Ok(Json(MessageResponse {
        message: format!("{updated} document(s) updated"),
    }))
}
