use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::project_config::ProjectConfig;
use crate::error::AppResult;
use crate::services::document::{DocumentService, StatusCounts};
use crate::services::project::ProjectService;
use crate::services::ListParams;
use crate::state::AppState;

use super::document::DocumentList;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub config: ProjectConfig,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub message: String,
    pub project_id: i32,
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> AppResult<Json<CreateProjectResponse>> {
    let projects = ProjectService::new(state.pool.clone());
    let project = projects.create(&body.name, &body.config)?;
    Ok(Json(CreateProjectResponse {
        message: "project created".to_string(),
        project_id: project.id,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub config: ProjectConfig,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ProjectResponse>> {
    let projects = ProjectService::new(state.pool.clone());
    let project = projects.get(id)?;
    let config = projects.config(&project)?;
    Ok(Json(ProjectResponse {
        id: project.id,
        name: project.name,
        config,
        created: project.created,
        updated: project.updated,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub id: i32,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status_counts: StatusCounts,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<ProjectList>>> {
    let projects = ProjectService::new(state.pool.clone());
    let documents = DocumentService::new(state.pool.clone());

    let mut list = Vec::new();
    for project in projects.list(&params)? {
        let status_counts = documents.status_counts(project.id)?;
        list.push(ProjectList {
            id: project.id,
            name: project.name,
            created: project.created,
            updated: project.updated,
            status_counts,
        });
    }
    Ok(Json(list))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub force: bool,
}

pub async fn scan_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ScanQuery>,
) -> AppResult<Json<MessageResponse>> {
    state.scan_pool.submit_project_scan(id, query.force);
    Ok(Json(MessageResponse {
        message: "project scan scheduled".to_string(),
    }))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<DocumentList>>> {
    let documents = DocumentService::new(state.pool.clone());
    let list = documents
        .list_for_project(id, &params)?
        .into_iter()
        .map(DocumentList::from)
        .collect();
    Ok(Json(list))
}
