use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::state::AppState;

pub mod document;
pub mod health;
pub mod project;
pub mod user;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let user_routes = Router::new()
        .route("/", post(user::create_user))
        .route("/list-users", get(user::list_users));

    let project_routes = Router::new()
        .route("/", post(project::create_project))
        .route("/list-projects", get(project::list_projects))
        .route("/:id", get(project::get_project))
        .route("/:id/scan", post(project::scan_project))
        .route("/:id/list-documents", get(project::list_documents));

    let document_routes = Router::new()
        .route("/:id", get(document::get_document))
        .route("/:id/content", get(document::get_document_content))
        .route("/:id/data", put(document::update_document_data))
        .route("/:id/scan", post(document::scan_document))
        .route("/assignee", put(document::update_assignee))
        .route("/reviewer", put(document::update_reviewer))
        .route("/status", put(document::update_status));

    let v1 = Router::new()
        .route("/utils/health", get(health::health_check))
        .nest("/user", user_routes)
        .nest("/project", project_routes)
        .nest("/document", document_routes);

    Router::new()
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 512))
}
