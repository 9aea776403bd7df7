mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use mrkr::domain::label::{DocumentLabelData, Label, PageLabel};
use mrkr::domain::project_config::{
    FileProviderConfig, LocalFileProviderConfig, LocalOcrConfig, ObjectStoreFileProviderConfig,
    OcrProviderConfig, ProjectConfig,
};
use mrkr::error::Kind;
use mrkr::scan;
use mrkr::services::document::{DocumentService, STATUS_OPEN, STATUS_PROCESSING};
use mrkr::services::project::ProjectService;

use common::{acquire_db_lock, body_json, expect_status, TestApp};

fn local_project_config(root: &str) -> ProjectConfig {
    ProjectConfig {
        label_definitions: vec![],
        file_provider: FileProviderConfig::Local(LocalFileProviderConfig {
            path: root.to_string(),
            pdf_dpi: 200,
            image_format: "JPEG".to_string(),
        }),
        ocr_provider: OcrProviderConfig::LocalOcr(LocalOcrConfig {
            language: "eng".to_string(),
        }),
    }
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let _guard = acquire_db_lock().await;
    let app = TestApp::new().await.expect("test app");

    let response = app.get("/api/v1/utils/health").await.expect("request");
    expect_status(&response, StatusCode::OK).unwrap();

    let body: serde_json::Value = body_json(response.into_body()).await.unwrap();
    assert_eq!(body["health"], "healthy");
}

#[tokio::test]
async fn create_project_is_listed_with_zero_documents() {
    let _guard = acquire_db_lock().await;
    let app = TestApp::new().await.expect("test app");

    let dir = tempfile::tempdir().expect("tempdir");
    let config = local_project_config(dir.path().to_str().unwrap());

    let response = app
        .post_json(
            "/api/v1/project",
            &json!({"name": "invoices", "config": config}),
        )
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();

    let response = app
        .get("/api/v1/project/list-projects")
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();

    let body: serde_json::Value = body_json(response.into_body()).await.unwrap();
    let projects = body.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["name"], "invoices");
    assert_eq!(projects[0]["status_counts"]["processing"], 0);
    assert_eq!(projects[0]["status_counts"]["open"], 0);
}

/// Drives a full project scan against a real local-filesystem provider and a
/// real `tesseract` binary: discovers the seeded image, OCRs it, synthesizes
/// label data and lands the document in `open`. Scanning runs on the
/// background worker pool, so the assertion polls briefly rather than
/// assuming immediate completion.
#[tokio::test]
async fn project_scan_discovers_and_processes_a_document() {
    let _guard = acquire_db_lock().await;
    let app = TestApp::new().await.expect("test app");

    let dir = tempfile::tempdir().expect("tempdir");
    let image = image::RgbImage::from_pixel(200, 80, image::Rgb([255, 255, 255]));
    image
        .save(dir.path().join("page-one.png"))
        .expect("write fixture image");

    let config = local_project_config(dir.path().to_str().unwrap());
    let response = app
        .post_json(
            "/api/v1/project",
            &json!({"name": "scan-fixture", "config": config}),
        )
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();
    let created: serde_json::Value = body_json(response.into_body()).await.unwrap();
    let project_id = created["project_id"].as_i64().unwrap();

    let response = app
        .post_json(
            &format!("/api/v1/project/{project_id}/scan?force=true"),
            &json!({}),
        )
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();

    let mut documents = Vec::new();
    for _ in 0..30 {
        let response = app
            .get(&format!("/api/v1/project/{project_id}/list-documents"))
            .await
            .expect("request");
        expect_status(&response, StatusCode::OK).unwrap();
        let body: serde_json::Value = body_json(response.into_body()).await.unwrap();
        documents = body.as_array().unwrap().clone();
        if documents
            .iter()
            .any(|d| d["status"] != STATUS_PROCESSING)
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    assert_eq!(documents.len(), 1, "scan should have discovered one file");
    assert_eq!(documents[0]["status"], STATUS_OPEN);

    let document_id = documents[0]["id"].as_i64().unwrap();
    let response = app
        .get(&format!("/api/v1/document/{document_id}"))
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();
    let document: serde_json::Value = body_json(response.into_body()).await.unwrap();
    assert!(document["data"]["pages"].as_array().unwrap().len() >= 1);
}

#[tokio::test]
async fn batch_status_rejects_processing_as_a_target() {
    let _guard = acquire_db_lock().await;
    let app = TestApp::new().await.expect("test app");

    let dir = tempfile::tempdir().expect("tempdir");
    let config = local_project_config(dir.path().to_str().unwrap());
    let projects = ProjectService::new(app.state.pool.clone());
    let project = projects.create("holding", &config).unwrap();

    let documents = DocumentService::new(app.state.pool.clone());
    let document = documents.create(project.id, "unscanned.png").unwrap();
    assert_eq!(document.status, STATUS_PROCESSING);

    let response = app
        .put_json(
            "/api/v1/document/status",
            &json!({"document_ids": [document.id], "status": "processing"}),
        )
        .await
        .expect("request");
    expect_status(&response, StatusCode::BAD_REQUEST).unwrap();
}

#[tokio::test]
async fn document_label_data_round_trips_through_the_api() {
    let _guard = acquire_db_lock().await;
    let app = TestApp::new().await.expect("test app");

    let dir = tempfile::tempdir().expect("tempdir");
    let config = local_project_config(dir.path().to_str().unwrap());
    let projects = ProjectService::new(app.state.pool.clone());
    let project = projects.create("review-queue", &config).unwrap();

    let documents = DocumentService::new(app.state.pool.clone());
    let document = documents.create(project.id, "form.png").unwrap();
    documents
        .complete_scan(document.id, &DocumentLabelData::empty())
        .unwrap();

    let updated = DocumentLabelData {
        pages: vec![PageLabel {
            id: uuid::Uuid::new_v4(),
            page: 0,
            properties: None,
            blocks: vec![],
            labels: vec![Label {
                name: "category".to_string(),
                value: json!("invoice"),
                start: None,
                end: None,
            }],
        }],
        labels: vec![],
    };

    let response = app
        .put_json(
            &format!("/api/v1/document/{}/data", document.id),
            &updated,
        )
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();

    let response = app
        .get(&format!("/api/v1/document/{}", document.id))
        .await
        .expect("request");
    expect_status(&response, StatusCode::OK).unwrap();
    let fetched: serde_json::Value = body_json(response.into_body()).await.unwrap();
    assert_eq!(fetched["data"]["pages"][0]["labels"][0]["name"], "category");
    assert_eq!(fetched["data"]["pages"][0]["labels"][0]["value"], "invoice");
}

/// An object-store project whose credentials reference an environment
/// variable that was never set must fail closed with `ConfigResolutionError`
/// rather than silently skipping the document.
#[tokio::test]
async fn scan_with_unresolved_env_placeholder_fails_config_resolution() {
    let _guard = acquire_db_lock().await;
    let app = TestApp::new().await.expect("test app");

    std::env::remove_var("MRKR_TEST_NEVER_SET");
    let config = ProjectConfig {
        label_definitions: vec![],
        file_provider: FileProviderConfig::ObjectStore(ObjectStoreFileProviderConfig {
            path: "incoming/".to_string(),
            pdf_dpi: 200,
            image_format: "JPEG".to_string(),
            aws_access_key_id: "{{MRKR_TEST_NEVER_SET}}".to_string(),
            aws_secret_access_key: "irrelevant".to_string(),
            aws_region_name: "us-east-1".to_string(),
            aws_account_id: "123456789012".to_string(),
            aws_role_name: "mrkr-role".to_string(),
            aws_bucket_name: "mrkr-bucket".to_string(),
        }),
        ocr_provider: OcrProviderConfig::LocalOcr(LocalOcrConfig {
            language: "eng".to_string(),
        }),
    };

    let projects = ProjectService::new(app.state.pool.clone());
    let project = projects.create("cloud-fixture", &config).unwrap();

    let result = scan::scan_project(
        &app.state.pool,
        &app.state.config,
        project.id,
        false,
    )
    .await;

    let err = result.expect_err("missing env var must fail the scan");
    assert_eq!(err.kind, Kind::ConfigResolution);

    let documents = DocumentService::new(app.state.pool.clone());
    assert!(documents
        .list_for_project(project.id, &Default::default())
        .unwrap()
        .is_empty());
}
