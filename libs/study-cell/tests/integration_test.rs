use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockClinicRows, TestConfig, TestUser};
use study_cell::router::study_routes;
use study_cell::services::extract::UNSUPPORTED_PLACEHOLDER;

const BOUNDARY: &str = "clinic-test-boundary";

fn create_test_app(config: AppConfig) -> Router {
    study_routes(Arc::new(config))
}

fn multipart_body(file_name: &str, content: &[u8], description: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{d}\r\n",
            b = BOUNDARY,
            d = description
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            f = file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[tokio::test]
async fn upload_stores_file_and_records_study() {
    let mock_server = MockServer::start().await;
    let media_dir = tempfile::tempdir().unwrap();
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": patient_id }])))
        .mount(&mock_server)
        .await;

    // An unsupported extension is archived with the placeholder text.
    Mock::given(method("POST"))
        .and(path("/rest/v1/studies"))
        .and(body_partial_json(json!({
            "file_name": "report.docx",
            "extracted_text": UNSUPPORTED_PLACEHOLDER
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockClinicRows::study_row(&patient_id.to_string(), "report.docx")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    config.media_root = media_dir.path().to_string_lossy().to_string();
    let app = create_test_app(config.clone());

    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let body = multipart_body("report.docx", b"binary study bytes", "lab results");

    let request = Request::builder()
        .method("POST")
        .uri(format!("/patients/{}", patient_id))
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The file landed under <media_root>/studies/.
    let studies_dir = media_dir.path().join("studies");
    let stored: Vec<_> = std::fs::read_dir(&studies_dir).unwrap().collect();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": patient_id }])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nno file\r\n--{b}--\r\n",
        b = BOUNDARY
    );

    let request = Request::builder()
        .method("POST")
        .uri(format!("/patients/{}", patient_id))
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_requires_doctor_role() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config.clone());

    let nurse = TestUser::nurse("nurse@example.com");
    let token = JwtTestUtils::create_test_token(&nurse, &config.jwt_secret, Some(24));

    let body = multipart_body("scan.png", b"img", "");

    let request = Request::builder()
        .method("POST")
        .uri(format!("/patients/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn listing_returns_patient_studies() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/studies"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::study_row(&patient_id.to_string(), "labs.pdf")
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("GET")
        .uri(format!("/patients/{}", patient_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["studies"][0]["file_name"], "labs.pdf");
}
