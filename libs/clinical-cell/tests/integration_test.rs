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

use clinical_cell::router::clinical_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockClinicRows, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    clinical_routes(Arc::new(config))
}

async fn mount_appointment(server: &MockServer, appointment_id: &Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .and(query_param("select", "id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": appointment_id }])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn diagnosis_appends_history_and_updates_appointment() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();
    let doctor = TestUser::doctor("doc@example.com");

    mount_appointment(&mock_server, &appointment_id).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/diagnosis_history"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "doctor_id": doctor.id,
            "text": "Acute pharyngitis",
            "recorded_at": "2024-06-10T10:30:00Z"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "diagnosis": "Acute pharyngitis" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::appointment_row(
                &appointment_id.to_string(),
                &Uuid::new_v4().to_string(),
                &doctor.id,
                "2024-06-10",
                "10:00:00",
                "attended",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("POST")
        .uri(format!("/appointments/{}/diagnosis", appointment_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "Acute pharyngitis" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn blank_diagnosis_is_rejected() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config.clone());

    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("POST")
        .uri(format!("/appointments/{}/diagnosis", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "   " }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn diagnosis_requires_doctor_role() {
    let config = TestConfig::default().to_app_config();
    let app = create_test_app(config.clone());

    let nurse = TestUser::nurse("nurse@example.com");
    let token = JwtTestUtils::create_test_token(&nurse, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("POST")
        .uri(format!("/appointments/{}/diagnosis", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "Not allowed" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn prescription_upsert_inserts_then_patches() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    mount_appointment(&mock_server, &appointment_id).await;

    // No existing prescription: expect an insert.
    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/prescriptions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockClinicRows::prescription_row(&appointment_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/appointments/{}/prescription", appointment_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "diagnosis": "Seasonal rhinitis",
                "medications": "Loratadine 10mg",
                "instructions": "One tablet every 24 hours for 5 days"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json_response["prescription"]["medications"], "Loratadine 10mg");
}

#[tokio::test]
async fn missing_prescription_is_404() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/prescriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    let doctor = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("GET")
        .uri(format!("/appointments/{}/prescription", appointment_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
