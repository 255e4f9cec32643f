use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use doctor_cell::services::profile::DoctorProfileService;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockClinicRows, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    doctor_routes(Arc::new(config))
}

#[tokio::test]
async fn ensure_profile_inserts_on_first_login() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("user_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockClinicRows::doctor_row(&doctor_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let service = DoctorProfileService::new(&config);

    let profile = service.ensure_profile(doctor_id, None).await.unwrap();
    assert_eq!(profile.user_id, doctor_id);
    assert_eq!(profile.specialty, "General");
}

#[tokio::test]
async fn ensure_profile_is_idempotent() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicRows::doctor_row(&doctor_id.to_string())
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let service = DoctorProfileService::new(&config);

    let profile = service.ensure_profile(doctor_id, None).await.unwrap();
    assert_eq!(profile.user_id, doctor_id);
}

#[tokio::test]
async fn list_doctors_includes_embedded_names() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let mut row = MockClinicRows::doctor_row(&doctor_id.to_string());
    row["users"] = json!({ "first_name": "Laura", "last_name": "Mendez" });

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    let user = TestUser::admin("admin@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_response: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json_response["doctors"][0]["first_name"], "Laura");
    assert_eq!(json_response["doctors"][0]["specialty"], "General");
}

#[tokio::test]
async fn update_requires_admin_or_self() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    let app = create_test_app(config.clone());

    // A nurse editing someone else's profile is forbidden.
    let nurse = TestUser::nurse("nurse@example.com");
    let token = JwtTestUtils::create_test_token(&nurse, &config.jwt_secret, Some(24));

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/{}", doctor_id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "specialty": "Pediatrics" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
