use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use availability_cell::availability_routes;
use shared_utils::test_utils::{Fixtures, JwtTestUtils, TestConfig};

fn call(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .header(CONTENT_TYPE, "application/json");

    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn publish_list_and_close_over_http() {
    let config = TestConfig::default();
    let state = config.to_state();
    let professional = Fixtures::professional(&state, "pro@example.com", true).await;
    let token = JwtTestUtils::token_for(&professional, &config.jwt_secret);
    let app = availability_routes(state);

    let slot = json!({ "start_time": "2031-03-10T10:00:00Z", "end_time": "2031-03-10T11:00:00Z" });

    let (status, created) = send(&app, call(Method::POST, "/", &token, Some(slot.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    let availability_id = created["availability_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, call(Method::POST, "/", &token, Some(slot))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "start_time and end_time are conflicting with another availability for this user."
    );

    let inverted = json!({ "start_time": "2031-03-10T12:00:00Z", "end_time": "2031-03-10T11:00:00Z" });
    let (status, _) = send(&app, call(Method::POST, "/", &token, Some(inverted))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/?professional_id={}", professional.id);
    let (status, listed) = send(&app, call(Method::GET, &uri, &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["id"], availability_id.as_str());
    assert_eq!(listed[0]["status"], "AVAILABLE");
    assert_eq!(listed[0]["user"]["email"], "pro@example.com");
    assert!(listed[0]["user"].get("password_hash").is_none());

    let change = json!({ "availability_id": availability_id, "status": "CANCELED" });
    let (status, changed) = send(&app, call(Method::POST, "/change-status", &token, Some(change))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(changed["status"], "CANCELED");

    let (_, listed) = send(&app, call(Method::GET, "/", &token, None)).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn unverified_professional_is_forbidden() {
    let config = TestConfig::default();
    let state = config.to_state();
    let pending = Fixtures::professional(&state, "pending@example.com", false).await;
    let token = JwtTestUtils::token_for(&pending, &config.jwt_secret);
    let app = availability_routes(state);

    let slot = json!({ "start_time": "2031-03-10T10:00:00Z", "end_time": "2031-03-10T11:00:00Z" });
    let (status, body) = send(&app, call(Method::POST, "/", &token, Some(slot))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "This user can not perform this action.");
}
