use std::sync::Arc;

use axum::{routing::get, Router};

use auth_cell::auth_routes;
use availability_cell::availability_routes;
use schedule_cell::schedule_routes;
use shared_utils::AppState;
use user_cell::user_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Agenda API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/user", user_routes(state.clone()))
        .nest("/availabilities", availability_routes(state.clone()))
        .nest("/schedule", schedule_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use shared_utils::test_utils::TestConfig;

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri).header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn liveness_route_answers() {
        let app = create_router(TestConfig::default().to_state());
        let response = app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn full_booking_flow_through_every_cell() {
        let state = TestConfig::default().to_state();
        let app = create_router(state.clone());

        let (status, professional) = send(
            &app,
            Method::POST,
            "/user/register",
            None,
            Some(json!({ "name": "Dr. Lia", "email": "lia@example.com", "password": "secret1", "crp": "06/123456-78" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(professional["status"], "WAITING_VALIDATION");

        let (status, _) = send(
            &app,
            Method::POST,
            "/user/register",
            None,
            Some(json!({ "name": "Rui", "email": "rui@example.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let login = |email: &'static str| json!({ "email": email, "password": "secret1" });
        let (_, pro_tokens) = send(&app, Method::POST, "/user/login", None, Some(login("lia@example.com"))).await;
        let (_, pat_tokens) = send(&app, Method::POST, "/user/login", None, Some(login("rui@example.com"))).await;
        let pro = pro_tokens["access_token"].as_str().unwrap().to_string();
        let pat = pat_tokens["access_token"].as_str().unwrap().to_string();

        let slot = json!({ "start_time": "2031-03-10T10:00:00Z", "end_time": "2031-03-10T11:00:00Z" });
        let (status, _) = send(&app, Method::POST, "/availabilities", Some(pro.as_str()), Some(slot.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, verified) = send(&app, Method::POST, "/user/verify-crp", Some(pro.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verified["status"], "READY");

        let (status, created) = send(&app, Method::POST, "/availabilities", Some(pro.as_str()), Some(slot)).await;
        assert_eq!(status, StatusCode::CREATED);
        let availability_id = created["availability_id"].clone();

        let (status, booked) = send(
            &app,
            Method::POST,
            "/schedule",
            Some(pat.as_str()),
            Some(json!({ "availability_id": availability_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let schedule_id = booked["schedule_id"].as_str().unwrap().to_string();

        let (_, schedules) = send(&app, Method::GET, "/schedule", Some(pat.as_str()), None).await;
        assert_eq!(schedules.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, Method::DELETE, &format!("/schedule/{}", schedule_id), Some(pat.as_str()), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let overlapping = json!({ "start_time": "2031-03-10T10:30:00Z", "end_time": "2031-03-10T11:30:00Z" });
        let (status, _) = send(&app, Method::POST, "/availabilities", Some(pro.as_str()), Some(overlapping)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, refreshed) = send(
            &app,
            Method::POST,
            "/auth/refresh",
            Some(pat_tokens["refresh_token"].as_str().unwrap()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(refreshed["access_token"].is_string());
    }
}
