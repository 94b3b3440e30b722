use std::sync::Arc;

use assert_matches::assert_matches;
use axum::{
    body::Body,
    extract::{Extension, Query, State},
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode},
    Json,
};
use serde_json::json;
use tower::ServiceExt;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::{UserRole, UserStatus};
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{Fixtures, JwtTestUtils, TestConfig};
use shared_utils::AppState;
use user_cell::handlers::*;
use user_cell::models::*;
use user_cell::user_routes;

fn register_request(email: &str, crp: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        name: "Maria".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        crp: crp.map(str::to_string),
        phone: None,
        bio: Some(String::new()),
        image_url: None,
    }
}

fn acting(id: uuid::Uuid) -> Extension<AuthUser> {
    Extension(AuthUser { id, email: None, role: None, issued_at: None })
}

async fn registered(state: &Arc<AppState>, email: &str, crp: Option<&str>) -> shared_models::UserResponse {
    let (_, Json(user)) = register(State(state.clone()), Json(register_request(email, crp))).await.unwrap();
    user
}

#[tokio::test]
async fn register_derives_role_from_crp() {
    let state = TestConfig::default().to_state();

    let patient = registered(&state, "pat@example.com", None).await;
    assert_eq!(patient.role, UserRole::Patient);
    assert_eq!(patient.status, UserStatus::Ready);
    assert!(patient.bio.is_none());

    let professional = registered(&state, "pro@example.com", Some("06/123456-78")).await;
    assert_eq!(professional.role, UserRole::Professional);
    assert_eq!(professional.status, UserStatus::WaitingValidation);
}

#[tokio::test]
async fn register_validates_input() {
    let state = TestConfig::default().to_state();

    let mut short_password = register_request("pat@example.com", None);
    short_password.password = "12345".to_string();
    assert_matches!(
        register(State(state.clone()), Json(short_password)).await,
        Err(AppError::ValidationError(_))
    );

    assert_matches!(
        register(State(state.clone()), Json(register_request("no-at-sign", None))).await,
        Err(AppError::ValidationError(_))
    );

    assert_matches!(
        register(State(state), Json(register_request("pro@example.com", Some("short")))).await,
        Err(AppError::ValidationError(_))
    );
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let state = TestConfig::default().to_state();
    registered(&state, "pat@example.com", None).await;

    let result = register(State(state), Json(register_request("pat@example.com", None))).await;

    assert_matches!(result, Err(AppError::Conflict(msg)) if msg == "Email or CRP already registered");
}

#[tokio::test]
async fn login_issues_tokens_and_rejects_bad_credentials() {
    let config = TestConfig::default();
    let state = config.to_state();
    let user = registered(&state, "pat@example.com", None).await;

    let Json(tokens) = login(
        State(state.clone()),
        Json(LoginRequest { email: "pat@example.com".into(), password: "secret1".into() }),
    )
    .await
    .unwrap();
    assert_eq!(tokens.user_id, user.id);
    assert_eq!(validate_token(&tokens.access_token, &config.jwt_secret).unwrap().id, user.id);

    for (email, password) in [("pat@example.com", "wrong-one"), ("nobody@example.com", "secret1")] {
        let result = login(
            State(state.clone()),
            Json(LoginRequest { email: email.into(), password: password.into() }),
        )
        .await;
        assert_matches!(result, Err(AppError::BadRequest(msg)) if msg == "Invalid email or password");
    }
}

#[tokio::test]
async fn get_user_defaults_to_the_caller() {
    let state = TestConfig::default().to_state();
    let me = registered(&state, "me@example.com", None).await;
    let other = registered(&state, "other@example.com", None).await;

    let Json(found) = get_user(State(state.clone()), acting(me.id), Query(UserQuery { user_id: None })).await.unwrap();
    assert_eq!(found.id, me.id);

    let Json(found) = get_user(State(state.clone()), acting(me.id), Query(UserQuery { user_id: Some(other.id) }))
        .await
        .unwrap();
    assert_eq!(found.id, other.id);

    assert_matches!(
        get_user(State(state), acting(me.id), Query(UserQuery { user_id: Some(uuid::Uuid::new_v4()) })).await,
        Err(AppError::NotFound(_))
    );
}

#[tokio::test]
async fn list_users_filters_by_role() {
    let state = TestConfig::default().to_state();
    let me = registered(&state, "pat1@example.com", None).await;
    registered(&state, "pat2@example.com", None).await;
    registered(&state, "pro@example.com", Some("06/123456-78")).await;

    let Json(professionals) = list_users(
        State(state.clone()),
        acting(me.id),
        Query(ListUsersQuery { role: Some(UserRole::Professional), ..Default::default() }),
    )
    .await
    .unwrap();
    assert_eq!(professionals.len(), 1);

    let Json(first) = list_users(
        State(state),
        acting(me.id),
        Query(ListUsersQuery { limit: Some(2), ..Default::default() }),
    )
    .await
    .unwrap();
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn update_changes_profile_and_password() {
    let state = TestConfig::default().to_state();
    let me = registered(&state, "pat@example.com", None).await;

    let Json(updated) = update_user(
        State(state.clone()),
        acting(me.id),
        Json(UpdateUserRequest {
            name: Some("Maria Clara".into()),
            password: Some("another-secret".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Maria Clara");
    assert_eq!(updated.email, me.email);

    assert!(login(
        State(state.clone()),
        Json(LoginRequest { email: "pat@example.com".into(), password: "another-secret".into() }),
    )
    .await
    .is_ok());

    assert_matches!(
        update_user(
            State(state),
            acting(me.id),
            Json(UpdateUserRequest { password: Some("123".into()), ..Default::default() }),
        )
        .await,
        Err(AppError::ValidationError(_))
    );
}

#[tokio::test]
async fn verify_crp_promotes_professionals_only() {
    let state = TestConfig::default().to_state();
    let professional = Fixtures::professional(&state, "pro@example.com", false).await;
    let patient = Fixtures::patient(&state, "pat@example.com").await;

    let Json(verified) = verify_crp(State(state.clone()), acting(professional.id), Query(UserQuery { user_id: None }))
        .await
        .unwrap();
    assert_eq!(verified.status, UserStatus::Ready);

    assert_matches!(
        verify_crp(State(state.clone()), acting(professional.id), Query(UserQuery { user_id: Some(patient.id) })).await,
        Err(AppError::Forbidden(_))
    );
    assert_matches!(
        verify_crp(State(state), acting(patient.id), Query(UserQuery { user_id: Some(uuid::Uuid::new_v4()) })).await,
        Err(AppError::NotFound(_))
    );
}

#[tokio::test]
async fn any_authenticated_user_may_verify_a_professional() {
    let state = TestConfig::default().to_state();
    let professional = Fixtures::professional(&state, "pro@example.com", false).await;
    let patient = Fixtures::patient(&state, "pat@example.com").await;

    let Json(verified) = verify_crp(
        State(state.clone()),
        acting(patient.id),
        Query(UserQuery { user_id: Some(professional.id) }),
    )
    .await
    .unwrap();

    assert_eq!(verified.id, professional.id);
    assert_eq!(verified.status, UserStatus::Ready);
}

#[tokio::test]
async fn router_guards_protected_routes() {
    let config = TestConfig::default();
    let state = config.to_state();
    let app = user_routes(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::post("/register")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "name": "Ana", "email": "ana@example.com", "password": "secret1" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(Request::get("/all").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let user = Fixtures::patient(&state, "pat@example.com").await;
    let token = JwtTestUtils::token_for(&user, &config.jwt_secret);
    let response = app
        .oneshot(
            Request::get("/all?role=PATIENT")
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
