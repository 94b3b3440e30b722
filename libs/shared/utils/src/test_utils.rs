use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, TokenUse};
use shared_models::{NewUser, User, UserRole, UserStatus};

use crate::jwt::encode_claims;
use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// Fresh in-memory state; nothing is shared between calls.
    pub fn to_state(&self) -> Arc<AppState> {
        Arc::new(AppState::in_memory(self.to_app_config()))
    }

    pub fn to_state_with(&self, configure: impl FnOnce(&mut AppConfig)) -> Arc<AppState> {
        let mut config = self.to_app_config();
        configure(&mut config);
        Arc::new(AppState::in_memory(config))
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", UserRole::Patient)
    }
}

impl TestUser {
    pub fn new(email: &str, role: UserRole) -> Self {
        Self { id: Uuid::new_v4(), email: email.to_string(), role }
    }

    pub fn professional(email: &str) -> Self {
        Self::new(email, UserRole::Professional)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, UserRole::Patient)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            name: "Test User".to_string(),
            email: self.email.clone(),
            password_hash: String::new(),
            role: self.role,
            status: UserStatus::Ready,
            crp: (self.role == UserRole::Professional).then(|| "06/123456-78".to_string()),
            phone: None,
            bio: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    fn token(user: &TestUser, secret: &str, exp_hours: i64, token_use: TokenUse) -> String {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id.to_string(),
            exp: Some((now + Duration::hours(exp_hours)).timestamp().max(0) as u64),
            iat: Some(now.timestamp() as u64),
            email: Some(user.email.clone()),
            role: Some(user.role),
            token_use,
        };

        encode_claims(&claims, secret).unwrap_or_default()
    }

    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        Self::token(user, secret, exp_hours.unwrap_or(24), TokenUse::Access)
    }

    pub fn create_refresh_token(user: &TestUser, secret: &str) -> String {
        Self::token(user, secret, 48, TokenUse::Refresh)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }

    /// Access token for a user already stored in the state.
    pub fn token_for(user: &User, secret: &str) -> String {
        let test_user = TestUser { id: user.id, email: user.email.clone(), role: user.role };
        Self::create_test_token(&test_user, secret, Some(1))
    }
}

/// Store fixtures shared by the cell tests.
pub struct Fixtures;

impl Fixtures {
    pub async fn patient(state: &AppState, email: &str) -> User {
        let draft = NewUser::new("Patient".into(), email.into(), "hash".into(), None, None, None, None);
        state.users.insert_user(draft).await.unwrap_or_else(|e| panic!("seed patient: {}", e))
    }

    /// Professional with a random CRP, optionally already verified.
    pub async fn professional(state: &AppState, email: &str, verified: bool) -> User {
        let crp = format!("{:012}", Uuid::new_v4().as_u128() % 1_000_000_000_000);
        let draft = NewUser::new("Professional".into(), email.into(), "hash".into(), Some(crp), None, None, None);
        let mut user = state
            .users
            .insert_user(draft)
            .await
            .unwrap_or_else(|e| panic!("seed professional: {}", e));

        if verified {
            user.status = UserStatus::Ready;
            user = state
                .users
                .save_user(&user)
                .await
                .unwrap_or_else(|e| panic!("verify professional: {}", e));
        }
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let app_config = TestConfig::default().to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_service_key, "test-service-key");
        assert!(!app_config.jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::professional("doc@example.com");
        let model = user.to_user();

        assert_eq!(model.id, user.id);
        assert_eq!(model.role, UserRole::Professional);
        assert!(model.crp.is_some());
    }

    #[test]
    fn test_jwt_token_creation() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn fixtures_seed_the_store() {
        let state = TestConfig::default().to_state();

        let pending = Fixtures::professional(&state, "pending@example.com", false).await;
        let ready = Fixtures::professional(&state, "ready@example.com", true).await;

        assert_eq!(pending.status, UserStatus::WaitingValidation);
        assert_eq!(ready.status, UserStatus::Ready);
        assert_eq!(pending.crp.as_ref().map(String::len), Some(12));
    }
}
