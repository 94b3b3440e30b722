use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use security_cell::{AuthorizationPolicy, PasswordSecurityService};
use shared_config::AppConfig;
use shared_database::{DatabaseError, UserStore};
use shared_models::auth::TokenPair;
use shared_models::{NewUser, Page, User, UserResponse, UserRole, UserStatus};
use shared_utils::jwt::issue_pair;
use shared_utils::AppState;

use crate::models::{LoginRequest, RegisterRequest, UpdateUserRequest, UserError};

pub const CRP_LENGTH: usize = 12;
const MIN_EMAIL_LENGTH: usize = 3;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Exactly one '@'.
    PATTERN.get_or_init(|| Regex::new(r"^[^@]*@[^@]*$").unwrap_or_else(|e| panic!("email pattern: {}", e)))
}

pub fn validate_email(email: &str) -> Result<(), UserError> {
    if email.chars().count() < MIN_EMAIL_LENGTH || !email_pattern().is_match(email) {
        return Err(UserError::Validation("Invalid email".to_string()));
    }
    Ok(())
}

pub fn validate_crp(crp: Option<&str>) -> Result<(), UserError> {
    match crp {
        Some(value) if !value.is_empty() && value.chars().count() != CRP_LENGTH => Err(UserError::Validation(
            format!("CRP must have exactly {} characters", CRP_LENGTH),
        )),
        _ => Ok(()),
    }
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    config: Arc<AppConfig>,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            config: state.config.clone(),
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, UserError> {
        debug!("Registering user");

        PasswordSecurityService::validate_password(&request.password)?;
        validate_email(&request.email)?;
        validate_crp(request.crp.as_deref())?;

        let password_hash = PasswordSecurityService::hash_password(&request.password)?;
        let draft = NewUser::new(
            request.name,
            request.email,
            password_hash,
            request.crp,
            request.phone,
            request.bio,
            request.image_url,
        );

        let user = self.users.insert_user(draft).await.map_err(|e| match e {
            DatabaseError::Conflict(msg) => {
                warn!("Registration rejected: {}", msg);
                UserError::AlreadyRegistered
            }
            other => {
                error!("Failed to store user: {}", other);
                UserError::Database(other)
            }
        })?;

        info!("User {} registered as {}", user.id, user.role.as_str());
        Ok(user.into())
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, UserError> {
        debug!("Login attempt");

        let user = self
            .users
            .find_user_by_email(&request.email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !PasswordSecurityService::verify_password(&request.password, &user.password_hash)? {
            warn!("Wrong password for user {}", user.id);
            return Err(UserError::InvalidCredentials);
        }

        let pair = issue_pair(&user, &self.config).map_err(UserError::Token)?;
        info!("User {} logged in", user.id);
        Ok(pair)
    }

    async fn load(&self, user_id: Uuid) -> Result<User, UserError> {
        self.users.find_user(user_id).await?.ok_or(UserError::NotFound)
    }

    /// Defaults to the acting user when no id is given.
    pub async fn get_user(&self, user_id: Option<Uuid>, acting_user_id: Uuid) -> Result<UserResponse, UserError> {
        let target = user_id.unwrap_or(acting_user_id);
        debug!("Fetching user {}", target);
        Ok(self.load(target).await?.into())
    }

    pub async fn list_users(&self, role: Option<UserRole>, page: Page) -> Result<Vec<UserResponse>, UserError> {
        debug!("Listing users, role {:?}, {:?}", role, page);
        let users = self.users.list_users(role, page).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self, request))]
    pub async fn update_user(&self, acting_user_id: Uuid, request: UpdateUserRequest) -> Result<UserResponse, UserError> {
        let mut user = self.load(acting_user_id).await?;

        if let Some(name) = request.name {
            user.name = name;
        }
        if let Some(bio) = request.bio {
            user.bio = Some(bio).filter(|value| !value.is_empty());
        }
        if let Some(image_url) = request.image_url {
            user.image_url = Some(image_url).filter(|value| !value.is_empty());
        }
        if let Some(password) = request.password {
            PasswordSecurityService::validate_password(&password)?;
            user.password_hash = PasswordSecurityService::hash_password(&password)?;
        }

        let saved = self.users.save_user(&user).await?;
        info!("User {} updated", saved.id);
        Ok(saved.into())
    }

    /// Marks a professional as verified. The target defaults to the acting user.
    /// The acting user's role is not checked.
    pub async fn verify_crp(&self, user_id: Option<Uuid>, acting_user_id: Uuid) -> Result<UserResponse, UserError> {
        let target = user_id.unwrap_or(acting_user_id);
        debug!("User {} verifying CRP of {}", acting_user_id, target);

        let mut user = AuthorizationPolicy::require_exists(self.users.find_user(target).await?, "User")?;
        AuthorizationPolicy::require_professional(&user)?;

        if user.status == UserStatus::Ready {
            return Ok(user.into());
        }

        user.status = UserStatus::Ready;
        let saved = self.users.save_user(&user).await?;
        info!("Professional {} verified", saved.id);
        Ok(saved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn email_needs_exactly_one_at_sign() {
        assert!(validate_email("a@b").is_ok());
        assert_matches!(validate_email("ab"), Err(UserError::Validation(_)));
        assert_matches!(validate_email("a@"), Err(UserError::Validation(_)));
        assert_matches!(validate_email("plain.example.com"), Err(UserError::Validation(_)));
        assert_matches!(validate_email("a@b@c.com"), Err(UserError::Validation(_)));
    }

    #[test]
    fn crp_must_be_twelve_characters() {
        assert!(validate_crp(None).is_ok());
        assert!(validate_crp(Some("")).is_ok());
        assert!(validate_crp(Some("06/123456-78")).is_ok());
        assert_matches!(validate_crp(Some("06/123")), Err(UserError::Validation(_)));
    }
}
