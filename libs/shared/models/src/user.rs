use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Patient,
    Professional,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "PATIENT",
            UserRole::Professional => "PROFESSIONAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Ready,
    WaitingValidation,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Ready => "READY",
            UserStatus::WaitingValidation => "WAITING_VALIDATION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub crp: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_professional(&self) -> bool {
        self.role == UserRole::Professional
    }

    pub fn is_patient(&self) -> bool {
        self.role == UserRole::Patient
    }

    pub fn is_ready(&self) -> bool {
        self.status == UserStatus::Ready
    }
}

/// A user about to be registered. Role and status follow from the CRP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub crp: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl NewUser {
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        crp: Option<String>,
        phone: Option<String>,
        bio: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        let crp = crp.filter(|value| !value.is_empty());
        let (role, status) = if crp.is_some() {
            (UserRole::Professional, UserStatus::WaitingValidation)
        } else {
            (UserRole::Patient, UserStatus::Ready)
        };

        Self {
            name,
            email,
            password_hash,
            role,
            status,
            crp,
            phone: phone.filter(|value| !value.is_empty()),
            bio: bio.filter(|value| !value.is_empty()),
            image_url: image_url.filter(|value| !value.is_empty()),
        }
    }

    pub fn into_user(self, id: Uuid, created_at: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            status: self.status,
            crp: self.crp,
            phone: self.phone,
            bio: self.bio,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub crp: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            bio: user.bio.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            crp: user.crp.clone(),
            phone: user.phone.clone(),
            image_url: user.image_url.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}
