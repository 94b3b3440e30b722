//! Authorization checks composed by the scheduling operations, and password
//! hashing for the identity endpoints.

pub mod models;
pub mod services;

pub use models::{PasswordError, PolicyError};
pub use services::{AuthorizationPolicy, PasswordSecurityService};
