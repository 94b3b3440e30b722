pub mod password;
pub mod policy;

pub use password::PasswordSecurityService;
pub use policy::AuthorizationPolicy;
