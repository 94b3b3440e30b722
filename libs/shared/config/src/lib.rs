use std::env;
use tracing::warn;

/// Which existing availabilities block a new one from being published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapScope {
    /// Every stored availability counts, whatever its status.
    All,
    /// Only AVAILABLE and TAKEN availabilities count.
    Active,
}

impl OverlapScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
        }
    }
}

/// Longest lifetimes accepted for issued tokens.
pub const MAX_ACCESS_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;
pub const MAX_REFRESH_TOKEN_TTL_HOURS: i64 = 365 * 24;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_hours: i64,
    pub overlap_scope: OverlapScope,
    pub strict_status_transitions: bool,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            jwt_secret: String::new(),
            access_token_ttl_minutes: 60,
            refresh_token_ttl_hours: 48,
            overlap_scope: OverlapScope::All,
            strict_status_transitions: true,
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using in-memory storage");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            access_token_ttl_minutes: bounded_ttl(
                "ACCESS_TOKEN_TTL_MINUTES",
                parse_var("ACCESS_TOKEN_TTL_MINUTES", defaults.access_token_ttl_minutes),
                defaults.access_token_ttl_minutes,
                MAX_ACCESS_TOKEN_TTL_MINUTES,
            ),
            refresh_token_ttl_hours: bounded_ttl(
                "REFRESH_TOKEN_TTL_HOURS",
                parse_var("REFRESH_TOKEN_TTL_HOURS", defaults.refresh_token_ttl_hours),
                defaults.refresh_token_ttl_hours,
                MAX_REFRESH_TOKEN_TTL_HOURS,
            ),
            overlap_scope: env::var("OVERLAP_SCOPE")
                .ok()
                .and_then(|value| {
                    let scope = OverlapScope::parse(&value);
                    if scope.is_none() {
                        warn!("OVERLAP_SCOPE '{}' not recognised, using default", value);
                    }
                    scope
                })
                .unwrap_or(defaults.overlap_scope),
            strict_status_transitions: parse_var("STRICT_STATUS_TRANSITIONS", defaults.strict_status_transitions),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        };

        if config.jwt_secret.is_empty() {
            warn!("Application not fully configured - tokens cannot be issued without JWT_SECRET");
        }

        config
    }

    /// True when the PostgREST backend can be used.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Falls back to `default` for lifetimes outside `1..=max`.
fn bounded_ttl(name: &str, value: i64, default: i64, max: i64) -> i64 {
    if (1..=max).contains(&value) {
        value
    } else {
        warn!("{} must be between 1 and {}, got {}; using default", name, max, value);
        default
    }
}
