use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use uuid::Uuid;

use shared_config::{AppConfig, MAX_ACCESS_TOKEN_TTL_MINUTES, MAX_REFRESH_TOKEN_TTL_HOURS};
use shared_models::auth::{AuthUser, JwtClaims, JwtHeader, TokenPair, TokenUse};
use shared_models::User;

type HmacSha256 = Hmac<Sha256>;

fn sign(signing_input: &str, jwt_secret: &str) -> Result<Vec<u8>, String> {
    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn encode_claims(claims: &JwtClaims, jwt_secret: &str) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let header = JwtHeader { alg: "HS256".to_string(), typ: "JWT".to_string() };
    let header_json = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    let claims_json = serde_json::to_string(claims).map_err(|e| e.to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = sign(&signing_input, jwt_secret)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

pub fn issue_token(user: &User, token_use: TokenUse, ttl: Duration, jwt_secret: &str) -> Result<String, String> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| "Token lifetime out of range".to_string())?;
    let claims = JwtClaims {
        sub: user.id.to_string(),
        exp: Some(expires_at.timestamp() as u64),
        iat: Some(now.timestamp() as u64),
        email: Some(user.email.clone()),
        role: Some(user.role),
        token_use,
    };

    encode_claims(&claims, jwt_secret)
}

/// Access token plus the longer-lived refresh token used by `/auth/refresh`.
pub fn issue_pair(user: &User, config: &AppConfig) -> Result<TokenPair, String> {
    if !(1..=MAX_ACCESS_TOKEN_TTL_MINUTES).contains(&config.access_token_ttl_minutes)
        || !(1..=MAX_REFRESH_TOKEN_TTL_HOURS).contains(&config.refresh_token_ttl_hours)
    {
        return Err("Token lifetime out of range".to_string());
    }

    let access_token = issue_token(
        user,
        TokenUse::Access,
        Duration::minutes(config.access_token_ttl_minutes),
        &config.jwt_secret,
    )?;
    let refresh_token = issue_token(
        user,
        TokenUse::Refresh,
        Duration::hours(config.refresh_token_ttl_hours),
        &config.jwt_secret,
    )?;

    Ok(TokenPair { access_token, refresh_token, user_id: user.id })
}

/// Verifies signature and expiry and returns the raw claims.
pub fn decode_claims(token: &str, jwt_secret: &str) -> Result<JwtClaims, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let (header_b64, claims_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        "Invalid signature encoding".to_string()
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| "Invalid claims encoding".to_string())?;

    let claims: JwtClaims = serde_json::from_str(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    Ok(claims)
}

fn principal(claims: JwtClaims) -> Result<AuthUser, String> {
    let id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid token subject".to_string())?;
    let issued_at = claims
        .iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    Ok(AuthUser { id, email: claims.email, role: claims.role, issued_at })
}

fn validate_as(token: &str, jwt_secret: &str, expected: TokenUse) -> Result<AuthUser, String> {
    let claims = decode_claims(token, jwt_secret)?;
    if claims.token_use != expected {
        debug!("Rejected {:?} token where {:?} was expected", claims.token_use, expected);
        return Err("Wrong token type".to_string());
    }

    let user = principal(claims)?;
    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

/// Accepts access tokens only.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    validate_as(token, jwt_secret, TokenUse::Access)
}

pub fn validate_refresh_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    validate_as(token, jwt_secret, TokenUse::Refresh)
}
