use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, info};

use super::validation::{validate_email, validate_password, validate_required};
use crate::config::{AuthConfig, MAX_TOKEN_TTL_HOURS};
use crate::db::{DbPool, Role, User};
use crate::engine::Viewer;
use crate::error::{Error, Result, ValidationErrors};
use crate::AppState;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Access token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::hours(config.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Claims of a valid, unexpired token
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Rejected access token: {}", e);
                None
            }
        }
    }

    /// The caller identified by the request headers; anonymous when the
    /// token is missing or invalid
    pub fn viewer(&self, headers: &HeaderMap) -> Viewer {
        extract_token(headers)
            .and_then(|token| self.verify(token))
            .map(|claims| Viewer::user(claims.sub, claims.role))
            .unwrap_or_default()
    }
}

/// Extract the bearer token from request headers
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for the caller of a request
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(state.tokens.viewer(&parts.headers))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a CUSTOMER account and sign it in
pub async fn register(
    db: &DbPool,
    tokens: &TokenService,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(String, User)> {
    let email = normalize_email(email);
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_required(name, "Name", 100));
    errors.check("email", validate_email(&email));
    errors.check("password", validate_password(password));
    errors.finish()?;

    if User::find_by_email(db, &email).await?.is_some() {
        return Err(Error::duplicate("Email is already registered"));
    }

    let password_hash = hash_password(password)?;
    let user = User::create(db, name.trim(), &email, &password_hash, Role::Customer)
        .await
        .map_err(Error::from)
        .map_err(|e| {
            if e.is_unique_violation() {
                Error::duplicate("Email is already registered")
            } else {
                e
            }
        })?;

    info!(user_id = %user.id, "User registered");
    let token = tokens.issue(&user)?;
    Ok((token, user))
}

pub async fn login(
    db: &DbPool,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<(String, User)> {
    let user = User::find_by_email(db, &normalize_email(email))
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(Error::InvalidCredentials);
    }

    let token = tokens.issue(&user)?;
    Ok((token, user))
}

/// Seed the configured administrator, promoting an existing account if needed
pub async fn ensure_admin_user(db: &DbPool, config: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    let email = normalize_email(email);

    match User::find_by_email(db, &email).await? {
        Some(user) if user.role.is_admin() => {}
        Some(user) => {
            User::set_role(db, &user.id, Role::Admin).await?;
            info!(email = %email, "Promoted existing user to admin");
        }
        None => {
            let password_hash = hash_password(password)?;
            User::create(db, &config.admin_name, &email, &password_hash, Role::Admin).await?;
            info!(email = %email, "Created admin user");
        }
    }

    Ok(())
}
