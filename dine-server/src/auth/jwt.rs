//! JWT session tokens
//!
//! Sessions are stateless: a token is valid until it expires. Verification
//! only proves the signature and expiry; the operator behind `sub` is
//! re-checked against the database on every request.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use shared::models::Operator;
use thiserror::Error;

/// Minimum secret length accepted from `JWT_SECRET`
pub const MIN_SECRET_LEN: usize = 32;

const ACCESS_TOKEN_TYPE: &str = "access";

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Load from `JWT_*` environment variables
    ///
    /// Outside development a missing or short `JWT_SECRET` is fatal; in
    /// development an ephemeral key is generated and every restart
    /// invalidates outstanding sessions.
    pub fn from_env(environment: &str) -> Result<Self, JwtError> {
        Ok(Self {
            secret: resolve_secret(std::env::var("JWT_SECRET").ok(), environment)?,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "dine-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "dine-clients".to_string()),
        })
    }
}

fn resolve_secret(raw: Option<String>, environment: &str) -> Result<String, JwtError> {
    match raw {
        Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(secret),
        Some(_) => Err(JwtError::Config(format!(
            "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
        ))),
        None if environment == "development" => {
            tracing::warn!("JWT_SECRET not set! Generating temporary key for development.");
            Ok(generate_printable_secret())
        }
        None => Err(JwtError::Config(format!(
            "JWT_SECRET must be set in {environment} environment"
        ))),
    }
}

/// Random 64-character alphanumeric secret
pub fn generate_printable_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// JWT Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Operator id (Subject)
    pub sub: String,
    pub username: String,
    /// Informational only; authorization reads the database row
    pub is_super_admin: bool,
    pub token_type: String,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    /// Operator id carried in `sub`
    pub fn operator_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue a session token for an operator
    pub fn issue(&self, operator: &Operator) -> Result<String, JwtError> {
        self.issue_at(operator, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, operator: &Operator, now: i64) -> Result<String, JwtError> {
        let expiration = now + Duration::minutes(self.config.expiration_minutes).num_seconds();

        let claims = Claims {
            sub: operator.id.to_string(),
            username: operator.username.clone(),
            is_super_admin: operator.is_super_admin,
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: expiration,
            iat: now,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Verify signature, expiry, issuer and audience
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(JwtError::InvalidToken("unexpected token type".to_string()));
        }

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
