//! Session extraction
//!
//! A request is authenticated when its bearer token verifies AND the operator
//! it names still exists and is active.

use axum::{extract::FromRequestParts, http::request::Parts};
use http::HeaderMap;
use shared::AppError;
use shared::models::Operator;

use crate::auth::{JwtError, JwtService};
use crate::core::AppState;
use crate::security_log;

/// Verified operator behind the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentOperator {
    pub id: i64,
    pub username: String,
    /// Read from the database row, never from the token
    pub is_super_admin: bool,
}

impl From<&Operator> for CurrentOperator {
    fn from(op: &Operator) -> Self {
        Self {
            id: op.id,
            username: op.username.clone(),
            is_super_admin: op.is_super_admin,
        }
    }
}

/// Bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
}

/// Verify a token and reload its operator
pub async fn authenticate(state: &AppState, token: &str) -> Result<CurrentOperator, AppError> {
    let claims = state.jwt.verify(token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e);
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let operator_id = claims
        .operator_id()
        .ok_or_else(|| AppError::invalid_token("Invalid token subject"))?;

    match state.repo.find_operator(operator_id).await? {
        Some(op) if op.is_active => Ok(CurrentOperator::from(&op)),
        Some(_) => {
            security_log!(WARN, "auth_operator_inactive", operator_id = operator_id);
            Err(AppError::not_authenticated())
        }
        None => {
            security_log!(WARN, "auth_operator_unknown", operator_id = operator_id);
            Err(AppError::not_authenticated())
        }
    }
}

impl FromRequestParts<AppState> for CurrentOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already verified by the permission gate
        if let Some(operator) = parts.extensions.get::<CurrentOperator>() {
            return Ok(operator.clone());
        }

        let token = bearer_token(&parts.headers).inspect_err(|_| {
            security_log!(WARN, "auth_missing", uri = %parts.uri);
        })?;
        let operator = authenticate(state, token).await?;

        parts.extensions.insert(operator.clone());
        Ok(operator)
    }
}
