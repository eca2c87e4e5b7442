//! Authentication handlers

use axum::Json;
use axum::extract::State;
use shared::models::{LoginRequest, LoginResponse, Operator, OperatorInfo};
use shared::{ApiResponse, AppError, AppResult};

use super::extract::JsonBody;
use crate::auth::{CurrentOperator, JwtError, password};
use crate::core::AppState;
use crate::security_log;

/// POST /api/auth/login
///
/// Unknown user, wrong password and inactive account all answer the same
/// `InvalidCredentials` so usernames cannot be enumerated.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let username = req.username.trim().to_string();
    let operator = state.repo.find_operator_by_username(&username).await?;

    let Some(operator) = operator else {
        password::verify_dummy_async(req.password).await?;
        security_log!(WARN, "login_failed", username = %username, reason = "unknown_user");
        return Err(AppError::invalid_credentials());
    };

    let valid =
        password::verify_password_async(req.password, operator.hashed_password.clone()).await?;
    if !valid {
        security_log!(WARN, "login_failed", username = %username, reason = "bad_password");
        return Err(AppError::invalid_credentials());
    }
    if !operator.is_active {
        security_log!(WARN, "login_failed", username = %username, reason = "inactive");
        return Err(AppError::invalid_credentials());
    }

    let response = issue_session(&state, &operator)?;
    tracing::info!(
        operator_id = operator.id,
        username = %operator.username,
        "Operator logged in"
    );
    Ok(Json(ApiResponse::success(response)))
}

/// GET /api/auth/me
pub async fn me(operator: CurrentOperator) -> Json<ApiResponse<OperatorInfo>> {
    Json(ApiResponse::success(OperatorInfo {
        id: operator.id,
        username: operator.username,
        is_super_admin: operator.is_super_admin,
    }))
}

/// POST /api/auth/refresh
///
/// Issues a fresh token for a still-valid session.
pub async fn refresh(
    State(state): State<AppState>,
    operator: CurrentOperator,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let operator = state
        .repo
        .find_operator(operator.id)
        .await?
        .filter(|op| op.is_active)
        .ok_or_else(AppError::not_authenticated)?;

    Ok(Json(ApiResponse::success(issue_session(&state, &operator)?)))
}

fn issue_session(state: &AppState, operator: &Operator) -> Result<LoginResponse, AppError> {
    let token = state.jwt.issue(operator).map_err(|e: JwtError| {
        tracing::error!(error = %e, "Failed to issue token");
        AppError::internal("Failed to issue token")
    })?;

    Ok(LoginResponse {
        token,
        expires_in: state.jwt.config().expiration_minutes * 60,
        operator: OperatorInfo::from(operator),
    })
}
