//! Service-layer errors
//!
//! `RepoError` is what persistence returns; `ServiceError` lets lifecycle
//! code mix repository failures and business-rule failures behind one `?`,
//! and converts into the API-layer [`AppError`] at the boundary.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Persistence failure
#[derive(Debug, Error)]
pub enum RepoError {
    /// A row the operation depends on vanished mid-operation
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Service-layer error
///
/// - `Repo`: infrastructure failure (logged once, hidden from clients)
/// - `App`: business-rule failure (passed through unchanged)
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    App(AppError),
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        ServiceError::Repo(e)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Repo(RepoError::Database(e))
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Repo(RepoError::NotFound(what)) => AppError::not_found(what),
            ServiceError::Repo(RepoError::Database(db_err)) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        ServiceError::Repo(e).into()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
