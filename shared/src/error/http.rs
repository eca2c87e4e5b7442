//! Stable error kinds and their HTTP status mapping

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Stable failure taxonomy exposed to clients
///
/// Many [`ErrorCode`]s collapse onto one kind; clients that only care about
/// the class of failure match on this instead of the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, invalid or expired session, or a session for a removed operator
    Unauthenticated,
    /// Store-scoped operation without a resolvable store id
    MissingTenant,
    /// Store resolved but access is not allowed (or store deactivated)
    Forbidden,
    /// Referenced entity missing or not part of the resolved store
    NotFound,
    /// Status transition not allowed, or unrecognized status value
    InvalidState,
    /// Missing fields, bad quantities, malformed identifiers
    ValidationFailed,
    /// A concurrent request changed the state first
    Conflict,
    /// Unexpected fault
    Internal,
}

impl ErrorKind {
    /// HTTP status used for this kind
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::MissingTenant => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidState => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorCode {
    /// Stable kind of this error code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => ErrorKind::Unauthenticated,

            Self::TenantNotSelected => ErrorKind::MissingTenant,

            Self::PermissionDenied
            | Self::RoleRequired
            | Self::StoreAccessDenied
            | Self::StoreInactive => ErrorKind::Forbidden,

            Self::NotFound
            | Self::StoreNotFound
            | Self::OrderNotFound
            | Self::CallNotFound
            | Self::MenuItemNotFound
            | Self::MenuItemUnavailable
            | Self::TableNotFound => ErrorKind::NotFound,

            Self::OrderInvalidTransition
            | Self::UnknownOrderStatus
            | Self::CallInvalidTransition
            | Self::UnknownCallStatus => ErrorKind::InvalidState,

            Self::AlreadyExists | Self::OrderStatusConflict | Self::CallStatusConflict => {
                ErrorKind::Conflict
            }

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::OrderEmpty
            | Self::InvalidQuantity
            | Self::UnknownCallType
            | Self::UnknownTableStatus => ErrorKind::ValidationFailed,

            Self::Success
            | Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError => ErrorKind::Internal,
        }
    }

    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            other => other.kind().http_status(),
        }
    }
}
