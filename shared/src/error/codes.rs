//! Unified error codes for the ordering platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant (store) errors
//! - 4xxx: Order errors
//! - 5xxx: Call errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can match on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled or was removed
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Store role not in the allowed set
    RoleRequired = 2002,
    /// No permission record for the store
    StoreAccessDenied = 2003,

    // ==================== 3xxx: Tenant ====================
    /// No store could be resolved for a store-scoped operation
    TenantNotSelected = 3001,
    /// Store does not exist
    StoreNotFound = 3002,
    /// Store is deactivated
    StoreInactive = 3003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition not allowed from the current status
    OrderInvalidTransition = 4002,
    /// Concurrent update changed the order status first
    OrderStatusConflict = 4003,
    /// Order has no items
    OrderEmpty = 4004,
    /// Quantity must be a positive integer
    InvalidQuantity = 4005,
    /// Unrecognized order status value
    UnknownOrderStatus = 4006,

    // ==================== 5xxx: Call ====================
    /// Call not found
    CallNotFound = 5001,
    /// Status transition not allowed from the current status
    CallInvalidTransition = 5002,
    /// Concurrent update changed the call status first
    CallStatusConflict = 5003,
    /// Unrecognized call status value
    UnknownCallStatus = 5004,
    /// Unrecognized call type
    UnknownCallType = 5005,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found in this store
    MenuItemNotFound = 6001,
    /// Menu item is not available for ordering
    MenuItemUnavailable = 6002,

    // ==================== 7xxx: Table ====================
    /// Table not found in this store
    TableNotFound = 7001,
    /// Unrecognized table status value
    UnknownTableStatus = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Numeric value of the code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Is this the success code?
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",

            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid username or password",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",
            Self::AccountDisabled => "Account is disabled",

            Self::PermissionDenied => "Permission denied",
            Self::RoleRequired => "Insufficient store role",
            Self::StoreAccessDenied => "No access to this store",

            Self::TenantNotSelected => "No store specified",
            Self::StoreNotFound => "Store not found",
            Self::StoreInactive => "Store is not active",

            Self::OrderNotFound => "Order not found",
            Self::OrderInvalidTransition => "Order status transition not allowed",
            Self::OrderStatusConflict => "Order status was changed by another request",
            Self::OrderEmpty => "Order must contain at least one item",
            Self::InvalidQuantity => "Quantity must be a positive integer",
            Self::UnknownOrderStatus => "Unknown order status",

            Self::CallNotFound => "Call not found",
            Self::CallInvalidTransition => "Call status transition not allowed",
            Self::CallStatusConflict => "Call status was changed by another request",
            Self::UnknownCallStatus => "Unknown call status",
            Self::UnknownCallType => "Unknown call type",

            Self::MenuItemNotFound => "Menu item not found",
            Self::MenuItemUnavailable => "Menu item is not available",

            Self::TableNotFound => "Table not found",
            Self::UnknownTableStatus => "Unknown table status",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 to [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1007 => Self::AccountDisabled,

            2001 => Self::PermissionDenied,
            2002 => Self::RoleRequired,
            2003 => Self::StoreAccessDenied,

            3001 => Self::TenantNotSelected,
            3002 => Self::StoreNotFound,
            3003 => Self::StoreInactive,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderInvalidTransition,
            4003 => Self::OrderStatusConflict,
            4004 => Self::OrderEmpty,
            4005 => Self::InvalidQuantity,
            4006 => Self::UnknownOrderStatus,

            5001 => Self::CallNotFound,
            5002 => Self::CallInvalidTransition,
            5003 => Self::CallStatusConflict,
            5004 => Self::UnknownCallStatus,
            5005 => Self::UnknownCallType,

            6001 => Self::MenuItemNotFound,
            6002 => Self::MenuItemUnavailable,

            7001 => Self::TableNotFound,
            7002 => Self::UnknownTableStatus,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
