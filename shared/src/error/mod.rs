//! Unified error system
//!
//! - [`ErrorCode`]: Standardized numeric error codes
//! - [`ErrorCategory`]: Classification of codes by range
//! - [`ErrorKind`]: Stable failure taxonomy (what clients branch on)
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorKind, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::TenantNotSelected);
//! assert_eq!(err.kind(), ErrorKind::MissingTenant);
//!
//! let err = AppError::validation("quantity must be positive")
//!     .with_detail("field", "items[0].quantity");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.kind, Some(ErrorKind::ValidationFailed));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use self::http::ErrorKind;
pub use types::{ApiResponse, AppError, AppResult};
