//! Shared types for the ordering platform
//!
//! Domain models, the realtime wire protocol and the unified error system
//! used by the server and its clients.

pub mod error;
pub mod models;
pub mod realtime;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode, ErrorKind};
pub use serde::{Deserialize, Serialize};
