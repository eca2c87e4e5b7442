//! Core: configuration, shared state and the service error bridge

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{RepoError, RepoResult, ServiceError, ServiceResult};
pub use state::AppState;
