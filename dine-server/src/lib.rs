//! Dine Server - multi-tenant restaurant ordering core
//!
//! # Architecture
//!
//! Every protected request passes the permission chain before reaching a
//! handler:
//!
//! ```text
//! request ──► authenticate ──► resolve store ──► authorize ──► role check ──► handler
//!                                                                               │
//!                                                   lifecycle (commit) ◄────────┘
//!                                                        │
//!                                                        ▼
//!                                               RealtimeHub fan-out
//! ```
//!
//! # Module layout
//!
//! ```text
//! dine-server/src/
//! ├── core/          # config, state, service error
//! ├── common/        # logging
//! ├── auth/          # JWT sessions, password hashing
//! ├── tenant/        # store resolution
//! ├── gate/          # permission chain middleware
//! ├── realtime/      # room registry, WebSocket protocol
//! ├── lifecycle/     # order / call / table state changes
//! ├── db/            # repository traits and PostgreSQL implementation
//! └── api/           # HTTP routes and handlers
//! ```

pub mod api;
pub mod auth;
pub mod common;
pub mod core;
pub mod db;
pub mod gate;
pub mod lifecycle;
pub mod realtime;
pub mod tenant;

#[cfg(test)]
mod test_support;

pub use auth::{CurrentOperator, JwtService};
pub use crate::core::{AppState, Config, ServiceError, ServiceResult};
pub use realtime::RealtimeHub;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCode};

pub use common::logger::init_logger;
