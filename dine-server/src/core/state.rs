//! Shared application state

use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{PgRepository, Repository};
use crate::lifecycle::{CallLifecycle, OrderLifecycle, TableLifecycle};
use crate::realtime::RealtimeHub;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Persistence (PostgreSQL in production)
    pub repo: Arc<dyn Repository>,
    /// Session token service
    pub jwt: Arc<JwtService>,
    /// Realtime room registry
    pub hub: RealtimeHub,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>, jwt: JwtService, hub: RealtimeHub) -> Self {
        Self {
            repo,
            jwt: Arc::new(jwt),
            hub,
        }
    }

    /// Connect to PostgreSQL and build the production state
    pub async fn connect(config: &Config) -> Result<Self, BoxError> {
        let repo = PgRepository::connect(config).await?;
        tracing::info!(
            max_connections = config.db_max_connections,
            "PostgreSQL pool ready"
        );

        Ok(Self::new(
            Arc::new(repo),
            JwtService::with_config(config.jwt.clone()),
            RealtimeHub::new(),
        ))
    }

    pub fn orders(&self) -> OrderLifecycle {
        OrderLifecycle::new(self.repo.clone(), self.hub.clone())
    }

    pub fn calls(&self) -> CallLifecycle {
        CallLifecycle::new(self.repo.clone(), self.hub.clone())
    }

    pub fn tables(&self) -> TableLifecycle {
        TableLifecycle::new(self.repo.clone(), self.hub.clone())
    }
}
