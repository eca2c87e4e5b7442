//! Table status management

use std::sync::Arc;

use shared::models::{DiningTable, TableStatus};
use shared::{AppError, ErrorCode};

use crate::core::ServiceResult;
use crate::db::Repository;
use crate::realtime::RealtimeHub;

pub struct TableLifecycle {
    repo: Arc<dyn Repository>,
    hub: RealtimeHub,
}

impl TableLifecycle {
    pub fn new(repo: Arc<dyn Repository>, hub: RealtimeHub) -> Self {
        Self { repo, hub }
    }

    /// Active tables of the store, ordered by table number
    pub async fn list(&self, store_id: i64) -> ServiceResult<Vec<DiningTable>> {
        Ok(self.repo.list_tables(store_id).await?)
    }

    /// Set a table's status directly; any status may follow any other
    pub async fn set_status(
        &self,
        store_id: i64,
        table_id: i64,
        raw: &str,
    ) -> ServiceResult<DiningTable> {
        let status = raw.parse::<TableStatus>().map_err(|e| {
            AppError::with_message(ErrorCode::UnknownTableStatus, e.to_string())
                .with_detail("status", raw)
        })?;

        let table = self
            .repo
            .set_table_status(store_id, table_id, status)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id))?;

        tracing::info!(store_id, table_id, status = %status, "Table status changed");
        self.hub.notify_table_status_changed(&table);
        Ok(table)
    }
}
