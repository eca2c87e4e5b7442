//! Call lifecycle ("call waiter")
//!
//! `responded` stamps the responding operator and time; `completed` stamps
//! the completion time. Quick-respond collapses pending → responded →
//! completed into one conditional update where both stamps share a single
//! timestamp, and emits a single event.

use std::sync::Arc;

use shared::models::{Call, CallCreate, CallStatus, CallType};
use shared::util::now_millis;
use shared::{AppError, ErrorCode};

use crate::core::ServiceResult;
use crate::db::{CallUpdate, NewCall, Repository};
use crate::realtime::RealtimeHub;

/// Strict parse of a requested call status
pub fn parse_status(raw: &str) -> Result<CallStatus, AppError> {
    raw.parse::<CallStatus>().map_err(|e| {
        AppError::with_message(ErrorCode::UnknownCallStatus, e.to_string()).with_detail("status", raw)
    })
}

/// Column changes implied by entering `target`
fn stamps_for(target: CallStatus, operator_id: i64, now: i64) -> CallUpdate {
    let mut update = CallUpdate {
        status: target,
        responded_by: None,
        responded_at: None,
        completed_at: None,
    };
    match target {
        CallStatus::Responded => {
            update.responded_by = Some(operator_id);
            update.responded_at = Some(now);
        }
        CallStatus::Completed => update.completed_at = Some(now),
        CallStatus::Pending | CallStatus::Cancelled => {}
    }
    update
}

/// Call entry points
pub struct CallLifecycle {
    repo: Arc<dyn Repository>,
    hub: RealtimeHub,
}

impl CallLifecycle {
    pub fn new(repo: Arc<dyn Repository>, hub: RealtimeHub) -> Self {
        Self { repo, hub }
    }

    /// Record a customer call and emit exactly one `new-call`
    pub async fn create(&self, store_id: i64, input: CallCreate) -> ServiceResult<Call> {
        let call_type = input.call_type.parse::<CallType>().map_err(|e| {
            AppError::with_message(ErrorCode::UnknownCallType, e.to_string())
                .with_detail("call_type", input.call_type.as_str())
        })?;

        let table = self
            .repo
            .find_table(store_id, input.table_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| {
                AppError::new(ErrorCode::TableNotFound).with_detail("table_id", input.table_id)
            })?;

        let message = input
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let call = self
            .repo
            .create_call(NewCall {
                store_id,
                table_id: table.id,
                call_type,
                message,
                created_at: now_millis(),
            })
            .await?;

        tracing::info!(
            store_id,
            call_id = call.id,
            table_id = call.table_id,
            call_type = %call.call_type,
            "Call created"
        );

        self.hub.notify_new_call(&call);
        Ok(call)
    }

    /// Move a call to `target` on behalf of an operator
    pub async fn transition(
        &self,
        store_id: i64,
        call_id: i64,
        target: CallStatus,
        operator_id: i64,
    ) -> ServiceResult<Call> {
        let current = self.find(store_id, call_id).await?;

        if !current.status.can_transition_to(target) {
            return Err(AppError::with_message(
                ErrorCode::CallInvalidTransition,
                format!("Cannot move call from {} to {}", current.status, target),
            )
            .with_detail("from", current.status.as_db())
            .with_detail("to", target.as_db())
            .into());
        }

        let update = stamps_for(target, operator_id, now_millis());
        self.apply(store_id, current, update).await
    }

    /// pending → completed in one step, stamping responder and completion together
    pub async fn quick_respond(
        &self,
        store_id: i64,
        call_id: i64,
        operator_id: i64,
    ) -> ServiceResult<Call> {
        let current = self.find(store_id, call_id).await?;

        if current.status != CallStatus::Pending {
            return Err(AppError::with_message(
                ErrorCode::CallInvalidTransition,
                format!("Cannot quick-respond to a {} call", current.status),
            )
            .with_detail("from", current.status.as_db())
            .into());
        }

        let now = now_millis();
        let update = CallUpdate {
            status: CallStatus::Completed,
            responded_by: Some(operator_id),
            responded_at: Some(now),
            completed_at: Some(now),
        };
        self.apply(store_id, current, update).await
    }

    /// Conditional write, then exactly one `call-status-changed`
    async fn apply(&self, store_id: i64, current: Call, update: CallUpdate) -> ServiceResult<Call> {
        let updated = self
            .repo
            .transition_call(store_id, current.id, current.status, update)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::CallStatusConflict)
                    .with_detail("call_id", current.id)
                    .with_detail("expected", current.status.as_db())
            })?;

        tracing::info!(
            store_id,
            call_id = updated.id,
            from = %current.status,
            to = %updated.status,
            "Call status changed"
        );

        self.hub.notify_call_status_changed(&updated);
        Ok(updated)
    }

    async fn find(&self, store_id: i64, call_id: i64) -> ServiceResult<Call> {
        Ok(self
            .repo
            .find_call(store_id, call_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CallNotFound).with_detail("call_id", call_id))?)
    }

    /// Calls of the store, optionally filtered by a status name
    pub async fn list(&self, store_id: i64, status: Option<&str>) -> ServiceResult<Vec<Call>> {
        let status = status
            .map(|raw| {
                raw.parse::<CallStatus>()
                    .map_err(|e| AppError::validation(e.to_string()).with_detail("status", raw))
            })
            .transpose()?;
        Ok(self.repo.list_calls(store_id, status).await?)
    }
}
