//! Staff call handlers (behind the permission gate)

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::models::{Call, CallStatusUpdate};
use shared::{ApiResponse, AppResult};

use super::StatusFilter;
use super::extract::{ApiPath, ApiQuery, JsonBody};
use crate::core::AppState;
use crate::gate::RequestContext;
use crate::lifecycle::call::parse_status;

#[derive(Debug, Deserialize)]
pub struct CallPath {
    call_id: i64,
}

/// GET /api/calls
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> AppResult<Json<ApiResponse<Vec<Call>>>> {
    let calls = state
        .calls()
        .list(ctx.store_id, filter.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(calls)))
}

/// PATCH /api/calls/{call_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiPath(path): ApiPath<CallPath>,
    JsonBody(body): JsonBody<CallStatusUpdate>,
) -> AppResult<Json<ApiResponse<Call>>> {
    let target = parse_status(&body.status)?;
    let call = state
        .calls()
        .transition(ctx.store_id, path.call_id, target, ctx.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(call)))
}

/// POST /api/calls/{call_id}/quick-respond
pub async fn quick_respond(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiPath(path): ApiPath<CallPath>,
) -> AppResult<Json<ApiResponse<Call>>> {
    let call = state
        .calls()
        .quick_respond(ctx.store_id, path.call_id, ctx.operator_id)
        .await?;
    Ok(Json(ApiResponse::success(call)))
}
