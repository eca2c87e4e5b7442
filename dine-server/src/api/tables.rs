//! Table handlers (behind the permission gate)

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::models::{DiningTable, TableStatusUpdate};
use shared::{ApiResponse, AppResult};

use super::extract::{ApiPath, JsonBody};
use crate::core::AppState;
use crate::gate::RequestContext;

#[derive(Debug, Deserialize)]
pub struct TablePath {
    table_id: i64,
}

/// GET /api/tables
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let tables = state.tables().list(ctx.store_id).await?;
    Ok(Json(ApiResponse::success(tables)))
}

/// PATCH /api/tables/{table_id}/status
pub async fn update_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiPath(path): ApiPath<TablePath>,
    JsonBody(body): JsonBody<TableStatusUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = state
        .tables()
        .set_status(ctx.store_id, path.table_id, &body.status)
        .await?;
    Ok(Json(ApiResponse::success(table)))
}
