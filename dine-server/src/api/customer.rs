//! Customer-facing handlers
//!
//! No session; the store is resolved from the request and must be active.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::models::{Call, CallCreate, OrderCreate, OrderDetail};
use shared::{ApiResponse, AppResult};

use super::extract::{ApiPath, JsonBody};
use crate::core::AppState;
use crate::tenant::ResolvedStore;

#[derive(Debug, Deserialize)]
pub struct OrderPath {
    order_id: i64,
}

/// POST /api/customer/orders
pub async fn create_order(
    State(state): State<AppState>,
    ResolvedStore(store): ResolvedStore,
    JsonBody(input): JsonBody<OrderCreate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders().create(store.id, input).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// GET /api/customer/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    ResolvedStore(store): ResolvedStore,
    ApiPath(path): ApiPath<OrderPath>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders().get(store.id, path.order_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /api/customer/calls
pub async fn create_call(
    State(state): State<AppState>,
    ResolvedStore(store): ResolvedStore,
    JsonBody(input): JsonBody<CallCreate>,
) -> AppResult<Json<ApiResponse<Call>>> {
    let call = state.calls().create(store.id, input).await?;
    Ok(Json(ApiResponse::success(call)))
}
