//! Staff order handlers (behind the permission gate)

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::models::{Order, OrderCreate, OrderDetail, OrderStatus, OrderStatusUpdate};
use shared::{ApiResponse, AppResult};

use super::StatusFilter;
use super::extract::{ApiPath, ApiQuery, JsonBody};
use crate::core::AppState;
use crate::gate::{MANAGERS, RequestContext};
use crate::lifecycle::order::parse_status;

#[derive(Debug, Deserialize)]
pub struct OrderPath {
    order_id: i64,
}

/// GET /api/orders
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state
        .orders()
        .list(ctx.store_id, filter.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(input): JsonBody<OrderCreate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders().create(ctx.store_id, input).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// GET /api/orders/{order_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiPath(path): ApiPath<OrderPath>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.orders().get(ctx.store_id, path.order_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// PATCH /api/orders/{order_id}/status
///
/// Cancelling is reserved for owners and managers.
pub async fn update_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    ApiPath(path): ApiPath<OrderPath>,
    JsonBody(body): JsonBody<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let target = parse_status(&body.status)?;
    if target == OrderStatus::Cancelled {
        MANAGERS.check_role(&ctx)?;
    }

    let order = state
        .orders()
        .transition(ctx.store_id, path.order_id, target)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}
