//! HTTP routes
//!
//! | Group | Guard |
//! |-------|-------|
//! | `/health`, `/api/auth/login` | public |
//! | `/api/auth/me`, `/api/auth/refresh` | session |
//! | `/api/{orders,calls,tables}` and `/api/stores/{store_id}/…` | permission gate |
//! | `/api/customer/…` | active store only |
//! | `/ws` | optional session, checked per join |

pub mod auth;
pub mod calls;
pub mod customer;
pub mod extract;
pub mod health;
pub mod orders;
pub mod tables;


use std::time::Duration;

use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::{AppState, Config};
use crate::gate::{self, Gate};
use crate::realtime::ws;
use crate::tenant;

/// Optional `?status=` filter of list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub status: Option<String>,
}

/// Every route with state applied, without transport middleware
pub fn router(state: AppState) -> Router {
    let store_routes = store_routes(&state);

    let customer = Router::new()
        .route("/orders", post(customer::create_order))
        .route("/orders/{order_id}", get(customer::get_order))
        .route("/calls", post(customer::create_call))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant::require_store,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/refresh", post(auth::refresh))
        .nest("/api", store_routes.clone())
        .nest("/api/stores/{store_id}", store_routes)
        .nest("/api/customer", customer)
        .route("/ws", get(ws::handle_ws))
        .with_state(state)
}

/// Store-scoped staff routes behind the permission gate
///
/// `route_layer` runs the gate after routing so path parameters are visible
/// to tenant resolution.
fn store_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/{order_id}", get(orders::get_by_id))
        .route("/orders/{order_id}/status", patch(orders::update_status))
        .route("/calls", get(calls::list))
        .route("/calls/{call_id}/status", patch(calls::update_status))
        .route("/calls/{call_id}/quick-respond", post(calls::quick_respond))
        .route("/tables", get(tables::list))
        .route("/tables/{table_id}/status", patch(tables::update_status))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), Gate::any_role()),
            gate::enforce,
        ))
}

/// Full application: routes plus tracing, CORS and request timeout
pub fn build_app(state: AppState, config: &Config) -> Router {
    router(state)
        .layer(TimeoutLayer::new(Duration::from_millis(config.request_timeout_ms)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
