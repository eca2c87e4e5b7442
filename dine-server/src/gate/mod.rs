//! Permission gate
//!
//! Fixed order for every protected store-scoped request:
//!
//! 1. authenticate (valid session, operator still active)
//! 2. resolve the store (`MissingTenant` when nothing names one)
//! 3. authorize (super-admin, or a permission row for that store)
//! 4. optional role allow-list
//!
//! The first failure short-circuits; a handler only runs when all pass, and
//! then finds a [`RequestContext`] in the request extensions.
//!
//! ```ignore
//! Router::new()
//!     .route("/api/orders", get(list_orders))
//!     .route_layer(middleware::from_fn_with_state(
//!         (state.clone(), Gate::any_role()),
//!         enforce,
//!     ));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use shared::models::{Store, StoreRole};
use shared::{AppError, ErrorCode};

use crate::auth::{CurrentOperator, authenticate, extractor::bearer_token};
use crate::core::AppState;
use crate::db::TenantRepository;
use crate::security_log;
use crate::tenant;

/// Declarative access rule for a group of routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    roles: Option<&'static [StoreRole]>,
}

impl Gate {
    /// Any operator with access to the store
    pub const fn any_role() -> Self {
        Self { roles: None }
    }

    /// Only the listed store roles (super-admins always pass)
    pub const fn roles(roles: &'static [StoreRole]) -> Self {
        Self { roles: Some(roles) }
    }

    /// Apply the role allow-list to an already authorized context
    pub fn check_role(&self, ctx: &RequestContext) -> Result<(), AppError> {
        let Some(allowed) = self.roles else {
            return Ok(());
        };
        if ctx.is_super_admin {
            return Ok(());
        }
        match ctx.store_role {
            Some(role) if allowed.contains(&role) => Ok(()),
            role => {
                security_log!(
                    WARN,
                    "role_denied",
                    operator_id = ctx.operator_id,
                    store_id = ctx.store_id,
                    role = ?role,
                    required = ?allowed
                );
                Err(AppError::new(ErrorCode::RoleRequired)
                    .with_detail("required", allowed.iter().map(|r| r.as_db()).collect::<Vec<_>>()))
            }
        }
    }
}

/// Owners and managers only
pub const MANAGERS: Gate = Gate::roles(&[StoreRole::Owner, StoreRole::Manager]);

/// Authorized operator + store of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub operator_id: i64,
    pub username: String,
    pub is_super_admin: bool,
    pub store_id: i64,
    pub store_name: String,
    /// `None` for a super-admin without a permission row
    pub store_role: Option<StoreRole>,
}

/// Decide whether an operator may act on a store
///
/// Returns the operator's role in that store.
pub async fn authorize<R>(
    repo: &R,
    operator: &CurrentOperator,
    store: &Store,
) -> Result<Option<StoreRole>, AppError>
where
    R: TenantRepository + ?Sized,
{
    let permission = repo.find_permission(operator.id, store.id).await?;
    match permission {
        Some(p) => Ok(Some(p.role)),
        None if operator.is_super_admin => Ok(None),
        None => {
            security_log!(
                WARN,
                "store_access_denied",
                operator_id = operator.id,
                username = %operator.username,
                store_id = store.id
            );
            Err(AppError::new(ErrorCode::StoreAccessDenied).with_detail("store_id", store.id))
        }
    }
}

/// Gate middleware; state is the app state paired with the route group's rule
pub async fn enforce(
    State((state, gate)): State<(AppState, Gate)>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. authenticate
    let token = bearer_token(req.headers()).inspect_err(|_| {
        security_log!(WARN, "auth_missing", uri = %req.uri());
    })?;
    let operator = authenticate(&state, token).await?;

    // 2. resolve tenant
    let (mut req, store) = tenant::resolve_store(&state, req).await?;
    let store = store.ok_or_else(AppError::missing_tenant)?;

    // 3. authorize
    let store_role = authorize(&*state.repo, &operator, &store).await?;

    let ctx = RequestContext {
        operator_id: operator.id,
        username: operator.username.clone(),
        is_super_admin: operator.is_super_admin,
        store_id: store.id,
        store_name: store.name,
        store_role,
    };

    // 4. role allow-list
    gate.check_role(&ctx)?;

    req.extensions_mut().insert(operator);
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::internal("Route is not behind the permission gate"))
    }
}
