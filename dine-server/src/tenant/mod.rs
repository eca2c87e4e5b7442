//! Tenant (store) resolution
//!
//! A request may name its store in four places, consulted in this order:
//!
//! 1. path parameter `store_id`
//! 2. query `store_id` / `storeId`
//! 3. JSON body top-level `store_id` / `storeId`
//! 4. header `X-Store-ID`
//!
//! The first *numeric* candidate wins; a non-numeric value counts as absent
//! and the next source is consulted. Extraction ([`resolve_candidate`]) is
//! pure; the store lookup is a separate step.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{FromRequestParts, Query, RawPathParams, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use shared::models::Store;
use shared::util::{parse_id_str, parse_loose_id};
use shared::{AppError, ErrorCode};

use crate::core::AppState;
use crate::db::TenantRepository;

/// Header carrying the store id
pub const STORE_HEADER: &str = "x-store-id";

const PATH_KEY: &str = "store_id";
const QUERY_KEYS: [&str; 2] = ["store_id", "storeId"];
const BODY_KEYS: [&str; 2] = ["store_id", "storeId"];

/// Largest JSON body buffered while looking for a store id
const MAX_BUFFERED_BODY: usize = 1024 * 1024;

/// Outcome of candidate extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantLookup {
    Found(i64),
    Absent,
}

/// Raw store-id candidates of one request, per source
#[derive(Debug, Default, Clone)]
pub struct TenantSources {
    pub path: Option<String>,
    /// Query values in key precedence order
    pub query: Vec<String>,
    /// Body values in key precedence order
    pub body: Vec<Value>,
    pub header: Option<String>,
}

impl TenantSources {
    pub fn path(mut self, value: impl Into<String>) -> Self {
        self.path = Some(value.into());
        self
    }

    pub fn query_params(mut self, params: &HashMap<String, String>) -> Self {
        self.query = QUERY_KEYS
            .iter()
            .filter_map(|key| params.get(*key).cloned())
            .collect();
        self
    }

    pub fn json_body(mut self, body: &Value) -> Self {
        self.body = BODY_KEYS
            .iter()
            .filter_map(|key| body.get(*key).cloned())
            .collect();
        self
    }

    pub fn header(mut self, value: impl Into<String>) -> Self {
        self.header = Some(value.into());
        self
    }
}

/// Pick the store id by precedence path → query → body → header
pub fn resolve_candidate(sources: &TenantSources) -> TenantLookup {
    sources
        .path
        .as_deref()
        .and_then(parse_id_str)
        .or_else(|| sources.query.iter().find_map(|v| parse_id_str(v)))
        .or_else(|| sources.body.iter().find_map(parse_loose_id))
        .or_else(|| sources.header.as_deref().and_then(parse_id_str))
        .map_or(TenantLookup::Absent, TenantLookup::Found)
}

fn is_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            let mime = ct.split(';').next().unwrap_or_default().trim();
            mime == "application/json" || mime.ends_with("+json")
        })
}

/// Gather candidates from a request
///
/// A JSON body is buffered and re-attached unchanged so handlers can still
/// extract it.
pub async fn collect_sources(req: Request) -> Result<(Request, TenantSources), AppError> {
    let (mut parts, body) = req.into_parts();
    let mut sources = TenantSources::default();

    if let Ok(params) = RawPathParams::from_request_parts(&mut parts, &()).await {
        sources.path = params
            .iter()
            .find(|(key, _)| *key == PATH_KEY)
            .map(|(_, value)| value.to_string());
    }

    if let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        sources = sources.query_params(&params);
    }

    if let Some(value) = parts.headers.get(STORE_HEADER).and_then(|v| v.to_str().ok()) {
        sources = sources.header(value);
    }

    let body = if is_json(&parts) {
        let bytes = axum::body::to_bytes(body, MAX_BUFFERED_BODY)
            .await
            .map_err(|_| AppError::validation("Request body too large or unreadable"))?;
        if let Ok(json) = serde_json::from_slice::<Value>(&bytes) {
            sources = sources.json_body(&json);
        }
        Body::from(bytes)
    } else {
        body
    };

    Ok((Request::from_parts(parts, body), sources))
}

/// Load a resolved store; missing → not found, deactivated → forbidden
pub async fn lookup_store<R>(repo: &R, store_id: i64) -> Result<Store, AppError>
where
    R: TenantRepository + ?Sized,
{
    match repo.find_store(store_id).await? {
        Some(store) if store.is_active => Ok(store),
        Some(_) => Err(AppError::new(ErrorCode::StoreInactive).with_detail("store_id", store_id)),
        None => Err(AppError::new(ErrorCode::StoreNotFound).with_detail("store_id", store_id)),
    }
}

/// Resolve the store of a request; `None` when no source names one
pub async fn resolve_store(
    state: &AppState,
    req: Request,
) -> Result<(Request, Option<Store>), AppError> {
    let (req, sources) = collect_sources(req).await?;
    match resolve_candidate(&sources) {
        TenantLookup::Found(store_id) => {
            let store = lookup_store(&*state.repo, store_id).await?;
            Ok((req, Some(store)))
        }
        TenantLookup::Absent => Ok((req, None)),
    }
}

/// Active store of a request that required one
#[derive(Debug, Clone)]
pub struct ResolvedStore(pub Store);

impl<S: Send + Sync> FromRequestParts<S> for ResolvedStore {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedStore>()
            .cloned()
            .ok_or_else(AppError::missing_tenant)
    }
}

/// Middleware for unauthenticated store-scoped routes (customer side)
pub async fn require_store(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut req, store) = resolve_store(&state, req).await?;
    let store = store.ok_or_else(AppError::missing_tenant)?;
    req.extensions_mut().insert(ResolvedStore(store));
    Ok(next.run(req).await)
}
