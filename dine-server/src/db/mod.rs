//! Persistence
//!
//! The service talks to storage only through the repository traits below.
//! [`PgRepository`] is the production implementation; tests substitute an
//! in-memory one.
//!
//! Every store-scoped method takes the `store_id` explicitly and never
//! returns rows of another store.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{
    Call, CallStatus, DiningTable, MenuItem, Operator, Order, OrderDetail, OrderStatus, Store,
    StorePermission, TableStatus,
};

use crate::core::RepoResult;

pub use postgres::PgRepository;

/// Stores, operators and their per-store permissions
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_store(&self, store_id: i64) -> RepoResult<Option<Store>>;

    async fn find_operator(&self, operator_id: i64) -> RepoResult<Option<Operator>>;

    async fn find_operator_by_username(&self, username: &str) -> RepoResult<Option<Operator>>;

    async fn find_permission(
        &self,
        operator_id: i64,
        store_id: i64,
    ) -> RepoResult<Option<StorePermission>>;
}

/// Dining tables
#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Table of the store, active or not
    async fn find_table(&self, store_id: i64, table_id: i64) -> RepoResult<Option<DiningTable>>;

    /// Active tables of the store, ordered by table number
    async fn list_tables(&self, store_id: i64) -> RepoResult<Vec<DiningTable>>;

    /// `None` when no active table of the store matched
    async fn set_table_status(
        &self,
        store_id: i64,
        table_id: i64,
        status: TableStatus,
    ) -> RepoResult<Option<DiningTable>>;
}

/// Priced line of an order about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub menu_id: i64,
    pub menu_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Fully validated order ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub store_id: i64,
    pub table_id: i64,
    pub lines: Vec<NewOrderLine>,
    pub total_amount: Decimal,
    pub created_at: i64,
}

/// Orders, their lines and the menu used to price them
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Menu entries of the store among `menu_ids` (missing ids are simply absent)
    async fn find_menu_items(&self, store_id: i64, menu_ids: &[i64]) -> RepoResult<Vec<MenuItem>>;

    /// Atomically allocate the day's order number, insert order + lines and
    /// mark the table occupied. Nothing is written if any step fails.
    async fn create_order(&self, order: NewOrder) -> RepoResult<OrderDetail>;

    async fn find_order(&self, store_id: i64, order_id: i64) -> RepoResult<Option<OrderDetail>>;

    /// Orders of the store, newest first
    async fn list_orders(
        &self,
        store_id: i64,
        status: Option<OrderStatus>,
    ) -> RepoResult<Vec<Order>>;

    /// Conditional status update keyed by (order, store, expected status).
    ///
    /// `None` when zero rows matched: the order changed concurrently.
    async fn transition_order(
        &self,
        store_id: i64,
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
        now: i64,
    ) -> RepoResult<Option<Order>>;
}

/// New customer call
#[derive(Debug, Clone, PartialEq)]
pub struct NewCall {
    pub store_id: i64,
    pub table_id: i64,
    pub call_type: shared::models::CallType,
    pub message: Option<String>,
    pub created_at: i64,
}

/// Column changes of a call transition; `None` stamps are left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallUpdate {
    pub status: CallStatus,
    pub responded_by: Option<i64>,
    pub responded_at: Option<i64>,
    pub completed_at: Option<i64>,
}

/// Customer service calls
#[async_trait]
pub trait CallRepository: Send + Sync {
    async fn create_call(&self, call: NewCall) -> RepoResult<Call>;

    async fn find_call(&self, store_id: i64, call_id: i64) -> RepoResult<Option<Call>>;

    /// Calls of the store, newest first
    async fn list_calls(&self, store_id: i64, status: Option<CallStatus>)
    -> RepoResult<Vec<Call>>;

    /// Conditional update keyed by (call, store, expected status).
    ///
    /// `None` when zero rows matched.
    async fn transition_call(
        &self,
        store_id: i64,
        call_id: i64,
        from: CallStatus,
        update: CallUpdate,
    ) -> RepoResult<Option<Call>>;
}

/// Everything the service needs from storage
pub trait Repository: TenantRepository + TableRepository + OrderRepository + CallRepository {}

impl<T> Repository for T where
    T: TenantRepository + TableRepository + OrderRepository + CallRepository
{
}

/// `YYYYMMDD-NNNN` order number for a UTC day key and per-day sequence
pub fn format_order_number(day: &str, sequence: i64) -> String {
    format!("{day}-{sequence:04}")
}

/// UTC day key (`YYYYMMDD`) of a millisecond timestamp
pub fn day_key(timestamp_millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .format("%Y%m%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers() {
        // 2024-03-05T10:00:00Z
        assert_eq!(day_key(1_709_632_800_000), "20240305");
        assert_eq!(format_order_number("20240305", 7), "20240305-0007");
        assert_eq!(format_order_number("20240305", 12345), "20240305-12345");
    }
}
