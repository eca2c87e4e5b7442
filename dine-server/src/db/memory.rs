//! In-memory repository for tests
//!
//! Every async method yields once before touching state, so concurrently
//! joined futures interleave at the same points real I/O would.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{
    Call, CallStatus, DiningTable, MenuItem, Operator, Order, OrderDetail, OrderItem, OrderStatus,
    Store, StorePermission, StoreRole, TableStatus,
};

use super::{
    CallRepository, CallUpdate, NewCall, NewOrder, OrderRepository, TableRepository,
    TenantRepository, day_key, format_order_number,
};
use crate::core::{RepoError, RepoResult};

#[derive(Default)]
struct Inner {
    stores: Vec<Store>,
    operators: Vec<Operator>,
    permissions: Vec<StorePermission>,
    tables: Vec<DiningTable>,
    menu: Vec<MenuItem>,
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    sequences: HashMap<(i64, String), i64>,
    calls: Vec<Call>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        1000 + self.next_id
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_store(&self, id: i64, name: &str, is_active: bool) {
        self.inner.lock().stores.push(Store {
            id,
            code: format!("S{id}"),
            name: name.to_string(),
            is_active,
        });
    }

    pub fn add_operator(&self, id: i64, username: &str, hashed_password: &str, is_super_admin: bool) {
        self.inner.lock().operators.push(Operator {
            id,
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
            is_super_admin,
            is_active: true,
        });
    }

    pub fn set_operator_active(&self, id: i64, is_active: bool) {
        if let Some(op) = self.inner.lock().operators.iter_mut().find(|o| o.id == id) {
            op.is_active = is_active;
        }
    }

    pub fn remove_operator(&self, id: i64) {
        self.inner.lock().operators.retain(|o| o.id != id);
    }

    pub fn grant(&self, operator_id: i64, store_id: i64, role: StoreRole) {
        self.inner.lock().permissions.push(StorePermission {
            operator_id,
            store_id,
            role,
        });
    }

    pub fn revoke(&self, operator_id: i64, store_id: i64) {
        self.inner
            .lock()
            .permissions
            .retain(|p| !(p.operator_id == operator_id && p.store_id == store_id));
    }

    pub fn add_table(&self, id: i64, store_id: i64, table_number: &str, is_active: bool) {
        self.inner.lock().tables.push(DiningTable {
            id,
            store_id,
            table_number: table_number.to_string(),
            status: TableStatus::Available,
            is_active,
        });
    }

    pub fn add_menu_item(&self, id: i64, store_id: i64, name: &str, price: Decimal, available: bool) {
        self.inner.lock().menu.push(MenuItem {
            id,
            store_id,
            name: name.to_string(),
            price,
            is_available: available,
        });
    }

    pub fn operator(&self, id: i64) -> Option<Operator> {
        self.inner.lock().operators.iter().find(|o| o.id == id).cloned()
    }

    pub fn table(&self, id: i64) -> Option<DiningTable> {
        self.inner.lock().tables.iter().find(|t| t.id == id).cloned()
    }

    pub fn order(&self, id: i64) -> Option<Order> {
        self.inner.lock().orders.iter().find(|o| o.id == id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().orders.len()
    }

    pub fn call(&self, id: i64) -> Option<Call> {
        self.inner.lock().calls.iter().find(|c| c.id == id).cloned()
    }
}

#[async_trait]
impl TenantRepository for MemoryRepository {
    async fn find_store(&self, store_id: i64) -> RepoResult<Option<Store>> {
        tokio::task::yield_now().await;
        Ok(self.inner.lock().stores.iter().find(|s| s.id == store_id).cloned())
    }

    async fn find_operator(&self, operator_id: i64) -> RepoResult<Option<Operator>> {
        tokio::task::yield_now().await;
        Ok(self
            .inner
            .lock()
            .operators
            .iter()
            .find(|o| o.id == operator_id)
            .cloned())
    }

    async fn find_operator_by_username(&self, username: &str) -> RepoResult<Option<Operator>> {
        tokio::task::yield_now().await;
        Ok(self
            .inner
            .lock()
            .operators
            .iter()
            .find(|o| o.username == username)
            .cloned())
    }

    async fn find_permission(
        &self,
        operator_id: i64,
        store_id: i64,
    ) -> RepoResult<Option<StorePermission>> {
        tokio::task::yield_now().await;
        Ok(self
            .inner
            .lock()
            .permissions
            .iter()
            .find(|p| p.operator_id == operator_id && p.store_id == store_id)
            .cloned())
    }
}

#[async_trait]
impl TableRepository for MemoryRepository {
    async fn find_table(&self, store_id: i64, table_id: i64) -> RepoResult<Option<DiningTable>> {
        tokio::task::yield_now().await;
        Ok(self
            .inner
            .lock()
            .tables
            .iter()
            .find(|t| t.id == table_id && t.store_id == store_id)
            .cloned())
    }

    async fn list_tables(&self, store_id: i64) -> RepoResult<Vec<DiningTable>> {
        tokio::task::yield_now().await;
        let mut tables: Vec<DiningTable> = self
            .inner
            .lock()
            .tables
            .iter()
            .filter(|t| t.store_id == store_id && t.is_active)
            .cloned()
            .collect();
        tables.sort_by(|a, b| a.table_number.cmp(&b.table_number));
        Ok(tables)
    }

    async fn set_table_status(
        &self,
        store_id: i64,
        table_id: i64,
        status: TableStatus,
    ) -> RepoResult<Option<DiningTable>> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock();
        let table = inner
            .tables
            .iter_mut()
            .find(|t| t.id == table_id && t.store_id == store_id && t.is_active);
        Ok(table.map(|t| {
            t.status = status;
            t.clone()
        }))
    }
}

#[async_trait]
impl OrderRepository for MemoryRepository {
    async fn find_menu_items(&self, store_id: i64, menu_ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
        tokio::task::yield_now().await;
        Ok(self
            .inner
            .lock()
            .menu
            .iter()
            .filter(|m| m.store_id == store_id && menu_ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn create_order(&self, order: NewOrder) -> RepoResult<OrderDetail> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock();

        // Validate before writing anything, like a rolled-back transaction
        let table_ok = inner
            .tables
            .iter()
            .any(|t| t.id == order.table_id && t.store_id == order.store_id && t.is_active);
        if !table_ok {
            return Err(RepoError::NotFound("Table"));
        }

        let day = day_key(order.created_at);
        let sequence = {
            let seq = inner.sequences.entry((order.store_id, day.clone())).or_insert(0);
            *seq += 1;
            *seq
        };

        let header = Order {
            id: inner.next_id(),
            store_id: order.store_id,
            table_id: order.table_id,
            order_number: format_order_number(&day, sequence),
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            created_at: order.created_at,
            updated_at: order.created_at,
        };

        let mut items = Vec::with_capacity(order.lines.len());
        for line in order.lines {
            items.push(OrderItem {
                id: inner.next_id(),
                order_id: header.id,
                menu_id: line.menu_id,
                menu_name: line.menu_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total,
            });
        }

        inner.orders.push(header.clone());
        inner.items.extend(items.iter().cloned());
        if let Some(table) = inner.tables.iter_mut().find(|t| t.id == order.table_id) {
            table.status = TableStatus::Occupied;
        }

        Ok(OrderDetail {
            order: header,
            items,
        })
    }

    async fn find_order(&self, store_id: i64, order_id: i64) -> RepoResult<Option<OrderDetail>> {
        tokio::task::yield_now().await;
        let inner = self.inner.lock();
        let Some(order) = inner
            .orders
            .iter()
            .find(|o| o.id == order_id && o.store_id == store_id)
            .cloned()
        else {
            return Ok(None);
        };
        let items = inner
            .items
            .iter()
            .filter(|i| i.order_id == order.id)
            .cloned()
            .collect();
        Ok(Some(OrderDetail { order, items }))
    }

    async fn list_orders(
        &self,
        store_id: i64,
        status: Option<OrderStatus>,
    ) -> RepoResult<Vec<Order>> {
        tokio::task::yield_now().await;
        let mut orders: Vec<Order> = self
            .inner
            .lock()
            .orders
            .iter()
            .filter(|o| o.store_id == store_id && status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn transition_order(
        &self,
        store_id: i64,
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock();
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.store_id == store_id && o.status == from);
        Ok(order.map(|o| {
            o.status = to;
            o.updated_at = now;
            o.clone()
        }))
    }
}

#[async_trait]
impl CallRepository for MemoryRepository {
    async fn create_call(&self, call: NewCall) -> RepoResult<Call> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock();
        let created = Call {
            id: inner.next_id(),
            store_id: call.store_id,
            table_id: call.table_id,
            call_type: call.call_type,
            status: CallStatus::Pending,
            message: call.message,
            responded_by: None,
            responded_at: None,
            completed_at: None,
            created_at: call.created_at,
        };
        inner.calls.push(created.clone());
        Ok(created)
    }

    async fn find_call(&self, store_id: i64, call_id: i64) -> RepoResult<Option<Call>> {
        tokio::task::yield_now().await;
        Ok(self
            .inner
            .lock()
            .calls
            .iter()
            .find(|c| c.id == call_id && c.store_id == store_id)
            .cloned())
    }

    async fn list_calls(
        &self,
        store_id: i64,
        status: Option<CallStatus>,
    ) -> RepoResult<Vec<Call>> {
        tokio::task::yield_now().await;
        let mut calls: Vec<Call> = self
            .inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.store_id == store_id && status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        calls.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(calls)
    }

    async fn transition_call(
        &self,
        store_id: i64,
        call_id: i64,
        from: CallStatus,
        update: CallUpdate,
    ) -> RepoResult<Option<Call>> {
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock();
        let call = inner
            .calls
            .iter_mut()
            .find(|c| c.id == call_id && c.store_id == store_id && c.status == from);
        Ok(call.map(|c| {
            c.status = update.status;
            c.responded_by = update.responded_by.or(c.responded_by);
            c.responded_at = update.responded_at.or(c.responded_at);
            c.completed_at = update.completed_at.or(c.completed_at);
            c.clone()
        }))
    }
}
