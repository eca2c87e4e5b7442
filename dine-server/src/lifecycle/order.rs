//! Order lifecycle
//!
//! Creation validates the table and every line against the store's menu,
//! prices lines server-side and persists everything in one transaction.
//! Transitions follow [`OrderStatus::successors`] and are applied with a
//! conditional update on the expected current status.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{
    DiningTable, MenuItem, Order, OrderCreate, OrderDetail, OrderItemInput, OrderStatus, TableStatus,
};
use shared::util::now_millis;
use shared::{AppError, ErrorCode};

use crate::core::{RepoError, ServiceError, ServiceResult};
use crate::db::{NewOrder, NewOrderLine, Repository};
use crate::realtime::RealtimeHub;

/// Strict parse of a requested order status
pub fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse::<OrderStatus>().map_err(|e| {
        AppError::with_message(ErrorCode::UnknownOrderStatus, e.to_string()).with_detail("status", raw)
    })
}

/// Price requested lines against the store's menu
///
/// Duplicate menu ids stay separate lines.
pub fn price_lines(
    inputs: &[OrderItemInput],
    menu: &HashMap<i64, MenuItem>,
) -> Result<(Vec<NewOrderLine>, Decimal), AppError> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut lines = Vec::with_capacity(inputs.len());
    let mut total = Decimal::ZERO;

    for input in inputs {
        let quantity = i32::try_from(input.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                AppError::new(ErrorCode::InvalidQuantity)
                    .with_detail("menu_id", input.menu_id)
                    .with_detail("quantity", input.quantity)
            })?;

        let item = menu
            .get(&input.menu_id)
            .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_id", input.menu_id))?;
        if !item.is_available {
            return Err(
                AppError::new(ErrorCode::MenuItemUnavailable).with_detail("menu_id", input.menu_id)
            );
        }

        let line_total = item.price * Decimal::from(quantity);
        total += line_total;
        lines.push(NewOrderLine {
            menu_id: item.id,
            menu_name: item.name.clone(),
            quantity,
            unit_price: item.price,
            line_total,
        });
    }

    Ok((lines, total))
}

/// Order entry points
pub struct OrderLifecycle {
    repo: Arc<dyn Repository>,
    hub: RealtimeHub,
}

impl OrderLifecycle {
    pub fn new(repo: Arc<dyn Repository>, hub: RealtimeHub) -> Self {
        Self { repo, hub }
    }

    /// Create an order and emit exactly one `new-order`
    pub async fn create(&self, store_id: i64, input: OrderCreate) -> ServiceResult<OrderDetail> {
        // Cheap validation first; nothing is read for an empty order
        if input.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }

        let table = self
            .repo
            .find_table(store_id, input.table_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| {
                AppError::new(ErrorCode::TableNotFound).with_detail("table_id", input.table_id)
            })?;

        let mut menu_ids: Vec<i64> = input.items.iter().map(|i| i.menu_id).collect();
        menu_ids.sort_unstable();
        menu_ids.dedup();
        let menu: HashMap<i64, MenuItem> = self
            .repo
            .find_menu_items(store_id, &menu_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let (lines, total_amount) = price_lines(&input.items, &menu)?;

        if let Some(claimed) = input.total_amount
            && claimed != total_amount
        {
            tracing::debug!(
                store_id,
                claimed = %claimed,
                computed = %total_amount,
                "Client total ignored"
            );
        }

        let detail = self
            .repo
            .create_order(NewOrder {
                store_id,
                table_id: table.id,
                lines,
                total_amount,
                created_at: now_millis(),
            })
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => ServiceError::from(
                    AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table.id),
                ),
                other => ServiceError::from(other),
            })?;

        tracing::info!(
            store_id,
            order_id = detail.order.id,
            order_number = %detail.order.order_number,
            total = %detail.order.total_amount,
            "Order created"
        );

        self.hub.notify_new_order(&detail);
        if table.status != TableStatus::Occupied {
            self.hub.notify_table_status_changed(&DiningTable {
                status: TableStatus::Occupied,
                ..table
            });
        }
        Ok(detail)
    }

    /// Move an order to `target`, emitting exactly one `order-status-changed`
    pub async fn transition(
        &self,
        store_id: i64,
        order_id: i64,
        target: OrderStatus,
    ) -> ServiceResult<Order> {
        let current = self
            .repo
            .find_order(store_id, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?
            .order;

        if !current.status.can_transition_to(target) {
            return Err(AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!("Cannot move order from {} to {}", current.status, target),
            )
            .with_detail("from", current.status.as_db())
            .with_detail("to", target.as_db())
            .into());
        }

        let updated = self
            .repo
            .transition_order(store_id, order_id, current.status, target, now_millis())
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderStatusConflict)
                    .with_detail("order_id", order_id)
                    .with_detail("expected", current.status.as_db())
            })?;

        tracing::info!(
            store_id,
            order_id,
            from = %current.status,
            to = %updated.status,
            "Order status changed"
        );

        self.hub.notify_order_status_changed(&updated, current.status);
        Ok(updated)
    }

    pub async fn get(&self, store_id: i64, order_id: i64) -> ServiceResult<OrderDetail> {
        Ok(self
            .repo
            .find_order(store_id, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?)
    }

    /// Orders of the store, optionally filtered by a status name
    pub async fn list(&self, store_id: i64, status: Option<&str>) -> ServiceResult<Vec<Order>> {
        let status = status
            .map(|raw| {
                raw.parse::<OrderStatus>()
                    .map_err(|e| AppError::validation(e.to_string()).with_detail("status", raw))
            })
            .transpose()?;
        Ok(self.repo.list_orders(store_id, status).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRepository;
    use crate::realtime::RoomKey;
    use shared::ErrorKind;
    use shared::models::TableStatus;
    use shared::realtime::ServerMessage;
    use tokio::sync::mpsc;

    fn menu_item(id: i64, price: i64, is_available: bool) -> MenuItem {
        MenuItem {
            id,
            store_id: 1,
            name: format!("item-{id}"),
            price: Decimal::from(price),
            is_available,
        }
    }

    fn menu() -> HashMap<i64, MenuItem> {
        [menu_item(100, 5000, true), menu_item(101, 1500, true), menu_item(102, 900, false)]
            .into_iter()
            .map(|m| (m.id, m))
            .collect()
    }

    fn line(menu_id: i64, quantity: i64) -> OrderItemInput {
        OrderItemInput { menu_id, quantity }
    }

    fn setup() -> (Arc<MemoryRepository>, OrderLifecycle, RealtimeHub) {
        let repo = Arc::new(MemoryRepository::new());
        repo.add_store(1, "Main", true);
        repo.add_store(2, "Other", true);
        repo.add_table(5, 1, "A1", true);
        repo.add_table(7, 2, "B1", true);
        repo.add_table(8, 1, "OLD", false);
        repo.add_menu_item(100, 1, "Bibimbap", Decimal::from(5000), true);
        repo.add_menu_item(101, 1, "Tea", Decimal::from(1500), true);
        repo.add_menu_item(200, 2, "Foreign dish", Decimal::from(3000), true);
        let hub = RealtimeHub::new();
        let lifecycle = OrderLifecycle::new(repo.clone(), hub.clone());
        (repo, lifecycle, hub)
    }

    fn staff_listener(hub: &RealtimeHub, store_id: i64) -> mpsc::Receiver<ServerMessage> {
        let (conn, rx) = hub.register();
        hub.join(conn, RoomKey::Staff { store_id });
        rx
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn create_input(table_id: i64, items: Vec<OrderItemInput>) -> OrderCreate {
        OrderCreate {
            table_id,
            items,
            total_amount: None,
        }
    }

    #[test]
    fn totals_are_computed_server_side() {
        let (lines, total) = price_lines(&[line(100, 2), line(101, 2)], &menu()).unwrap();
        assert_eq!(total, Decimal::from(13000));
        assert_eq!(lines[0].line_total, Decimal::from(10000));
        assert_eq!(lines[1].line_total, Decimal::from(3000));
    }

    #[test]
    fn duplicate_menu_ids_stay_separate_lines() {
        let (lines, total) = price_lines(&[line(100, 1), line(100, 1)], &menu()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(total, Decimal::from(10000));
    }

    #[test]
    fn bad_lines_are_rejected() {
        let err = price_lines(&[], &menu()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);

        for quantity in [0, -1, i64::from(i32::MAX) + 1] {
            let err = price_lines(&[line(100, quantity)], &menu()).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidQuantity);
            assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        }

        let err = price_lines(&[line(999, 1)], &menu()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = price_lines(&[line(102, 1)], &menu()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unknown_status_is_invalid_state() {
        assert_eq!(parse_status("ready").unwrap(), OrderStatus::Ready);
        let err = parse_status("served").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn create_occupies_table_and_notifies_once() {
        let (repo, orders, hub) = setup();
        let mut staff = staff_listener(&hub, 1);
        let mut other_store = staff_listener(&hub, 2);

        let mut input = create_input(5, vec![line(100, 2), line(101, 2)]);
        input.total_amount = Some(Decimal::from(1));
        let detail = orders.create(1, input).await.unwrap();

        assert_eq!(detail.order.total_amount, Decimal::from(13000));
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.items.len(), 2);
        assert!(detail.order.order_number.ends_with("-0001"));
        assert_eq!(repo.table(5).unwrap().status, TableStatus::Occupied);

        let events: Vec<_> = drain(&mut staff).iter().map(|e| e.event_name()).collect();
        assert_eq!(events, ["new-order", "table-status-changed"]);
        assert!(drain(&mut other_store).is_empty());

        // already occupied: no second table event
        orders.create(1, create_input(5, vec![line(101, 1)])).await.unwrap();
        let events: Vec<_> = drain(&mut staff).iter().map(|e| e.event_name()).collect();
        assert_eq!(events, ["new-order"]);
    }

    #[tokio::test]
    async fn order_numbers_increase_per_store() {
        let (_repo, orders, _hub) = setup();
        let first = orders.create(1, create_input(5, vec![line(100, 1)])).await.unwrap();
        let second = orders.create(1, create_input(5, vec![line(101, 1)])).await.unwrap();
        let foreign = orders.create(2, create_input(7, vec![line(200, 1)])).await.unwrap();

        assert!(first.order.order_number.ends_with("-0001"));
        assert!(second.order.order_number.ends_with("-0002"));
        assert!(foreign.order.order_number.ends_with("-0001"));
    }

    #[tokio::test]
    async fn failed_creation_writes_nothing() {
        let (repo, orders, hub) = setup();
        let mut staff = staff_listener(&hub, 1);

        // other store's menu entry
        let err: AppError = orders
            .create(1, create_input(5, vec![line(100, 1), line(200, 1)]))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // other store's table
        let err: AppError = orders
            .create(1, create_input(7, vec![line(100, 1)]))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        // inactive table
        let err: AppError = orders
            .create(1, create_input(8, vec![line(100, 1)]))
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        assert_eq!(repo.order_count(), 0);
        assert_eq!(repo.table(5).unwrap().status, TableStatus::Available);
        assert!(drain(&mut staff).is_empty());
    }

    #[tokio::test]
    async fn kitchen_flow_emits_one_event_per_step() {
        let (repo, orders, hub) = setup();
        let detail = orders.create(1, create_input(5, vec![line(100, 1)])).await.unwrap();
        let id = detail.order.id;
        let mut staff = staff_listener(&hub, 1);

        let (conn, mut table_rx) = hub.register();
        hub.join(conn, RoomKey::Table { store_id: 1, table_id: 5 });

        for target in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
            let updated = orders.transition(1, id, target).await.unwrap();
            assert_eq!(updated.status, target);

            let events = drain(&mut staff);
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event_name(), "order-status-changed");

            let customer = drain(&mut table_rx);
            assert_eq!(customer.len(), 1);
            assert_eq!(customer[0].event_name(), "order-update");
        }

        assert_eq!(repo.order(id).unwrap().status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn skipping_states_is_rejected_without_side_effects() {
        let (repo, orders, hub) = setup();
        let detail = orders.create(1, create_input(5, vec![line(100, 1)])).await.unwrap();
        let id = detail.order.id;
        let mut staff = staff_listener(&hub, 1);

        let err: AppError = orders
            .transition(1, id, OrderStatus::Completed)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::OrderInvalidTransition);
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let stored = repo.order(id).unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.updated_at, detail.order.updated_at);
        assert!(drain(&mut staff).is_empty());
    }

    #[tokio::test]
    async fn terminal_orders_do_not_move() {
        let (_repo, orders, _hub) = setup();
        let id = orders
            .create(1, create_input(5, vec![line(100, 1)]))
            .await
            .unwrap()
            .order
            .id;
        orders.transition(1, id, OrderStatus::Cancelled).await.unwrap();

        for target in [OrderStatus::Pending, OrderStatus::Confirmed, OrderStatus::Completed] {
            let err: AppError = orders.transition(1, id, target).await.unwrap_err().into();
            assert_eq!(err.kind(), ErrorKind::InvalidState);
        }
    }

    #[tokio::test]
    async fn foreign_orders_are_not_found() {
        let (_repo, orders, _hub) = setup();
        let id = orders
            .create(2, create_input(7, vec![line(200, 1)]))
            .await
            .unwrap()
            .order
            .id;

        let err: AppError = orders
            .transition(1, id, OrderStatus::Confirmed)
            .await
            .unwrap_err()
            .into();
        assert_eq!(err.code, ErrorCode::OrderNotFound);

        let err: AppError = orders.get(1, id).await.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn concurrent_transitions_have_one_winner() {
        let (repo, orders, hub) = setup();
        let id = orders
            .create(1, create_input(5, vec![line(100, 1)]))
            .await
            .unwrap()
            .order
            .id;
        let mut staff = staff_listener(&hub, 1);

        let (a, b) = tokio::join!(
            orders.transition(1, id, OrderStatus::Preparing),
            orders.transition(1, id, OrderStatus::Preparing),
        );

        let results: Vec<AppResultKind> = [a, b].into_iter().map(kind_of).collect();
        assert_eq!(results.iter().filter(|r| **r == AppResultKind::Ok).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            AppResultKind::Err(ErrorKind::Conflict) | AppResultKind::Err(ErrorKind::InvalidState)
        )));

        assert_eq!(repo.order(id).unwrap().status, OrderStatus::Preparing);
        assert_eq!(drain(&mut staff).len(), 1);
    }

    #[derive(Debug, PartialEq)]
    enum AppResultKind {
        Ok,
        Err(ErrorKind),
    }

    fn kind_of(result: ServiceResult<Order>) -> AppResultKind {
        match result {
            Ok(_) => AppResultKind::Ok,
            Err(e) => AppResultKind::Err(AppError::from(e).kind()),
        }
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let (_repo, orders, _hub) = setup();
        let first = orders.create(1, create_input(5, vec![line(100, 1)])).await.unwrap();
        orders.create(1, create_input(5, vec![line(101, 1)])).await.unwrap();
        orders
            .transition(1, first.order.id, OrderStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(orders.list(1, None).await.unwrap().len(), 2);
        let confirmed = orders.list(1, Some("confirmed")).await.unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, first.order.id);
        assert!(orders.list(2, None).await.unwrap().is_empty());

        let err: AppError = orders.list(1, Some("bogus")).await.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
