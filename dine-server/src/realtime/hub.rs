//! RealtimeHub - room registry and event delivery
//!
//! Connections join rooms explicitly; a fresh connection receives nothing.
//! Delivery is fire-and-forget: a full or closed connection buffer drops
//! that one message and never blocks or fails the publisher. There is no
//! replay for late joiners.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use shared::models::{Call, CustomerOrderView, DiningTable, Order, OrderDetail, OrderStatus};
use shared::realtime::ServerMessage;
use shared::util::parse_id_str;
use tokio::sync::mpsc;

/// Per-connection outbound buffer (messages)
pub const OUTBOUND_BUFFER: usize = 64;

pub type ConnectionId = u64;

/// A named group of connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKey {
    /// `staff:{store_id}`
    Staff { store_id: i64 },
    /// `table:{store_id}:{table_id}`
    Table { store_id: i64, table_id: i64 },
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff { store_id } => write!(f, "staff:{store_id}"),
            Self::Table { store_id, table_id } => write!(f, "table:{store_id}:{table_id}"),
        }
    }
}

impl FromStr for RoomKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let key = match (parts.next(), parts.next(), parts.next()) {
            (Some("staff"), Some(store), None) => Self::Staff {
                store_id: parse_id_str(store).ok_or(())?,
            },
            (Some("table"), Some(store), Some(table)) => Self::Table {
                store_id: parse_id_str(store).ok_or(())?,
                table_id: parse_id_str(table).ok_or(())?,
            },
            _ => return Err(()),
        };
        match parts.next() {
            None => Ok(key),
            Some(_) => Err(()),
        }
    }
}

struct Connection {
    tx: mpsc::Sender<ServerMessage>,
    rooms: HashSet<RoomKey>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
}

/// Room registry shared by every request handler and WebSocket session
#[derive(Clone, Default)]
pub struct RealtimeHub {
    registry: Arc<RwLock<Registry>>,
    next_id: Arc<AtomicU64>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; it belongs to no room yet
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        self.registry.write().connections.insert(
            id,
            Connection {
                tx,
                rooms: HashSet::new(),
            },
        );
        (id, rx)
    }

    /// Add a connection to a room. `false` for an unknown connection.
    pub fn join(&self, conn: ConnectionId, room: RoomKey) -> bool {
        let mut registry = self.registry.write();
        let Some(connection) = registry.connections.get_mut(&conn) else {
            return false;
        };
        connection.rooms.insert(room);
        registry.rooms.entry(room).or_default().insert(conn);
        true
    }

    /// Remove a connection from one room. `false` if it was not a member.
    pub fn leave(&self, conn: ConnectionId, room: RoomKey) -> bool {
        let mut registry = self.registry.write();
        let was_member = registry
            .connections
            .get_mut(&conn)
            .is_some_and(|c| c.rooms.remove(&room));
        if was_member {
            Self::detach(&mut registry.rooms, conn, room);
        }
        was_member
    }

    /// Forget a connection and remove it from every room
    pub fn disconnect(&self, conn: ConnectionId) {
        let mut registry = self.registry.write();
        if let Some(connection) = registry.connections.remove(&conn) {
            for room in connection.rooms {
                Self::detach(&mut registry.rooms, conn, room);
            }
        }
    }

    fn detach(rooms: &mut HashMap<RoomKey, HashSet<ConnectionId>>, conn: ConnectionId, room: RoomKey) {
        if let Some(members) = rooms.get_mut(&room) {
            members.remove(&conn);
            if members.is_empty() {
                rooms.remove(&room);
            }
        }
    }

    pub fn room_size(&self, room: RoomKey) -> usize {
        self.registry.read().rooms.get(&room).map_or(0, HashSet::len)
    }

    pub fn connection_count(&self) -> usize {
        self.registry.read().connections.len()
    }

    /// Rooms a connection currently belongs to
    pub fn rooms_of(&self, conn: ConnectionId) -> Vec<RoomKey> {
        self.registry
            .read()
            .connections
            .get(&conn)
            .map(|c| c.rooms.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Deliver to every member of a room; returns the number of accepted sends
    fn broadcast(&self, room: RoomKey, msg: ServerMessage) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<ServerMessage>)> = {
            let registry = self.registry.read();
            let Some(members) = registry.rooms.get(&room) else {
                return 0;
            };
            members
                .iter()
                .filter_map(|id| registry.connections.get(id).map(|c| (*id, c.tx.clone())))
                .collect()
        };

        let mut delivered = 0;
        for (conn, tx) in targets {
            match tx.try_send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        conn,
                        room = %room,
                        event = msg.event_name(),
                        "Realtime buffer full, message dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(conn, room = %room, "Realtime connection closed");
                }
            }
        }
        delivered
    }

    // ==================== Lifecycle notifications ====================

    pub fn notify_new_order(&self, detail: &OrderDetail) {
        let room = RoomKey::Staff {
            store_id: detail.order.store_id,
        };
        self.broadcast(room, ServerMessage::NewOrder(Box::new(detail.clone())));
    }

    /// Staff get every transition; the table is told about customer-visible ones
    pub fn notify_order_status_changed(&self, order: &Order, previous_status: OrderStatus) {
        self.broadcast(
            RoomKey::Staff {
                store_id: order.store_id,
            },
            ServerMessage::OrderStatusChanged {
                order: order.clone(),
                previous_status,
            },
        );

        if order.status.is_customer_visible() {
            self.broadcast(
                RoomKey::Table {
                    store_id: order.store_id,
                    table_id: order.table_id,
                },
                ServerMessage::OrderUpdate(CustomerOrderView::from(order)),
            );
        }
    }

    pub fn notify_new_call(&self, call: &Call) {
        let room = RoomKey::Staff {
            store_id: call.store_id,
        };
        self.broadcast(room, ServerMessage::NewCall(call.clone()));
    }

    pub fn notify_call_status_changed(&self, call: &Call) {
        let room = RoomKey::Staff {
            store_id: call.store_id,
        };
        self.broadcast(room, ServerMessage::CallStatusChanged(call.clone()));
    }

    pub fn notify_table_status_changed(&self, table: &DiningTable) {
        let room = RoomKey::Staff {
            store_id: table.store_id,
        };
        self.broadcast(room, ServerMessage::TableStatusChanged(table.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn order(store_id: i64, table_id: i64, status: OrderStatus) -> Order {
        Order {
            id: 1,
            store_id,
            table_id,
            order_number: "20240305-0001".to_string(),
            status,
            total_amount: Decimal::new(13000, 0),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn room_names() {
        assert_eq!(RoomKey::Staff { store_id: 3 }.to_string(), "staff:3");
        assert_eq!(
            RoomKey::Table {
                store_id: 3,
                table_id: 12
            }
            .to_string(),
            "table:3:12"
        );
        assert_eq!("staff:3".parse::<RoomKey>(), Ok(RoomKey::Staff { store_id: 3 }));
        assert_eq!(
            "table:3:12".parse::<RoomKey>(),
            Ok(RoomKey::Table {
                store_id: 3,
                table_id: 12
            })
        );
        assert!("staff:".parse::<RoomKey>().is_err());
        assert!("staff:abc".parse::<RoomKey>().is_err());
        assert!("table:3".parse::<RoomKey>().is_err());
        assert!("table:3:4:5".parse::<RoomKey>().is_err());
        assert!("kitchen:3".parse::<RoomKey>().is_err());
    }

    #[test]
    fn fresh_connection_receives_nothing() {
        let hub = RealtimeHub::new();
        let (_conn, mut rx) = hub.register();

        hub.notify_order_status_changed(&order(1, 5, OrderStatus::Ready), OrderStatus::Preparing);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn table_rooms_are_isolated() {
        let hub = RealtimeHub::new();
        let (a, mut rx_a) = hub.register();
        let (b, mut rx_b) = hub.register();
        hub.join(a, RoomKey::Table { store_id: 1, table_id: 5 });
        hub.join(b, RoomKey::Table { store_id: 1, table_id: 6 });

        hub.notify_order_status_changed(&order(1, 5, OrderStatus::Ready), OrderStatus::Preparing);

        let got_a = drain(&mut rx_a);
        assert_eq!(got_a.len(), 1);
        assert_eq!(got_a[0].event_name(), "order-update");
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn pending_is_not_pushed_to_customers() {
        let hub = RealtimeHub::new();
        let (staff, mut rx_staff) = hub.register();
        let (table, mut rx_table) = hub.register();
        hub.join(staff, RoomKey::Staff { store_id: 1 });
        hub.join(table, RoomKey::Table { store_id: 1, table_id: 5 });

        hub.notify_order_status_changed(&order(1, 5, OrderStatus::Pending), OrderStatus::Pending);

        assert_eq!(drain(&mut rx_staff).len(), 1);
        assert!(drain(&mut rx_table).is_empty());
    }

    #[test]
    fn staff_rooms_are_per_store() {
        let hub = RealtimeHub::new();
        let (one, mut rx_one) = hub.register();
        let (two, mut rx_two) = hub.register();
        hub.join(one, RoomKey::Staff { store_id: 1 });
        hub.join(two, RoomKey::Staff { store_id: 2 });

        hub.notify_order_status_changed(&order(1, 5, OrderStatus::Ready), OrderStatus::Preparing);

        let got = drain(&mut rx_one);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].event_name(), "order-status-changed");
        assert!(drain(&mut rx_two).is_empty());
    }

    #[test]
    fn disconnect_leaves_every_room() {
        let hub = RealtimeHub::new();
        let (conn, _rx) = hub.register();
        let staff = RoomKey::Staff { store_id: 1 };
        let table = RoomKey::Table { store_id: 1, table_id: 5 };
        hub.join(conn, staff);
        hub.join(conn, table);
        assert_eq!(hub.rooms_of(conn).len(), 2);

        hub.disconnect(conn);
        assert_eq!(hub.room_size(staff), 0);
        assert_eq!(hub.room_size(table), 0);
        assert_eq!(hub.connection_count(), 0);
        assert!(!hub.join(conn, staff));
    }

    #[test]
    fn leave_only_that_room() {
        let hub = RealtimeHub::new();
        let (conn, _rx) = hub.register();
        let staff = RoomKey::Staff { store_id: 1 };
        let table = RoomKey::Table { store_id: 1, table_id: 5 };
        hub.join(conn, staff);
        hub.join(conn, table);

        assert!(hub.leave(conn, staff));
        assert!(!hub.leave(conn, staff));
        assert_eq!(hub.rooms_of(conn), vec![table]);
    }

    #[test]
    fn full_buffer_drops_without_blocking() {
        let hub = RealtimeHub::new();
        let (conn, mut rx) = hub.register();
        let staff = RoomKey::Staff { store_id: 1 };
        hub.join(conn, staff);

        let table = DiningTable {
            id: 5,
            store_id: 1,
            table_number: "A1".to_string(),
            status: shared::models::TableStatus::Occupied,
            is_active: true,
        };
        for _ in 0..OUTBOUND_BUFFER + 10 {
            hub.notify_table_status_changed(&table);
        }

        assert_eq!(drain(&mut rx).len(), OUTBOUND_BUFFER);
    }

    #[test]
    fn closed_receiver_is_skipped() {
        let hub = RealtimeHub::new();
        let (closed, rx_closed) = hub.register();
        let (open, mut rx_open) = hub.register();
        let staff = RoomKey::Staff { store_id: 1 };
        hub.join(closed, staff);
        hub.join(open, staff);
        drop(rx_closed);

        let delivered = hub.broadcast(staff, ServerMessage::Pong { timestamp: 1 });
        assert_eq!(delivered, 1);
        assert_eq!(drain(&mut rx_open).len(), 1);
    }
}
