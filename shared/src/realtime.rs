//! Realtime WebSocket protocol
//!
//! Client → Server: [`ClientMessage`] (join / leave / ping)
//! Server → Client: [`ServerMessage`] (acks + lifecycle events)
//!
//! A connection belongs to no room until it explicitly joins one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorCode;
use crate::models::{Call, CustomerOrderView, DiningTable, Order, OrderDetail, OrderStatus};

/// Client → Server messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join `staff:{store_id}` (requires a session with access to the store)
    JoinStaff {
        #[serde(default)]
        store_id: Option<Value>,
    },
    /// Join `table:{store_id}:{table_id}` (customer view of one table)
    JoinTable {
        #[serde(default)]
        store_id: Option<Value>,
        #[serde(default)]
        table_id: Option<Value>,
    },
    /// Leave a previously joined room by name
    Leave { room: String },
    /// Liveness check, answered with `pong`
    Ping,
}

/// Server → Client messages
///
/// Serialized as `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    Joined {
        room: String,
    },
    Left {
        room: String,
    },
    Pong {
        timestamp: i64,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
    /// Staff: an order was placed
    NewOrder(Box<OrderDetail>),
    /// Staff: an order moved to a new status
    OrderStatusChanged {
        order: Order,
        previous_status: OrderStatus,
    },
    /// Customer: the order at this table changed
    OrderUpdate(CustomerOrderView),
    /// Staff: a customer called
    NewCall(Call),
    /// Staff: a call moved to a new status
    CallStatusChanged(Call),
    /// Staff: a table changed status
    TableStatusChanged(DiningTable),
}

impl ServerMessage {
    /// Wire name of the event
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::Left { .. } => "left",
            Self::Pong { .. } => "pong",
            Self::Error { .. } => "error",
            Self::NewOrder(_) => "new-order",
            Self::OrderStatusChanged { .. } => "order-status-changed",
            Self::OrderUpdate(_) => "order-update",
            Self::NewCall(_) => "new-call",
            Self::CallStatusChanged(_) => "call-status-changed",
            Self::TableStatusChanged(_) => "table-status-changed",
        }
    }
}
