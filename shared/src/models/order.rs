//! Order Model
//!
//! ```text
//! pending ──► confirmed ──► preparing ──► ready ──► completed
//!    │  └───────────────────────▲  │
//!    ▼            ▼                ▼
//! cancelled   cancelled        cancelled
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::text_enum;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step from `self`
    ///
    /// `pending → preparing` lets the kitchen accept an order without a
    /// separate confirm step.
    pub fn successors(&self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Preparing, Self::Cancelled],
            Self::Confirmed => &[Self::Preparing, Self::Cancelled],
            Self::Preparing => &[Self::Ready, Self::Cancelled],
            Self::Ready => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// Whether customers at the table are told about this status
    pub fn is_customer_visible(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

text_enum!(OrderStatus, "order status");

/// Order header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub store_id: i64,
    pub table_id: i64,
    /// `YYYYMMDD-NNNN`, unique per store per day
    pub order_number: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: OrderStatus,
    /// Sum of line totals, computed server-side
    pub total_amount: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_id: i64,
    pub menu_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Order with its lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_id: i64,
    pub quantity: i64,
}

/// Create order payload
///
/// `total_amount` is advisory only; the stored total is always recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// Status transition payload (parsed strictly by the lifecycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

/// Order as shown to customers at the table (no internal ids beyond the order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderView {
    pub order_id: i64,
    pub order_number: String,
    pub table_id: i64,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub updated_at: i64,
}

impl From<&Order> for CustomerOrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            table_id: order.table_id,
            status: order.status,
            total_amount: order.total_amount,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_allowed() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Preparing));
    }

    #[test]
    fn skipping_states_is_rejected() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Completed));
        assert!(!Ready.can_transition_to(Cancelled));
        assert!(!Preparing.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
            assert!(status.is_terminal());
            for next in [
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::Completed,
                OrderStatus::Cancelled,
            ] {
                assert!(!status.can_transition_to(next));
            }
        }
    }

    #[test]
    fn self_transition_is_not_a_noop() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Ready));
    }

    #[test]
    fn status_parsing_is_strict() {
        assert_eq!("ready".parse::<OrderStatus>(), Ok(OrderStatus::Ready));
        assert!("READY".parse::<OrderStatus>().is_err());
        assert!("served".parse::<OrderStatus>().is_err());
        assert!(OrderStatus::try_from(String::new()).is_err());
    }

    #[test]
    fn pending_is_hidden_from_customers() {
        assert!(!OrderStatus::Pending.is_customer_visible());
        assert!(OrderStatus::Preparing.is_customer_visible());
        assert!(OrderStatus::Ready.is_customer_visible());
    }
}
