//! Domain models shared by the server and its clients
//!
//! Status-like columns are stored as lowercase text. Every enum here parses
//! strictly: an unrecognized value is an error, never a silent default.

use thiserror::Error;

/// A text value that does not name any variant of the target enum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Implements `FromStr`, `TryFrom<String>` and `Display` for a text-backed enum
/// on top of its `from_db` / `as_db` pair.
macro_rules! text_enum {
    ($ty:ty, $kind:literal) => {
        impl std::str::FromStr for $ty {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_db(s).ok_or_else(|| $crate::models::UnknownVariant::new($kind, s))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = $crate::models::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_db())
            }
        }
    };
}

pub(crate) use text_enum;

pub mod call;
pub mod dining_table;
pub mod menu;
pub mod operator;
pub mod order;
pub mod store;

pub use call::{Call, CallCreate, CallStatus, CallStatusUpdate, CallType};
pub use dining_table::{DiningTable, TableStatus, TableStatusUpdate};
pub use menu::MenuItem;
pub use operator::{LoginRequest, LoginResponse, Operator, OperatorInfo, StorePermission, StoreRole};
pub use order::{
    CustomerOrderView, Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderStatus,
    OrderStatusUpdate,
};
pub use store::Store;
