//! Menu Item Model (read-only for the ordering core)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu entry used to price order lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub price: Decimal,
    pub is_available: bool,
}
