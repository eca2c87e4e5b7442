//! Dining Table Model

use serde::{Deserialize, Serialize};

use super::text_enum;

/// Physical status of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "occupied" => Some(Self::Occupied),
            "reserved" => Some(Self::Reserved),
            "maintenance" => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
            Self::Maintenance => "maintenance",
        }
    }
}

text_enum!(TableStatus, "table status");

/// Dining table entity; belongs to exactly one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub store_id: i64,
    /// Unique within the store
    pub table_number: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: TableStatus,
    pub is_active: bool,
}

/// Update table status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: String,
}
