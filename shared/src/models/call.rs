//! Customer service call ("call waiter") model
//!
//! ```text
//! pending ──► responded ──► completed
//!    │
//!    ▼
//! cancelled
//! ```

use serde::{Deserialize, Serialize};

use super::text_enum;

/// Why the customer called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Service,
    #[serde(alias = "payment")]
    Bill,
    Help,
    Custom,
}

impl CallType {
    /// Parse from text; `payment` is accepted as an alias of `bill`
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "service" => Some(Self::Service),
            "bill" | "payment" => Some(Self::Bill),
            "help" => Some(Self::Help),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Bill => "bill",
            Self::Help => "help",
            Self::Custom => "custom",
        }
    }
}

text_enum!(CallType, "call type");

/// Call status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Pending,
    Responded,
    Completed,
    Cancelled,
}

impl CallStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "responded" => Some(Self::Responded),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Responded => "responded",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn successors(&self) -> &'static [CallStatus] {
        match self {
            Self::Pending => &[Self::Responded, Self::Cancelled],
            Self::Responded => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: CallStatus) -> bool {
        self.successors().contains(&next)
    }
}

text_enum!(CallStatus, "call status");

/// Call entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Call {
    pub id: i64,
    pub store_id: i64,
    pub table_id: i64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub call_type: CallType,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: CallStatus,
    pub message: Option<String>,
    /// Operator who responded
    pub responded_by: Option<i64>,
    pub responded_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

/// Create call payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallCreate {
    pub table_id: i64,
    pub call_type: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Status transition payload (parsed strictly by the lifecycle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallStatusUpdate {
    pub status: String,
}
