//! Operator (staff/admin account) and per-store permission models

use serde::{Deserialize, Serialize};

use super::text_enum;

/// Operator account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Operator {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    /// Bypasses every store-scoped permission check
    pub is_super_admin: bool,
    pub is_active: bool,
}

/// Public view of an operator (no credential hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub id: i64,
    pub username: String,
    pub is_super_admin: bool,
}

impl From<&Operator> for OperatorInfo {
    fn from(op: &Operator) -> Self {
        Self {
            id: op.id,
            username: op.username.clone(),
            is_super_admin: op.is_super_admin,
        }
    }
}

/// Role of an operator inside one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    Owner,
    Manager,
    Staff,
}

impl StoreRole {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "manager" => Some(Self::Manager),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }
}

text_enum!(StoreRole, "store role");

/// Grants one operator a role within one store; unique per (operator, store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StorePermission {
    pub operator_id: i64,
    pub store_id: i64,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub role: StoreRole,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login / refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until `token` expires
    pub expires_in: i64,
    pub operator: OperatorInfo,
}
