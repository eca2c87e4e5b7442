//! Store Model

use serde::{Deserialize, Serialize};

/// Store entity (one restaurant, the unit of tenant isolation)
///
/// Deactivation is soft: an inactive store stays in the database but is
/// invisible to tenant resolution and customer-facing reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub is_active: bool,
}
