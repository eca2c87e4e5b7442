//! Seeded in-memory state shared by handler and WebSocket tests
//!
//! ```text
//! store 1 "Main"   (active)   tables 5 "A1", 6 "A2", 8 "OLD" (inactive)
//!                             menu 100 Bibimbap 5000, 101 Tea 1500, 102 Soup 900 (sold out)
//! store 2 "Second" (active)   table 7 "B1", menu 200
//! store 3 "Closed" (inactive) table 9 "C1"
//!
//! operator 10 owner   → owner of store 1
//! operator 11 staff   → staff of store 1
//! operator 12 rival   → owner of store 2
//! operator 13 admin   → super-admin, no permission rows
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::StoreRole;

use crate::auth::{JwtConfig, JwtService, password};
use crate::core::AppState;
use crate::db::memory::MemoryRepository;
use crate::realtime::RealtimeHub;

pub const OWNER: i64 = 10;
pub const STAFF: i64 = 11;
pub const RIVAL: i64 = 12;
pub const ADMIN: i64 = 13;

pub const PASSWORD: &str = "correct horse battery";

pub fn jwt_service() -> JwtService {
    JwtService::with_config(JwtConfig {
        secret: "fixture-secret-that-is-long-enough-for-hs256".to_string(),
        expiration_minutes: 60,
        issuer: "dine-server".to_string(),
        audience: "dine-clients".to_string(),
    })
}

pub struct Fixture {
    pub repo: Arc<MemoryRepository>,
    pub state: AppState,
}

impl Fixture {
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let hash = password::hash_password(PASSWORD).unwrap();

        repo.add_store(1, "Main", true);
        repo.add_store(2, "Second", true);
        repo.add_store(3, "Closed", false);

        repo.add_operator(OWNER, "owner", &hash, false);
        repo.add_operator(STAFF, "staff", &hash, false);
        repo.add_operator(RIVAL, "rival", &hash, false);
        repo.add_operator(ADMIN, "admin", &hash, true);
        repo.grant(OWNER, 1, StoreRole::Owner);
        repo.grant(STAFF, 1, StoreRole::Staff);
        repo.grant(RIVAL, 2, StoreRole::Owner);

        repo.add_table(5, 1, "A1", true);
        repo.add_table(6, 1, "A2", true);
        repo.add_table(8, 1, "OLD", false);
        repo.add_table(7, 2, "B1", true);
        repo.add_table(9, 3, "C1", true);

        repo.add_menu_item(100, 1, "Bibimbap", Decimal::from(5000), true);
        repo.add_menu_item(101, 1, "Tea", Decimal::from(1500), true);
        repo.add_menu_item(102, 1, "Soup", Decimal::from(900), false);
        repo.add_menu_item(200, 2, "Foreign dish", Decimal::from(3000), true);

        let state = AppState::new(repo.clone(), jwt_service(), RealtimeHub::new());
        Self { repo, state }
    }

    /// Session token for a seeded operator
    pub fn token(&self, operator_id: i64) -> String {
        let operator = self.repo.operator(operator_id).unwrap();
        self.state.jwt.issue(&operator).unwrap()
    }
}
