//! Realtime notification fan-out
//!
//! ```text
//! lifecycle (after commit)
//!       │ notify_*
//!       ▼
//! RealtimeHub ── rooms ──► staff:{store}          (all staff screens of a store)
//!                    └───► table:{store}:{table}  (customer devices at one table)
//!       │
//!       ▼ bounded mpsc per connection
//! WebSocket session (ws.rs)
//! ```

pub mod hub;
pub mod ws;

pub use hub::{ConnectionId, OUTBOUND_BUFFER, RealtimeHub, RoomKey};
