//! State changes of orders, calls and tables
//!
//! Each mutation commits first and notifies the [`RealtimeHub`] afterwards,
//! so a failed write never produces an event.
//!
//! [`RealtimeHub`]: crate::realtime::RealtimeHub

pub mod call;
pub mod order;
pub mod table;

pub use call::CallLifecycle;
pub use order::OrderLifecycle;
pub use table::TableLifecycle;
