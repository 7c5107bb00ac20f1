//! Session reconciliation.
//!
//! The engine merges one status-feed snapshot into the recorded session
//! history: continuing sessions stay untouched, new ones are appended as
//! active, vanished ones are closed with a computed duration. The clock
//! used for closure timestamps is injected.

pub mod clock;
pub mod engine;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{reconcile, ReconcileSummary};
