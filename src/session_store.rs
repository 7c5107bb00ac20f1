//! Durable session log.
//!
//! Components:
//! - `types`: the persisted `SessionRecord` and its identity rules.
//! - `csv_store`: CSV-backed load/save with atomic replace, plus the
//!   between-run administration operations (delete one row, full reset).

pub mod csv_store;
pub mod types;

pub use csv_store::CsvStore;
pub use types::{SessionRecord, SessionStatus};
