//! Snapshot reader for the OpenVPN status log.
//!
//! Turns the raw status-log text into the set of currently-connected
//! clients. Pure parsing; the reconciliation engine decides what the
//! snapshot means for the session history.

pub mod parser;
pub mod types;

pub use parser::{parse_status_feed, read_snapshot};
pub use types::ConnectionRecord;
