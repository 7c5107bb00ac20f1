//! tunnelog: records OpenVPN client sessions over time.
//!
//! Each invocation snapshots the server's status log and reconciles it
//! against a durable CSV session log: new connections are appended as
//! active sessions, vanished connections are closed with a computed
//! duration, everything else is left untouched. Meant to be run
//! periodically (e.g. from cron); one invocation is one batch run.

pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod reconciliation;
pub mod session_store;
pub mod status_feed;
