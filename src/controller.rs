//! Orchestration of a single batch run and the CLI-facing operations.

pub mod controller_handler;

pub use controller_handler::Controller;
