//! Shared primitives: errors, configuration, per-environment stores,
//! logging and output helpers.

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod store;
pub mod time;
