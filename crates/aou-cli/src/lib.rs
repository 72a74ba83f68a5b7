//! Library components of the `aou-refresh` CLI.

pub mod config;
pub mod logging;
pub mod notify;
pub mod refresh;
