//! Shared utilities for the agora governance client.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat, LoggingError};
pub use time::format_created_at;
