//! Logging setup and run reporting.

mod logging;

pub use logging::{log_metrics, setup_logging};
