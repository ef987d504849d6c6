//! Application startup: logging, store, HTTP server and shutdown.

mod http;
mod logging;
mod shutdown;
mod store;

pub use http::main_server;
pub use logging::{LogRotation, LoggingConfig, LoggingGuard, init_logging};
pub use shutdown::{ShutdownSignal, run_until_shutdown, termination_signal};
pub use store::{build_store, spawn_pool_maintenance};
