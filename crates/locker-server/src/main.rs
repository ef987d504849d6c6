//! Main entry point for the Locker slash-command server.

use std::sync::Arc;

use anyhow::Context;
use locker_core::LockEngine;
use locker_server::{
    model::{AppState, CommandKind, Configuration},
    startup::{self, ShutdownSignal},
};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::new().context("failed to load configuration")?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;
    locker_server::metrics::init_metrics();

    for kind in CommandKind::ALL {
        if !configuration.command(kind).is_enabled() {
            warn!(command = %kind, "No token configured; every {} request will be rejected", kind);
        }
    }

    let shutdown = ShutdownSignal::new();
    let store = startup::build_store(&configuration, &shutdown)
        .await
        .context("failed to open lock store")?;
    let engine = LockEngine::new(store, configuration.engine_config());

    let address = configuration.server_address();
    let port = configuration.server_port();
    let app_state = Arc::new(AppState::new(configuration, engine));

    let server = startup::main_server(app_state, address.clone(), port)
        .with_context(|| format!("failed to bind {}:{}", address, port))?;
    info!("Locker server listening on {}:{}", address, port);

    startup::run_until_shutdown(server, shutdown).await?;
    Ok(())
}
