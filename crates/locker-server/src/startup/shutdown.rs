//! Graceful shutdown on Ctrl+C or SIGTERM.

use actix_web::dev::Server;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Broadcast to background tasks once the server is stopping
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve with the name of the first termination signal received.
///
/// If a handler cannot be installed its branch never resolves.
pub async fn termination_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    }
}

/// Drive `server` until it exits or a termination signal arrives, then stop
/// it gracefully and notify `shutdown` subscribers.
pub async fn run_until_shutdown(server: Server, shutdown: ShutdownSignal) -> std::io::Result<()> {
    run_until(server, shutdown, termination_signal()).await
}

/// Like [`run_until_shutdown`], stopping when `stop` resolves.
///
/// Subscribers are notified only after in-flight requests have drained, so
/// the store stays open for them.
pub async fn run_until<F>(server: Server, shutdown: ShutdownSignal, stop: F) -> std::io::Result<()>
where
    F: Future<Output = &'static str>,
{
    let handle = server.handle();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            shutdown.shutdown();
            return result;
        }
        reason = stop => {
            info!("Received {}, initiating graceful shutdown...", reason);
        }
    }

    handle.stop(true).await;
    let result = server.await;
    shutdown.shutdown();
    info!("Shutdown complete");
    result
}
