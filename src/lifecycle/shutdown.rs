//! Shutdown coordination for the HTTP adapter.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The server subscribes once; tests or signal handlers call `trigger`.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or when `shutdown` fires, whichever comes first.
pub async fn wait_for_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            // Without a signal handler, only an explicit trigger stops the server.
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
