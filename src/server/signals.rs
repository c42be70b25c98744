// Signal handling for graceful server shutdown

use crate::error::{HrqaError, Result};
use tokio::signal::unix::{signal, Signal as TokioSignal, SignalKind};

/// Listens for the termination signals that stop the server
pub struct SignalHandler {
    sigterm: TokioSignal,
    sigint: TokioSignal,
}

impl SignalHandler {
    /// Install handlers for SIGTERM and SIGINT
    pub fn new() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate()).map_err(|e| HrqaError::Io {
            source: e,
            context: "Failed to setup SIGTERM handler".to_string(),
        })?;
        let sigint = signal(SignalKind::interrupt()).map_err(|e| HrqaError::Io {
            source: e,
            context: "Failed to setup SIGINT handler".to_string(),
        })?;

        Ok(Self { sigterm, sigint })
    }

    /// Wait for either signal and return its name
    pub async fn wait(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::info!("Received SIGTERM");
                "terminate"
            }
            _ = self.sigint.recv() => {
                tracing::info!("Received SIGINT");
                "interrupt"
            }
        }
    }
}

/// Resolves once the process is asked to stop
pub async fn shutdown_signal() {
    match SignalHandler::new() {
        Ok(mut handler) => {
            let sig = handler.wait().await;
            tracing::info!("Shutting down after {}", sig);
        }
        Err(e) => {
            tracing::warn!("{}; falling back to Ctrl-C only", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}
