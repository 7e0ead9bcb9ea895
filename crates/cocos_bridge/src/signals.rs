//! Interrupt handling.
//!
//! Resolves on SIGINT or SIGTERM (Unix) or Ctrl+C (Windows); the caller races
//! it against the in-flight request.

use tokio::signal;
use tracing::warn;

pub async fn wait_for_interrupt() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    warn!("📡 Interrupted - abandoning the request");
    Ok(())
}
