//! OS signal forwarding
//!
//! Interrupt and terminate request a shutdown. On Unix, SIGUSR1 requests a
//! deeper session.

use super::SupervisorSignal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Installs the signal handlers and forwards signals to `tx`
///
/// Handlers are installed before this returns. The forwarding task ends when
/// the receiving side of `tx` is dropped.
#[cfg(unix)]
pub fn forward_os_signals(tx: mpsc::Sender<SupervisorSignal>) -> crate::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut user = signal(SignalKind::user_defined1())?;

    Ok(tokio::spawn(async move {
        loop {
            let forwarded = tokio::select! {
                _ = interrupt.recv() => {
                    tracing::info!("SIGINT was received");
                    SupervisorSignal::Shutdown
                }
                _ = terminate.recv() => {
                    tracing::info!("SIGTERM was received");
                    SupervisorSignal::Shutdown
                }
                _ = user.recv() => {
                    tracing::info!("SIGUSR1 was received");
                    SupervisorSignal::Reconfigure
                }
            };

            if tx.send(forwarded).await.is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn forward_os_signals(tx: mpsc::Sender<SupervisorSignal>) -> crate::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C was received");
            if tx.send(SupervisorSignal::Shutdown).await.is_err() {
                break;
            }
        }
    }))
}
