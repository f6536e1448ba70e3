//! Unix signal bridge.
//!
//! `SIGUSR1` publishes [`AppState::Background`] and `SIGUSR2` publishes
//! [`AppState::Active`], so a terminal host can be backgrounded and
//! foregrounded from another shell with `kill -USR1 <pid>`.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::types::AppState;

/// Installs the signal handlers and spawns the forwarding task.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be registered.
pub fn spawn_signal_bridge(
    tx: broadcast::Sender<AppState>,
) -> std::io::Result<JoinHandle<()>> {
    let mut background = signal(SignalKind::user_defined1())?;
    let mut foreground = signal(SignalKind::user_defined2())?;

    Ok(tokio::spawn(async move {
        loop {
            let state = tokio::select! {
                received = background.recv() => match received {
                    Some(()) => AppState::Background,
                    None => break,
                },
                received = foreground.recv() => match received {
                    Some(()) => AppState::Active,
                    None => break,
                },
            };
            tracing::debug!(app_state = state.as_str(), "Lifecycle signal received");
            let _ = tx.send(state);
        }
    }))
}
