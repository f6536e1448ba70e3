//! Tokio implementations of the host capabilities.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::spawn_local;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::engine::{Clock, LifecycleNotifier, Registration, Scheduler};
use crate::types::AppState;

/// Capacity of the lifecycle broadcast channel.
const LIFECYCLE_CHANNEL_CAPACITY: usize = 16;

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler running each periodic callback in a local task.
///
/// Missed ticks are skipped rather than replayed in a burst. Background time
/// is accounted for by reconciliation instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, period: Duration, mut callback: Box<dyn FnMut()>) -> Registration {
        let task = spawn_local(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                callback();
            }
        });

        Registration::new(move || task.abort())
    }
}

// ============================================================================
// TokioClock
// ============================================================================

/// Clock based on `tokio::time::Instant`, virtualised when tokio time is paused.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    /// Creates a clock reading zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }
}

// ============================================================================
// ChannelLifecycle
// ============================================================================

/// Lifecycle notifier fed through a broadcast channel.
///
/// Anything holding a [`ChannelLifecycle::sender`] (keyboard input, signal
/// handlers) can publish transitions.
#[derive(Debug, Clone)]
pub struct ChannelLifecycle {
    tx: broadcast::Sender<AppState>,
}

impl Default for ChannelLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelLifecycle {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(LIFECYCLE_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Returns a sender for publishing transitions from other tasks.
    pub fn sender(&self) -> broadcast::Sender<AppState> {
        self.tx.clone()
    }

    /// Publishes a transition. Returns the number of subscribers reached.
    pub fn publish(&self, state: AppState) -> usize {
        self.tx.send(state).unwrap_or(0)
    }
}

impl LifecycleNotifier for ChannelLifecycle {
    fn subscribe(&self, mut callback: Box<dyn FnMut(AppState)>) -> Registration {
        let mut rx = self.tx.subscribe();
        let task = spawn_local(async move {
            loop {
                match rx.recv().await {
                    Ok(state) => callback(state),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Lifecycle subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Registration::new(move || task.abort())
    }
}
