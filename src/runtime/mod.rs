//! Tokio-backed host for running a countdown in a real process.
//!
//! - `local`: scheduler, clock and channel-fed lifecycle notifier
//! - `signal`: Unix signal bridge publishing lifecycle transitions
//!
//! Everything here spawns onto the current `LocalSet`; callers must drive
//! the engine from inside `LocalSet::run_until` (or `LocalSet::block_on`).

pub mod local;
#[cfg(unix)]
pub mod signal;

pub use local::{ChannelLifecycle, TokioClock, TokioScheduler};
#[cfg(unix)]
pub use signal::spawn_signal_bridge;

use std::rc::Rc;

use crate::engine::{Clock, Host, WallClock};

/// Builds a host using the tokio scheduler, the given lifecycle notifier and
/// the wall clock.
pub fn tokio_host(lifecycle: Rc<ChannelLifecycle>) -> Host {
    tokio_host_with_clock(lifecycle, Rc::new(WallClock))
}

/// Builds a host using the tokio scheduler with a custom clock.
pub fn tokio_host_with_clock(lifecycle: Rc<ChannelLifecycle>, clock: Rc<dyn Clock>) -> Host {
    Host::new(Rc::new(TokioScheduler), lifecycle, clock)
}
