//! Countdown engine and the host capabilities it depends on.
//!
//! - `countdown`: the background-aware countdown engine
//! - `host`: scheduler, lifecycle and clock traits plus scoped registrations
//! - `manual`: deterministic virtual-time host for tests and simulation

pub mod countdown;
pub mod host;
pub mod manual;

pub use countdown::{
    CountdownCallbacks, CountdownEngine, CountdownEvent, CountdownHandle, TICK_INTERVAL,
};
pub use host::{Clock, Host, LifecycleNotifier, Registration, Scheduler, WallClock};
pub use manual::{ManualClock, ManualHost, ManualLifecycle, ManualScheduler};
