//! Countdown Timer Library
//!
//! This library provides a background-aware countdown timer.
//! It includes:
//! - Countdown engine with start/stop/reset and update/completion callbacks
//! - Host capability traits (scheduler, lifecycle notifier, clock)
//! - Deterministic manual host driven by a virtual clock
//! - Tokio host with a channel-fed lifecycle notifier and Unix signal bridge
//! - Configuration loading and validation
//! - CLI command parsing and display utilities

pub mod cli;
pub mod config;
pub mod engine;
pub mod runtime;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    duration_to_ms, format_remaining, AppState, CountdownConfig, CountdownSnapshot, CountdownStatus,
};

// Re-export engine types
pub use engine::{
    Clock, CountdownCallbacks, CountdownEngine, CountdownEvent, CountdownHandle, Host,
    LifecycleNotifier, ManualHost, Registration, Scheduler, WallClock,
};

// Re-export config types
pub use config::{load_config, ConfigError};

// Re-export runtime types
pub use runtime::{tokio_host, ChannelLifecycle, TokioClock, TokioScheduler};
