//! Core data types for the countdown timer.
//!
//! This module defines the data structures used for:
//! - Countdown configuration
//! - Host application lifecycle phases
//! - Status snapshots for display and JSON output

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Length of a single tick in milliseconds.
pub const TICK_MS: u64 = 1_000;

/// Upper bound accepted for user supplied durations (24 hours).
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1_000;

/// Default countdown length (25 minutes).
pub const DEFAULT_DURATION_MS: u64 = 25 * 60 * 1_000;

// ============================================================================
// CountdownConfig
// ============================================================================

/// Configuration for a countdown.
///
/// All values are in milliseconds. The engine never rejects a configuration:
/// a zero duration is treated as an already finished countdown, and a
/// `start_at_ms` larger than the duration is clamped to the duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Total countdown length; also the target restored by reset
    pub duration_ms: u64,
    /// Remaining time to start from (defaults to `duration_ms`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at_ms: Option<u64>,
    /// Whether the countdown starts ticking as soon as it is created
    pub auto_start: bool,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            start_at_ms: None,
            auto_start: true,
        }
    }
}

impl CountdownConfig {
    /// Creates a configuration for the given duration with default options.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    /// Sets the remaining time the countdown starts from.
    pub fn with_start_at_ms(mut self, start_at_ms: u64) -> Self {
        self.start_at_ms = Some(start_at_ms);
        self
    }

    /// Sets whether the countdown starts immediately.
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Remaining time the engine is created with.
    pub fn initial_remaining_ms(&self) -> u64 {
        self.start_at_ms
            .unwrap_or(self.duration_ms)
            .min(self.duration_ms)
    }

    /// Validates user supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if the duration exceeds
    /// 24 hours or the start position lies beyond the duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms > MAX_DURATION_MS {
            return Err(ConfigError::InvalidDuration(
                "カウントダウンは24時間以内で指定してください".to_string(),
            ));
        }
        if let Some(start_at) = self.start_at_ms {
            if start_at > self.duration_ms {
                return Err(ConfigError::InvalidDuration(
                    "開始位置はカウントダウンの長さ以内で指定してください".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// AppState
// ============================================================================

/// Lifecycle phase of the host application, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// The application is in the foreground and receiving events
    #[default]
    Active,
    /// The application is transitioning or partially obscured
    Inactive,
    /// The application is suspended in the background
    Background,
}

impl AppState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Active => "active",
            AppState::Inactive => "inactive",
            AppState::Background => "background",
        }
    }

    /// Returns true only for [`AppState::Active`].
    pub fn is_foreground(&self) -> bool {
        matches!(self, AppState::Active)
    }
}

// ============================================================================
// CountdownStatus
// ============================================================================

/// Coarse status of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownStatus {
    /// Created or reset, never started since
    #[default]
    Idle,
    /// A tick source is active
    Running,
    /// Started at least once and currently halted before reaching zero
    Stopped,
    /// Reached zero
    Completed,
}

impl CountdownStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownStatus::Idle => "idle",
            CountdownStatus::Running => "running",
            CountdownStatus::Stopped => "stopped",
            CountdownStatus::Completed => "completed",
        }
    }
}

// ============================================================================
// CountdownSnapshot
// ============================================================================

/// Point-in-time view of a countdown, used for display and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    /// Current status
    pub status: CountdownStatus,
    /// Remaining milliseconds
    #[serde(rename = "remainingMs")]
    pub remaining_ms: u64,
    /// Configured duration in milliseconds
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    /// Remaining time formatted as `MM:SS`
    pub formatted: String,
}

impl CountdownSnapshot {
    /// Creates a snapshot, deriving the formatted time.
    pub fn new(status: CountdownStatus, remaining_ms: u64, duration_ms: u64) -> Self {
        Self {
            status,
            remaining_ms,
            duration_ms,
            formatted: format_remaining(remaining_ms),
        }
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Formats milliseconds as `MM:SS`.
///
/// Minutes are not wrapped at 60 and partial seconds are dropped.
pub fn format_remaining(remaining_ms: u64) -> String {
    let total_seconds = remaining_ms / 1_000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

// ============================================================================
// Tests
// ============================================================================
