//! Display utilities for the countdown CLI.
//!
//! This module provides formatted output for:
//! - Remaining time updates
//! - Control notices (start/stop/reset, lifecycle changes)
//! - Snapshots and configuration
//! - Error messages

use crate::types::{format_remaining, CountdownConfig, CountdownSnapshot, CountdownStatus};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the keyboard controls.
    pub fn show_controls() {
        eprintln!("操作: s=開始 p=停止 r=リセット b=バックグラウンド f=フォアグラウンド q=終了");
    }

    /// Shows a snapshot, as text or as a JSON line.
    pub fn show_snapshot(snapshot: &CountdownSnapshot, json: bool) {
        if json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => Self::show_error(&e.to_string()),
            }
        } else {
            println!("{}", Self::render_snapshot(snapshot));
        }
    }

    /// Shows a notice about a control action. Suppressed in JSON mode.
    pub fn show_notice(message: &str, json: bool) {
        if !json {
            println!("{}", message);
        }
    }

    /// Shows the completion message.
    pub fn show_completed(json: bool) {
        Self::show_notice("* カウントダウンが終了しました", json);
    }

    /// Shows the effective configuration.
    pub fn show_config(config: &CountdownConfig) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(config)?);
        Ok(())
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Renders a snapshot as a single line of text.
    pub fn render_snapshot(snapshot: &CountdownSnapshot) -> String {
        format!(
            "残り時間: {} / {} ({})",
            snapshot.formatted,
            format_remaining(snapshot.duration_ms),
            Self::status_label(snapshot.status)
        )
    }

    /// Japanese label for a status.
    pub fn status_label(status: CountdownStatus) -> &'static str {
        match status {
            CountdownStatus::Idle => "待機中",
            CountdownStatus::Running => "実行中",
            CountdownStatus::Stopped => "停止中",
            CountdownStatus::Completed => "終了",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
