//! Command definitions for the countdown CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::types::{duration_to_ms, CountdownConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// Countdown CLI - a background-aware countdown timer
#[derive(Parser, Debug)]
#[command(
    name = "countdown",
    version,
    about = "バックグラウンド対応カウントダウンタイマー",
    long_about = "ターミナル上で動作するカウントダウンタイマー。\n\
                  バックグラウンドにいた時間も残り時間に反映されます。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run an interactive countdown in the terminal
    Run(RunArgs),

    /// Simulate a foreground/background round-trip on a virtual clock
    Simulate(SimulateArgs),

    /// Print the effective configuration as JSON
    Config,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Countdown length (e.g. "25m", "90s"); overrides the config file
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Remaining time to start from (defaults to the duration)
    #[arg(short, long, value_parser = parse_duration)]
    pub start_at: Option<Duration>,

    /// Do not start ticking until `s` is pressed
    #[arg(short, long)]
    pub paused: bool,

    /// Print JSON snapshots instead of formatted text
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Applies command-line overrides on top of `base`.
    pub fn apply(&self, base: CountdownConfig) -> CountdownConfig {
        let mut config = base;
        if let Some(duration) = self.duration {
            config.duration_ms = duration_to_ms(duration);
        }
        if let Some(start_at) = self.start_at {
            config.start_at_ms = Some(duration_to_ms(start_at));
        }
        if self.paused {
            config.auto_start = false;
        }
        config
    }
}

// ============================================================================
// Simulate Command Arguments
// ============================================================================

/// Arguments for the simulate command
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Countdown length
    #[arg(short, long, default_value = "120s", value_parser = parse_duration)]
    pub duration: Duration,

    /// Time spent in the foreground before backgrounding
    #[arg(short, long, default_value = "10s", value_parser = parse_duration)]
    pub run: Duration,

    /// Time spent suspended in the background
    #[arg(short, long, default_value = "30s", value_parser = parse_duration)]
    pub background: Duration,

    /// Print the resulting snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(120),
            run: Duration::from_secs(10),
            background: Duration::from_secs(30),
            json: false,
        }
    }
}

// ============================================================================
// Parsing Helpers
// ============================================================================

/// Parses a human readable duration such as "25m" or "1m 30s".
fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s).map_err(|e| format!("時間の形式が不正です ({}): {}", s, e))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["countdown"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.config.is_none());
        }

        #[test]
        fn test_parse_global_flags() {
            let cli = Cli::parse_from(["countdown", "config", "-v", "--config", "/tmp/c.json"]);
            assert!(cli.verbose);
            assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
            assert!(matches!(cli.command, Some(Commands::Config)));
        }

        #[test]
        fn test_parse_completions_bash() {
            let cli = Cli::parse_from(["countdown", "completions", "bash"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Bash);
                }
                _ => panic!("Expected Completions command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Run Command Tests
    // ------------------------------------------------------------------------

    mod run_args_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["countdown", "run"]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert!(args.duration.is_none());
                    assert!(args.start_at.is_none());
                    assert!(!args.paused);
                    assert!(!args.json);
                }
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_all_options() {
            let cli = Cli::parse_from([
                "countdown",
                "run",
                "--duration",
                "2m",
                "-s",
                "1m 30s",
                "--paused",
                "--json",
            ]);
            match cli.command {
                Some(Commands::Run(args)) => {
                    assert_eq!(args.duration, Some(Duration::from_secs(120)));
                    assert_eq!(args.start_at, Some(Duration::from_secs(90)));
                    assert!(args.paused);
                    assert!(args.json);
                }
                _ => panic!("Expected Run command"),
            }
        }

        #[test]
        fn test_parse_run_invalid_duration() {
            let result = Cli::try_parse_from(["countdown", "run", "--duration", "soon"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_apply_overrides() {
            let args = RunArgs {
                duration: Some(Duration::from_secs(60)),
                start_at: Some(Duration::from_secs(20)),
                paused: true,
                json: false,
            };
            let config = args.apply(CountdownConfig::default());

            assert_eq!(config.duration_ms, 60_000);
            assert_eq!(config.start_at_ms, Some(20_000));
            assert!(!config.auto_start);
        }

        #[test]
        fn test_apply_keeps_base_values() {
            let base = CountdownConfig::new(45_000).with_auto_start(false);
            let config = RunArgs::default().apply(base.clone());
            assert_eq!(config, base);
        }
    }

    // ------------------------------------------------------------------------
    // Simulate Command Tests
    // ------------------------------------------------------------------------

    mod simulate_args_tests {
        use super::*;

        #[test]
        fn test_parse_simulate_defaults() {
            let cli = Cli::parse_from(["countdown", "simulate"]);
            match cli.command {
                Some(Commands::Simulate(args)) => {
                    assert_eq!(args.duration, Duration::from_secs(120));
                    assert_eq!(args.run, Duration::from_secs(10));
                    assert_eq!(args.background, Duration::from_secs(30));
                }
                _ => panic!("Expected Simulate command"),
            }
        }

        #[test]
        fn test_parse_simulate_short_flags() {
            let cli = Cli::parse_from(["countdown", "simulate", "-d", "5m", "-r", "1m", "-b", "2m"]);
            match cli.command {
                Some(Commands::Simulate(args)) => {
                    assert_eq!(args.duration, Duration::from_secs(300));
                    assert_eq!(args.run, Duration::from_secs(60));
                    assert_eq!(args.background, Duration::from_secs(120));
                }
                _ => panic!("Expected Simulate command"),
            }
        }
    }
}
