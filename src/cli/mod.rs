//! CLI module for the countdown timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `input`: Keyboard commands read while a countdown runs
//! - `session`: The terminal host driving a countdown engine

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

pub use commands::{Cli, Commands, RunArgs, SimulateArgs};
pub use display::Display;
pub use input::KeyCommand;
pub use session::{run_countdown, simulate};
