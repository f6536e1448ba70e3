//! Terminal sessions hosting a countdown engine.
//!
//! `run_countdown` plays the role of the host UI: it owns one engine, renders
//! every update, and maps keyboard input and Unix signals onto controls and
//! lifecycle transitions. `simulate` replays a foreground/background
//! round-trip on the manual host.

use std::rc::Rc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::display::Display;
use super::input::KeyCommand;
use super::SimulateArgs;
use crate::config::ConfigError;
use crate::engine::{CountdownCallbacks, CountdownEngine, CountdownEvent, ManualHost};
use crate::runtime::{tokio_host, ChannelLifecycle};
use crate::types::{duration_to_ms, AppState, CountdownConfig, CountdownSnapshot};

/// Runs an interactive countdown until it completes, `q` is entered, or the
/// engine is otherwise finished.
///
/// Must be called from inside a tokio `LocalSet`.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or signal handlers cannot be
/// installed.
pub async fn run_countdown(config: CountdownConfig, json: bool) -> Result<CountdownSnapshot> {
    let lifecycle = Rc::new(ChannelLifecycle::new());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    #[cfg(unix)]
    let signal_bridge = crate::runtime::spawn_signal_bridge(lifecycle.sender())
        .context("シグナルハンドラの登録に失敗しました")?;

    let engine = CountdownEngine::new(
        config,
        tokio_host(lifecycle.clone()),
        CountdownCallbacks::forward_to(event_tx),
    );

    if !json {
        Display::show_controls();
    }
    Display::show_snapshot(&engine.snapshot(), json);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => match event {
                CountdownEvent::Updated { .. } => {
                    Display::show_snapshot(&engine.snapshot(), json);
                }
                CountdownEvent::Completed => {
                    Display::show_completed(json);
                    break;
                }
            },
            line = lines.next_line(), if stdin_open => {
                let line = line.context("標準入力の読み込みに失敗しました")?;
                let Some(line) = line else {
                    stdin_open = false;
                    if !engine.is_playing() {
                        // Nothing can start the countdown any more.
                        tracing::debug!("stdin closed while not running");
                        break;
                    }
                    tracing::debug!("stdin closed, running until completion");
                    continue;
                };
                let Some(command) = KeyCommand::parse(&line) else {
                    continue;
                };
                if command == KeyCommand::Quit {
                    break;
                }
                apply_command(&engine, &lifecycle, command, json);
            }
            else => break,
        }
    }

    let snapshot = engine.snapshot();
    engine.dispose();
    #[cfg(unix)]
    signal_bridge.abort();

    Ok(snapshot)
}

fn apply_command(
    engine: &CountdownEngine,
    lifecycle: &ChannelLifecycle,
    command: KeyCommand,
    json: bool,
) {
    match command {
        KeyCommand::Start => {
            engine.start();
            Display::show_notice("> 開始しました", json);
        }
        KeyCommand::Stop => {
            engine.stop();
            Display::show_notice("|| 停止しました", json);
        }
        KeyCommand::Reset => {
            engine.reset();
            Display::show_notice("[] リセットしました", json);
        }
        KeyCommand::Background | KeyCommand::Foreground => {
            if let Some(state) = command.app_state() {
                lifecycle.publish(state);
            }
        }
        KeyCommand::Quit => {}
    }
}

/// Runs `args.run` in the foreground, `args.background` suspended, then
/// returns to the foreground and reports the reconciled snapshot.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDuration`] if the duration exceeds 24 hours.
pub fn simulate(args: &SimulateArgs) -> Result<CountdownSnapshot, ConfigError> {
    let manual = ManualHost::new();
    let config = CountdownConfig::new(duration_to_ms(args.duration));
    config.validate()?;
    let engine = CountdownEngine::new(config, manual.host(), CountdownCallbacks::new());

    manual.advance(args.run);
    manual.set_app_state(AppState::Background);
    manual.advance_suspended(args.background);
    manual.set_app_state(AppState::Active);

    tracing::debug!(
        run_ms = duration_to_ms(args.run),
        background_ms = duration_to_ms(args.background),
        "Simulation finished"
    );
    Ok(engine.snapshot())
}
