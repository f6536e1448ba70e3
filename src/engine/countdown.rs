//! Countdown engine.
//!
//! This module provides the core countdown functionality:
//! - One-second ticks driven by the host [`Scheduler`](super::Scheduler)
//! - Start/stop/reset controls
//! - Reconciliation of time spent outside the foreground
//! - Update and completion notifications
//!
//! # Reconciliation policy
//!
//! When the host leaves the foreground while the countdown is running, the
//! clock reading is recorded. On returning to the foreground, the elapsed
//! time is subtracted from the remaining time *as it was* (never recomputed
//! from the configured duration), floored at zero. Ticks that still fired
//! while backgrounded are deducted from the correction so they are not
//! counted twice.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::host::{Host, Registration};
use crate::types::{
    duration_to_ms, format_remaining, AppState, CountdownConfig, CountdownSnapshot,
    CountdownStatus, TICK_MS,
};

/// Interval between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(TICK_MS);

// ============================================================================
// CountdownEvent
// ============================================================================

/// Notifications emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Remaining time changed (tick, reconciliation or reset)
    Updated {
        /// Remaining milliseconds
        remaining_ms: u64,
    },
    /// Remaining time reached zero
    Completed,
}

// ============================================================================
// CountdownCallbacks
// ============================================================================

/// Update and completion callbacks supplied by the owner of an engine.
#[derive(Default)]
pub struct CountdownCallbacks {
    on_update: Option<Box<dyn FnMut(u64)>>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl CountdownCallbacks {
    /// Creates an empty set of callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback receiving the remaining milliseconds.
    pub fn on_update(mut self, callback: impl FnMut(u64) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// Sets the callback invoked once when the countdown reaches zero.
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Forwards every notification into a channel.
    ///
    /// Send failures (receiver dropped) are ignored.
    pub fn forward_to(event_tx: mpsc::UnboundedSender<CountdownEvent>) -> Self {
        let complete_tx = event_tx.clone();
        Self::new()
            .on_update(move |remaining_ms| {
                let _ = event_tx.send(CountdownEvent::Updated { remaining_ms });
            })
            .on_complete(move || {
                let _ = complete_tx.send(CountdownEvent::Completed);
            })
    }

    fn dispatch(&mut self, event: CountdownEvent) {
        match event {
            CountdownEvent::Updated { remaining_ms } => {
                if let Some(on_update) = self.on_update.as_mut() {
                    on_update(remaining_ms);
                }
            }
            CountdownEvent::Completed => {
                if let Some(on_complete) = self.on_complete.as_mut() {
                    on_complete();
                }
            }
        }
    }
}

// ============================================================================
// Engine internals
// ============================================================================

struct State {
    config: CountdownConfig,
    remaining_ms: u64,
    ticker: Option<Registration>,
    lifecycle: Option<Registration>,
    app_state: AppState,
    background_since: Option<Duration>,
    background_ticked_ms: u64,
    started: bool,
    completed: bool,
    disposed: bool,
}

impl State {
    fn clear_background(&mut self) {
        self.background_since = None;
        self.background_ticked_ms = 0;
    }

    /// Marks completion if zero was just reached; returns the ticker to release.
    fn complete_if_finished(&mut self, events: &mut Vec<CountdownEvent>) -> Option<Registration> {
        if self.remaining_ms > 0 || self.completed {
            return None;
        }
        self.completed = true;
        self.clear_background();
        events.push(CountdownEvent::Completed);
        info!("Countdown completed");
        self.ticker.take()
    }
}

struct Shared {
    host: Host,
    state: RefCell<State>,
    callbacks: RefCell<CountdownCallbacks>,
    pending: RefCell<VecDeque<CountdownEvent>>,
    dispatching: Cell<bool>,
}

impl Shared {
    fn start(self: &Rc<Self>) {
        let mut events = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            if state.disposed || state.ticker.is_some() {
                return;
            }
            state.started = true;
            if state.remaining_ms == 0 {
                // Zero-length countdowns complete as soon as they are started.
                let _ = state.complete_if_finished(&mut events);
            }
        }
        if !events.is_empty() {
            self.emit(events);
            return;
        }
        if self.state.borrow().completed {
            return;
        }

        let weak: Weak<Shared> = Rc::downgrade(self);
        let ticker = self.host.scheduler.schedule(
            TICK_INTERVAL,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.tick();
                }
            }),
        );

        let now = self.host.clock.now();
        let mut state = self.state.borrow_mut();
        if !state.app_state.is_foreground() {
            state.background_since = Some(now);
        }
        state.ticker = Some(ticker);
        info!(remaining_ms = state.remaining_ms, "Countdown started");
    }

    fn stop(&self) {
        let ticker = {
            let mut state = self.state.borrow_mut();
            state.clear_background();
            state.ticker.take()
        };
        if let Some(ticker) = ticker {
            ticker.cancel();
            info!(
                remaining_ms = self.state.borrow().remaining_ms,
                "Countdown stopped"
            );
        }
    }

    fn reset(&self) {
        let (ticker, remaining_ms) = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.remaining_ms = state.config.duration_ms;
            state.started = false;
            state.completed = false;
            state.clear_background();
            (state.ticker.take(), state.remaining_ms)
        };
        drop(ticker);
        info!(remaining_ms, "Countdown reset");
        self.emit(vec![CountdownEvent::Updated { remaining_ms }]);
    }

    fn tick(&self) {
        let mut events = Vec::new();
        let ticker = {
            let mut state = self.state.borrow_mut();
            if state.disposed || state.ticker.is_none() {
                return;
            }
            let before = state.remaining_ms;
            state.remaining_ms = before.saturating_sub(TICK_MS);
            if state.background_since.is_some() {
                state.background_ticked_ms += before - state.remaining_ms;
            }
            debug!(remaining_ms = state.remaining_ms, "Tick");
            events.push(CountdownEvent::Updated {
                remaining_ms: state.remaining_ms,
            });
            state.complete_if_finished(&mut events)
        };
        drop(ticker);
        self.emit(events);
    }

    fn handle_app_state(&self, app_state: AppState) {
        let now = self.host.clock.now();
        let mut events = Vec::new();
        let ticker = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.app_state = app_state;

            if !app_state.is_foreground() {
                if state.ticker.is_some() && state.background_since.is_none() {
                    state.background_since = Some(now);
                    state.background_ticked_ms = 0;
                    debug!(app_state = app_state.as_str(), "Left foreground");
                }
                return;
            }

            let Some(entered) = state.background_since.take() else {
                return;
            };
            let elapsed_ms = duration_to_ms(now.saturating_sub(entered));
            let missed_ms = elapsed_ms.saturating_sub(state.background_ticked_ms);
            state.background_ticked_ms = 0;
            state.remaining_ms = state.remaining_ms.saturating_sub(missed_ms);

            info!(
                elapsed_ms,
                missed_ms,
                remaining_ms = state.remaining_ms,
                "Reconciled background time"
            );
            events.push(CountdownEvent::Updated {
                remaining_ms: state.remaining_ms,
            });
            state.complete_if_finished(&mut events)
        };
        drop(ticker);
        self.emit(events);
    }

    fn dispose(&self) {
        let (ticker, lifecycle) = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.clear_background();
            (state.ticker.take(), state.lifecycle.take())
        };
        drop(ticker);
        drop(lifecycle);
        self.pending.borrow_mut().clear();
        debug!("Countdown disposed");
    }

    /// Queues notifications and delivers them unless a delivery is already
    /// in progress further up the stack, in which case that loop picks them up.
    fn emit(&self, events: Vec<CountdownEvent>) {
        self.pending.borrow_mut().extend(events);
        if self.dispatching.replace(true) {
            return;
        }

        loop {
            if self.state.borrow().disposed {
                self.pending.borrow_mut().clear();
                break;
            }
            let Some(event) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            self.callbacks.borrow_mut().dispatch(event);
        }

        self.dispatching.set(false);
    }

    fn status(&self) -> CountdownStatus {
        let state = self.state.borrow();
        if state.completed {
            CountdownStatus::Completed
        } else if state.ticker.is_some() {
            CountdownStatus::Running
        } else if state.started {
            CountdownStatus::Stopped
        } else {
            CountdownStatus::Idle
        }
    }

    fn snapshot(&self) -> CountdownSnapshot {
        let (remaining_ms, duration_ms) = {
            let state = self.state.borrow();
            (state.remaining_ms, state.config.duration_ms)
        };
        CountdownSnapshot::new(self.status(), remaining_ms, duration_ms)
    }
}

// ============================================================================
// CountdownEngine
// ============================================================================

/// Background-aware countdown timer.
///
/// The engine owns its tick registration and lifecycle subscription; both are
/// released on [`CountdownEngine::dispose`] or when the engine is dropped.
/// Callbacks never fire after disposal.
pub struct CountdownEngine {
    shared: Rc<Shared>,
}

impl CountdownEngine {
    /// Creates an engine, subscribes to lifecycle transitions and starts
    /// ticking if `config.auto_start` is set.
    pub fn new(config: CountdownConfig, host: Host, callbacks: CountdownCallbacks) -> Self {
        let remaining_ms = config.initial_remaining_ms();
        let auto_start = config.auto_start;
        debug!(
            duration_ms = config.duration_ms,
            remaining_ms, auto_start, "Creating countdown"
        );

        let shared = Rc::new(Shared {
            host,
            state: RefCell::new(State {
                config,
                remaining_ms,
                ticker: None,
                lifecycle: None,
                app_state: AppState::Active,
                background_since: None,
                background_ticked_ms: 0,
                started: false,
                completed: false,
                disposed: false,
            }),
            callbacks: RefCell::new(callbacks),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        });

        let weak = Rc::downgrade(&shared);
        let subscription = shared.host.lifecycle.subscribe(Box::new(move |app_state| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_app_state(app_state);
            }
        }));
        shared.state.borrow_mut().lifecycle = Some(subscription);

        if auto_start {
            shared.start();
        }

        Self { shared }
    }

    /// Starts ticking. No-op while running, after disposal, or once completed.
    pub fn start(&self) {
        self.shared.start();
    }

    /// Stops ticking. No-op when not running.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Stops ticking and restores the configured duration.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Feeds a lifecycle transition directly, for hosts without a notifier.
    pub fn handle_app_state(&self, app_state: AppState) {
        self.shared.handle_app_state(app_state);
    }

    /// Releases the tick registration and lifecycle subscription.
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    /// Returns a weak handle usable from inside callbacks.
    pub fn handle(&self) -> CountdownHandle {
        CountdownHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Remaining milliseconds.
    pub fn remaining_ms(&self) -> u64 {
        self.shared.state.borrow().remaining_ms
    }

    /// Remaining time.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms())
    }

    /// Configured duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.shared.state.borrow().config.duration_ms
    }

    /// Returns true while a tick source is active.
    pub fn is_playing(&self) -> bool {
        self.shared.state.borrow().ticker.is_some()
    }

    /// Returns true once zero has been reached (until reset).
    pub fn is_completed(&self) -> bool {
        self.shared.state.borrow().completed
    }

    /// Returns true after [`CountdownEngine::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.shared.state.borrow().disposed
    }

    /// Current status.
    pub fn status(&self) -> CountdownStatus {
        self.shared.status()
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_remaining(&self) -> String {
        format_remaining(self.remaining_ms())
    }

    /// Point-in-time view of the countdown.
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.shared.snapshot()
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

// ============================================================================
// CountdownHandle
// ============================================================================

/// Weak reference to an engine.
///
/// Operations on a handle whose engine has been dropped do nothing.
#[derive(Clone)]
pub struct CountdownHandle {
    shared: Weak<Shared>,
}

impl CountdownHandle {
    /// See [`CountdownEngine::start`].
    pub fn start(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.start();
        }
    }

    /// See [`CountdownEngine::stop`].
    pub fn stop(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.stop();
        }
    }

    /// See [`CountdownEngine::reset`].
    pub fn reset(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.reset();
        }
    }

    /// Snapshot of the engine, if it still exists.
    pub fn snapshot(&self) -> Option<CountdownSnapshot> {
        self.shared.upgrade().map(|shared| shared.snapshot())
    }
}

// ============================================================================
// Tests
// ============================================================================
