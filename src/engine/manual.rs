//! Deterministic host driven by a virtual clock.
//!
//! [`ManualHost`] lets tests (and the `simulate` command) move time forward
//! explicitly. Periodic callbacks fire in due order while time is advanced
//! with [`ManualHost::advance`]; [`ManualHost::advance_suspended`] models a
//! suspended process, where time passes but nothing fires.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use super::host::{Clock, Host, LifecycleNotifier, Registration, Scheduler};
use crate::types::AppState;

/// Smallest period accepted by the manual scheduler.
const MIN_PERIOD: Duration = Duration::from_millis(1);

// ============================================================================
// ManualClock
// ============================================================================

/// Virtual clock shared by the manual scheduler and lifecycle.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current reading. Moving backwards is allowed.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

struct TimerEntry {
    period: Duration,
    /// `None` once the next firing lies beyond the representable time range.
    next_due: Option<Duration>,
    callback: Option<Box<dyn FnMut()>>,
}

#[derive(Default)]
struct SchedulerInner {
    timers: BTreeMap<u64, TimerEntry>,
    next_id: u64,
}

/// Scheduler whose callbacks only fire when time is advanced.
#[derive(Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    inner: Rc<RefCell<SchedulerInner>>,
}

impl ManualScheduler {
    /// Creates a scheduler reading time from `clock`.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            inner: Rc::new(RefCell::new(SchedulerInner::default())),
        }
    }

    /// Number of registered periodic callbacks.
    pub fn active_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Advances time by `by`, firing every callback that falls due, in order.
    pub fn advance(&self, by: Duration) {
        let target = self.clock.now().saturating_add(by);

        while let Some(id) = self.next_due_before(target) {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                let Some(entry) = inner.timers.get_mut(&id) else {
                    continue;
                };
                let Some(due) = entry.next_due else {
                    continue;
                };
                self.clock.set(due);
                entry.next_due = due.checked_add(entry.period);
                entry.callback.take()
            };

            let Some(mut callback) = callback else {
                continue;
            };
            callback();

            // The callback may have cancelled its own registration.
            if let Some(entry) = self.inner.borrow_mut().timers.get_mut(&id) {
                entry.callback = Some(callback);
            }
        }

        self.clock.set(target);
    }

    /// Advances time by `by` without firing anything.
    ///
    /// Ticks that would have fired are skipped; each timer resumes on its
    /// original cadence after the suspension.
    pub fn advance_suspended(&self, by: Duration) {
        let target = self.clock.now().saturating_add(by);
        for entry in self.inner.borrow_mut().timers.values_mut() {
            let Some(due) = entry.next_due.filter(|due| *due <= target) else {
                continue;
            };
            let skipped = (target - due).as_nanos() / entry.period.as_nanos() + 1;
            entry.next_due = add_periods(due, entry.period, skipped);
        }
        self.clock.set(target);
    }

    fn next_due_before(&self, target: Duration) -> Option<u64> {
        self.inner
            .borrow()
            .timers
            .iter()
            .filter_map(|(id, entry)| entry.next_due.map(|due| (due, *id)))
            .filter(|(due, _)| *due <= target)
            .min()
            .map(|(_, id)| id)
    }
}

/// `base + period * count`, or `None` if that overflows a [`Duration`].
fn add_periods(base: Duration, period: Duration, count: u128) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let nanos = period
        .as_nanos()
        .checked_mul(count)?
        .checked_add(base.as_nanos())?;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    let subsec = u32::try_from(nanos % NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, subsec))
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, period: Duration, callback: Box<dyn FnMut()>) -> Registration {
        let period = period.max(MIN_PERIOD);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.timers.insert(
                id,
                TimerEntry {
                    period,
                    next_due: self.clock.now().checked_add(period),
                    callback: Some(callback),
                },
            );
            id
        };

        let inner: Weak<RefCell<SchedulerInner>> = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().timers.remove(&id);
            }
        })
    }
}

// ============================================================================
// ManualLifecycle
// ============================================================================

type LifecycleCallback = Box<dyn FnMut(AppState)>;

#[derive(Default)]
struct LifecycleInner {
    subscribers: BTreeMap<u64, Option<LifecycleCallback>>,
    next_id: u64,
    state: AppState,
}

/// Lifecycle notifier driven by explicit [`ManualLifecycle::set_app_state`] calls.
#[derive(Clone, Default)]
pub struct ManualLifecycle {
    inner: Rc<RefCell<LifecycleInner>>,
}

impl ManualLifecycle {
    /// Creates a notifier in the [`AppState::Active`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state published.
    pub fn app_state(&self) -> AppState {
        self.inner.borrow().state
    }

    /// Number of live subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Publishes a transition to every subscriber.
    pub fn set_app_state(&self, state: AppState) {
        let ids: Vec<u64> = {
            let mut inner = self.inner.borrow_mut();
            inner.state = state;
            inner.subscribers.keys().copied().collect()
        };

        for id in ids {
            let callback = self
                .inner
                .borrow_mut()
                .subscribers
                .get_mut(&id)
                .and_then(Option::take);
            let Some(mut callback) = callback else {
                continue;
            };
            callback(state);
            if let Some(slot) = self.inner.borrow_mut().subscribers.get_mut(&id) {
                *slot = Some(callback);
            }
        }
    }
}

impl LifecycleNotifier for ManualLifecycle {
    fn subscribe(&self, callback: Box<dyn FnMut(AppState)>) -> Registration {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.insert(id, Some(callback));
            id
        };

        let inner = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().subscribers.remove(&id);
            }
        })
    }
}

// ============================================================================
// ManualHost
// ============================================================================

/// Clock, scheduler and lifecycle sharing one virtual timeline.
#[derive(Clone)]
pub struct ManualHost {
    clock: ManualClock,
    scheduler: ManualScheduler,
    lifecycle: ManualLifecycle,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// Creates a host at virtual time zero, in the foreground.
    pub fn new() -> Self {
        let clock = ManualClock::new();
        Self {
            scheduler: ManualScheduler::new(clock.clone()),
            lifecycle: ManualLifecycle::new(),
            clock,
        }
    }

    /// Returns the capability bundle for an engine.
    pub fn host(&self) -> Host {
        Host::new(
            Rc::new(self.scheduler.clone()),
            Rc::new(self.lifecycle.clone()),
            Rc::new(self.clock.clone()),
        )
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// See [`ManualScheduler::advance`].
    pub fn advance(&self, by: Duration) {
        self.scheduler.advance(by);
    }

    /// See [`ManualScheduler::advance_suspended`].
    pub fn advance_suspended(&self, by: Duration) {
        self.scheduler.advance_suspended(by);
    }

    /// See [`ManualLifecycle::set_app_state`].
    pub fn set_app_state(&self, state: AppState) {
        self.lifecycle.set_app_state(state);
    }

    /// Moves the virtual clock to an arbitrary reading.
    pub fn set_clock(&self, now: Duration) {
        self.clock.set(now);
    }

    /// Number of registered periodic callbacks.
    pub fn active_timers(&self) -> usize {
        self.scheduler.active_timers()
    }

    /// Number of live lifecycle subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.lifecycle.active_subscriptions()
    }
}
