//! Host capabilities injected into the countdown engine.
//!
//! The engine has no dependency on a particular runtime. It asks the host
//! for three things:
//! - a periodic scheduler ([`Scheduler`])
//! - a lifecycle notifier for foreground/background transitions
//!   ([`LifecycleNotifier`])
//! - a clock ([`Clock`])
//!
//! Scheduled callbacks and subscriptions are returned as [`Registration`]s,
//! which release the underlying resource when cancelled or dropped.

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::AppState;

// ============================================================================
// Capability Traits
// ============================================================================

/// Periodic scheduling primitive.
///
/// Callbacks run on the thread that drives the host, never concurrently.
/// Implementations must not invoke the callback from inside `schedule`.
pub trait Scheduler {
    /// Invokes `callback` every `period` until the returned registration is
    /// cancelled or dropped. The first invocation happens one period from now.
    fn schedule(&self, period: Duration, callback: Box<dyn FnMut()>) -> Registration;
}

/// Process lifecycle notifier.
pub trait LifecycleNotifier {
    /// Invokes `callback` with every subsequent lifecycle transition until the
    /// returned registration is cancelled or dropped.
    fn subscribe(&self, callback: Box<dyn FnMut(AppState)>) -> Registration;
}

/// Time source used to measure time spent outside the foreground.
pub trait Clock {
    /// Current reading, measured from an arbitrary fixed epoch.
    fn now(&self) -> Duration;
}

// ============================================================================
// Registration
// ============================================================================

/// Scoped handle to a scheduled callback or lifecycle subscription.
///
/// The release action runs exactly once: on [`Registration::cancel`] or when
/// the handle is dropped, whichever comes first.
#[must_use = "dropping a Registration cancels it immediately"]
pub struct Registration {
    release: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    /// Creates a registration that runs `release` when cancelled.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Cancels the registration now.
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.release.is_some())
            .finish()
    }
}

// ============================================================================
// Host
// ============================================================================

/// Bundle of the capabilities an engine needs.
#[derive(Clone)]
pub struct Host {
    /// Periodic scheduler
    pub scheduler: Rc<dyn Scheduler>,
    /// Lifecycle notifier
    pub lifecycle: Rc<dyn LifecycleNotifier>,
    /// Clock
    pub clock: Rc<dyn Clock>,
}

impl Host {
    /// Creates a host from its three capabilities.
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        lifecycle: Rc<dyn LifecycleNotifier>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            scheduler,
            lifecycle,
            clock,
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

// ============================================================================
// WallClock
// ============================================================================

/// Wall-clock time since the Unix epoch.
///
/// Unlike a monotonic clock this keeps counting while the device sleeps,
/// which is what background reconciliation needs. A clock that steps
/// backwards is tolerated by the engine (elapsed time saturates at zero).
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_registration() -> (Registration, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let registration = Registration::new(move || counter.set(counter.get() + 1));
        (registration, count)
    }

    #[test]
    fn test_cancel_releases_once() {
        let (registration, count) = counting_registration();
        registration.cancel();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let (registration, count) = counting_registration();
        drop(registration);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_debug_shows_active() {
        let (registration, _count) = counting_registration();
        assert!(format!("{:?}", registration).contains("active: true"));
    }

    #[test]
    fn test_wall_clock_is_after_epoch() {
        let clock = WallClock;
        let first = clock.now();
        let second = clock.now();
        assert!(first > Duration::ZERO);
        assert!(second >= first);
    }
}
