//! Integration tests for the countdown engine on the tokio host.
//!
//! Tokio time is paused, so these run on a virtual clock while still going
//! through the real scheduler, broadcast lifecycle and `LocalSet`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::task::LocalSet;
use tokio::time::sleep;

use countdown::runtime::tokio_host_with_clock;
use countdown::{
    AppState, ChannelLifecycle, CountdownCallbacks, CountdownConfig, CountdownEngine, TokioClock,
};

fn recording_callbacks() -> (CountdownCallbacks, Rc<RefCell<Vec<u64>>>, Rc<Cell<u32>>) {
    let updates = Rc::new(RefCell::new(Vec::new()));
    let completions = Rc::new(Cell::new(0));
    let sink = updates.clone();
    let counter = completions.clone();
    let callbacks = CountdownCallbacks::new()
        .on_update(move |remaining| sink.borrow_mut().push(remaining))
        .on_complete(move || counter.set(counter.get() + 1));
    (callbacks, updates, completions)
}

#[tokio::test(start_paused = true)]
async fn counts_down_with_tokio_scheduler() {
    LocalSet::new()
        .run_until(async {
            let lifecycle = Rc::new(ChannelLifecycle::new());
            let host = tokio_host_with_clock(lifecycle, Rc::new(TokioClock::new()));
            let (callbacks, updates, completions) = recording_callbacks();

            let engine = CountdownEngine::new(CountdownConfig::new(3_000), host, callbacks);
            sleep(Duration::from_millis(3_500)).await;

            assert_eq!(*updates.borrow(), vec![2_000, 1_000, 0]);
            assert_eq!(completions.get(), 1);
            assert!(!engine.is_playing());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn background_ticks_are_not_double_counted() {
    LocalSet::new()
        .run_until(async {
            let lifecycle = Rc::new(ChannelLifecycle::new());
            let host = tokio_host_with_clock(lifecycle.clone(), Rc::new(TokioClock::new()));
            let (callbacks, _updates, _completions) = recording_callbacks();

            let engine = CountdownEngine::new(CountdownConfig::new(10_000), host, callbacks);

            sleep(Duration::from_millis(1_500)).await;
            lifecycle.publish(AppState::Background);
            sleep(Duration::from_secs(3)).await;
            lifecycle.publish(AppState::Active);
            sleep(Duration::from_millis(100)).await;

            // Ticks at 1s..4s kept firing, so reconciliation adds nothing.
            assert_eq!(engine.remaining_ms(), 6_000);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_tokio_tasks() {
    LocalSet::new()
        .run_until(async {
            let lifecycle = Rc::new(ChannelLifecycle::new());
            let host = tokio_host_with_clock(lifecycle.clone(), Rc::new(TokioClock::new()));
            let (callbacks, updates, _completions) = recording_callbacks();

            let engine = CountdownEngine::new(CountdownConfig::new(10_000), host, callbacks);
            sleep(Duration::from_millis(1_500)).await;
            engine.dispose();

            sleep(Duration::from_secs(5)).await;
            lifecycle.publish(AppState::Background);
            sleep(Duration::from_millis(100)).await;

            assert_eq!(*updates.borrow(), vec![9_000]);
        })
        .await;
}
