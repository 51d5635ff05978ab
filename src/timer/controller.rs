use std::{sync::Arc, time::Duration};

use log::{debug, info};
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::events::EventBus;

use super::state::{TickOutcome, TimerState};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the countdown state and the ticker task that drives it.
///
/// Commands that arrive in an inapplicable state are silent no-ops; a
/// missed command simply has no effect and the UI can retry.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    events: EventBus,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerController {
    pub fn new(events: EventBus) -> Self {
        Self::with_tick_interval(events, TICK_INTERVAL)
    }

    /// Shortened intervals are used by tests; production callers go
    /// through `new`.
    pub(crate) fn with_tick_interval(events: EventBus, tick_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
        }
    }

    pub async fn snapshot(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    /// Begin a countdown of `initial_seconds`. First start wins: while a
    /// countdown is already running the call is ignored. Returns whether
    /// a new session actually began.
    pub async fn start(&self, initial_seconds: u32) -> bool {
        {
            let mut state = self.state.lock().await;
            if !state.start(initial_seconds) {
                debug!("timer already running, ignoring start({initial_seconds})");
                return false;
            }
            info!("timer started: {initial_seconds}s");
        }
        self.spawn_ticker().await;
        true
    }

    /// Halt ticking unconditionally and reset, clearing any paused value.
    pub async fn stop(&self) {
        self.state.lock().await.stop();
        self.cancel_ticker().await;
        info!("timer stopped");
    }

    /// Freeze the countdown at its current value. No-op unless running.
    pub async fn pause(&self) {
        let paused = self.state.lock().await.pause();
        if !paused {
            debug!("timer not running, ignoring pause");
            return;
        }
        self.cancel_ticker().await;
        info!("timer paused");
    }

    /// Continue a paused countdown from where it left off. No-op unless
    /// a paused value exists.
    pub async fn resume(&self) {
        let resumed = self.state.lock().await.resume();
        match resumed {
            Some(value) => {
                info!("timer resumed at {value}s");
                self.spawn_ticker().await;
            }
            None => debug!("nothing paused, ignoring resume"),
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            // First decrement lands one full interval after start/resume.
            let mut interval =
                time::interval_at(time::Instant::now() + tick_interval, tick_interval);
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let outcome = state.lock().await.tick();
                match outcome {
                    TickOutcome::Ticked { remaining_seconds } => {
                        events.emit_timer_tick(remaining_seconds);
                    }
                    TickOutcome::Completed => {
                        info!("countdown complete");
                        events.emit_timer_tick(0);
                        events.emit_timer_done();
                        break;
                    }
                    TickOutcome::Skipped => break,
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}
