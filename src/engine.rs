use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::Result;
use log::{info, warn};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::activity::{ActivityMonitor, IdleProbe};
use crate::breaks::{BreakState, BreakTracker};
use crate::events::{CoreEvent, EventBus};
use crate::settings::SettingsStore;
use crate::timer::{TimerController, TimerState};

/// The application core: owns the timer controller, the idle sampling
/// loop, the break derivation, and user settings, with a single
/// creation and teardown point.
///
/// Construct from within a tokio runtime; `new` starts idle sampling
/// immediately (it runs for the whole application lifetime, whether or
/// not a countdown is active) and `shutdown` tears everything down.
pub struct Engine {
    events: EventBus,
    timer: TimerController,
    activity: Mutex<ActivityMonitor>,
    breaks: Arc<StdMutex<BreakTracker>>,
    settings: SettingsStore,
    wiring: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    pub fn new(probe: Arc<dyn IdleProbe>, settings_path: PathBuf) -> Result<Self> {
        let events = EventBus::new();
        let timer = TimerController::new(events.clone());
        let activity = ActivityMonitor::new(probe, events.clone());
        Self::assemble(events, timer, activity, settings_path)
    }

    /// Shortened intervals are used by tests; production callers go
    /// through `new`.
    #[cfg(test)]
    pub(crate) fn with_timing(
        probe: Arc<dyn IdleProbe>,
        settings_path: PathBuf,
        tick_interval: std::time::Duration,
        sample_interval: std::time::Duration,
        idle_threshold_secs: u64,
    ) -> Result<Self> {
        let events = EventBus::new();
        let timer = TimerController::with_tick_interval(events.clone(), tick_interval);
        let activity = ActivityMonitor::with_sampling(
            probe,
            events.clone(),
            sample_interval,
            idle_threshold_secs,
        );
        Self::assemble(events, timer, activity, settings_path)
    }

    fn assemble(
        events: EventBus,
        timer: TimerController,
        mut activity: ActivityMonitor,
        settings_path: PathBuf,
    ) -> Result<Self> {
        let settings = SettingsStore::new(settings_path)?;
        let breaks = Arc::new(StdMutex::new(BreakTracker::new()));

        let wiring = tokio::spawn(break_loop(events.subscribe(), breaks.clone()));
        activity.start()?;

        Ok(Self {
            events,
            timer,
            activity: Mutex::new(activity),
            breaks,
            settings,
            wiring: Mutex::new(Some(wiring)),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Start a countdown. An actually-started session resets the break
    /// flags; an ignored (already-running) start leaves them alone.
    pub async fn start_timer(&self, initial_seconds: u32) -> bool {
        let started = self.timer.start(initial_seconds).await;
        if started {
            self.breaks.lock().unwrap().on_session_start();
        }
        started
    }

    /// Start a countdown of the configured work-interval length.
    pub async fn start_work_session(&self) -> bool {
        let work_secs = self.settings.timer().work_secs;
        self.start_timer(work_secs).await
    }

    pub async fn stop_timer(&self) {
        self.timer.stop().await;
    }

    pub async fn pause_timer(&self) {
        self.timer.pause().await;
    }

    pub async fn resume_timer(&self) {
        self.timer.resume().await;
    }

    pub async fn timer_state(&self) -> TimerState {
        self.timer.snapshot().await
    }

    pub fn break_state(&self) -> BreakState {
        self.breaks.lock().unwrap().state()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.timer.stop().await;
        self.activity.lock().await.stop().await?;
        if let Some(handle) = self.wiring.lock().await.take() {
            handle.abort();
        }
        info!("engine shut down");
        Ok(())
    }
}

/// Folds boundary events into the break tracker. Runs until the engine
/// shuts down; the tracker has no other writer.
async fn break_loop(
    mut rx: broadcast::Receiver<CoreEvent>,
    breaks: Arc<StdMutex<BreakTracker>>,
) {
    loop {
        match rx.recv().await {
            Ok(CoreEvent::TimerDone) => {
                breaks.lock().unwrap().on_work_complete();
                info!("work interval complete, awaiting break");
            }
            Ok(CoreEvent::IdleStateChange(change)) => {
                let updated = {
                    let mut tracker = breaks.lock().unwrap();
                    tracker.on_idle_change(change.is_idle).then(|| tracker.state())
                };
                if let Some(state) = updated {
                    if state.is_on_break {
                        info!("break started");
                    } else {
                        info!("break ended, user is back");
                    }
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("break derivation lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
