use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Stopped,
    Running,
    Paused,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Stopped
    }
}

/// Outcome of a single one-second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Counter decremented, countdown continues.
    Ticked { remaining_seconds: u32 },
    /// Counter reached zero on this tick; the session is over.
    Completed,
    /// The timer was not running when the tick fired.
    Skipped,
}

/// Countdown session state. Only the ticker task and the command methods
/// mutate it; everyone else reads snapshots.
///
/// Invariant: `status == Running` and a paused value never coexist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub session_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub initial_seconds: u32,
    pub remaining_seconds: u32,
    pub paused_value: Option<u32>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Stopped,
            session_id: None,
            started_at: None,
            initial_seconds: 0,
            remaining_seconds: 0,
            paused_value: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    /// Begin a new session. First start wins: while a countdown is
    /// actively running the call changes nothing and returns false.
    /// Starting over a paused session replaces it.
    pub fn start(&mut self, initial_seconds: u32) -> bool {
        if self.is_running() {
            return false;
        }
        *self = Self {
            status: TimerStatus::Running,
            session_id: Some(Uuid::new_v4()),
            started_at: Some(Utc::now()),
            initial_seconds,
            remaining_seconds: initial_seconds,
            paused_value: None,
        };
        true
    }

    /// Halt unconditionally and reset, clearing any paused value.
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Record the current counter and halt ticking. No-op unless running.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.status = TimerStatus::Paused;
        self.paused_value = Some(self.remaining_seconds);
        true
    }

    /// Pick the countdown back up from the paused value, clearing the
    /// marker. Returns the resumed counter, or None if there was nothing
    /// to resume.
    pub fn resume(&mut self) -> Option<u32> {
        if self.status != TimerStatus::Paused {
            return None;
        }
        let value = self.paused_value.take()?;
        self.status = TimerStatus::Running;
        self.remaining_seconds = value;
        Some(value)
    }

    /// Decrement the counter by one second. On reaching zero the session
    /// transitions to stopped; there is no auto-repeat.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Skipped;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.status = TimerStatus::Stopped;
            return TickOutcome::Completed;
        }
        TickOutcome::Ticked {
            remaining_seconds: self.remaining_seconds,
        }
    }
}
