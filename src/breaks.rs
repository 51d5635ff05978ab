use serde::Serialize;

/// Break flags derived from the work-interval and idle streams.
///
/// Invariant: `is_on_break` is only ever set from `awaiting_break`, so
/// the user must have finished a work interval before a break can start.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BreakState {
    pub awaiting_break: bool,
    pub is_on_break: bool,
}

/// Folds timer completion and idle edges into the break flags.
#[derive(Debug, Default)]
pub struct BreakTracker {
    state: BreakState,
}

impl BreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BreakState {
        self.state
    }

    /// A work interval just finished; the user has not stepped away yet.
    pub fn on_work_complete(&mut self) {
        self.state.awaiting_break = true;
    }

    /// A fresh work session began: all break bookkeeping resets.
    pub fn on_session_start(&mut self) {
        self.state = BreakState::default();
    }

    /// Apply an idle/active edge. Returns true when the flags changed.
    pub fn on_idle_change(&mut self, is_idle: bool) -> bool {
        if is_idle && self.state.awaiting_break {
            self.state.awaiting_break = false;
            self.state.is_on_break = true;
            return true;
        }
        if !is_idle && self.state.is_on_break {
            self.state.is_on_break = false;
            return true;
        }
        false
    }
}
