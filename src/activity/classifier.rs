use serde::Serialize;

/// A single idle/active edge. Entering idle carries the sampled idle
/// duration at the moment of detection; returning to activity carries 0.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdleTransition {
    pub is_idle: bool,
    pub idle_duration_ms: u64,
}

/// Latched two-state classifier over the sampled idle-seconds signal.
///
/// Starts in Active. Crosses to Idle when a sample reaches the
/// threshold, back to Active when a sample drops under it. A single
/// threshold with no hysteresis band; consumers are only told about the
/// edges, never about repeated samples on the same side.
#[derive(Debug)]
pub struct IdleClassifier {
    threshold_secs: u64,
    is_idle: bool,
}

impl IdleClassifier {
    pub fn new(threshold_secs: u64) -> Self {
        Self {
            threshold_secs,
            is_idle: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    /// Feed one sampled idle duration. Returns a transition only when
    /// the latched state flips.
    pub fn observe(&mut self, idle_seconds: u64) -> Option<IdleTransition> {
        let should_be_idle = idle_seconds >= self.threshold_secs;
        if should_be_idle == self.is_idle {
            return None;
        }
        self.is_idle = should_be_idle;
        Some(if should_be_idle {
            IdleTransition {
                is_idle: true,
                idle_duration_ms: idle_seconds * 1000,
            }
        } else {
            IdleTransition {
                is_idle: false,
                idle_duration_ms: 0,
            }
        })
    }
}
