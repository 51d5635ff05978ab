use log::debug;
use serde::Serialize;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerTickPayload {
    pub remaining_seconds: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdleStateChangePayload {
    pub is_idle: bool,
    pub idle_duration_ms: u64,
}

/// Boundary events announced to the presentation layer. The serialized
/// `event` tag is the wire name consumed by the UI.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum CoreEvent {
    TimerTick(TimerTickPayload),
    TimerDone,
    IdleStateChange(IdleStateChangePayload),
}

/// Fire-and-forget fan-out channel between the core and any number of
/// passive consumers. Emission never blocks and never fails: with no
/// subscribers the event is simply dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }

    pub fn emit_timer_tick(&self, remaining_seconds: u32) {
        self.emit(CoreEvent::TimerTick(TimerTickPayload { remaining_seconds }));
    }

    pub fn emit_timer_done(&self) {
        self.emit(CoreEvent::TimerDone);
    }

    pub fn emit_idle_state_change(&self, is_idle: bool, idle_duration_ms: u64) {
        self.emit(CoreEvent::IdleStateChange(IdleStateChangePayload {
            is_idle,
            idle_duration_ms,
        }));
    }

    fn emit(&self, event: CoreEvent) {
        if self.tx.send(event).is_err() {
            debug!("no event subscribers, dropping event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
