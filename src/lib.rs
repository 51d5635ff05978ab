pub mod activity;
pub mod breaks;
pub mod engine;
pub mod events;
pub mod settings;
pub mod timer;

pub use activity::{ActivityMonitor, IdleClassifier, IdleProbe, IDLE_THRESHOLD_SECS};
pub use breaks::{BreakState, BreakTracker};
pub use engine::Engine;
pub use events::{CoreEvent, EventBus};
pub use settings::{NotificationSound, SettingsStore, TimerSettings};
pub use timer::{TimerController, TimerState, TimerStatus};

/// Initialize logging (reads RUST_LOG env var). Safe to call more than
/// once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
