pub mod controller;
pub mod state;

pub use controller::TimerController;
pub use state::{TickOutcome, TimerState, TimerStatus};
