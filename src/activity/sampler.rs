use std::{sync::Arc, time::Duration};

use log::info;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::events::EventBus;

use super::classifier::IdleClassifier;
use super::probe::IdleProbe;

pub(crate) async fn sampling_loop(
    probe: Arc<dyn IdleProbe>,
    events: EventBus,
    sample_interval: Duration,
    idle_threshold_secs: u64,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(sample_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut classifier = IdleClassifier::new(idle_threshold_secs);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let idle_seconds = probe.idle_seconds();
                if let Some(change) = classifier.observe(idle_seconds) {
                    if change.is_idle {
                        info!("user went idle after {idle_seconds}s without input");
                    } else {
                        info!("user returned from idle");
                    }
                    events.emit_idle_state_change(change.is_idle, change.idle_duration_ms);
                }
            }
            _ = cancel_token.cancelled() => {
                info!("idle sampling loop shutting down");
                break;
            }
        }
    }
}
