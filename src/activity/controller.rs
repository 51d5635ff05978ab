use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::EventBus;

use super::probe::IdleProbe;
use super::sampler::sampling_loop;

pub const IDLE_THRESHOLD_SECS: u64 = 30;
const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle owner of the idle sampling loop. One loop at a time; the
/// loop itself is a cancellable task that announces idle/active edges on
/// the event bus.
pub struct ActivityMonitor {
    probe: Arc<dyn IdleProbe>,
    events: EventBus,
    sample_interval: Duration,
    idle_threshold_secs: u64,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ActivityMonitor {
    pub fn new(probe: Arc<dyn IdleProbe>, events: EventBus) -> Self {
        Self::with_sampling(probe, events, SAMPLE_INTERVAL, IDLE_THRESHOLD_SECS)
    }

    pub(crate) fn with_sampling(
        probe: Arc<dyn IdleProbe>,
        events: EventBus,
        sample_interval: Duration,
        idle_threshold_secs: u64,
    ) -> Self {
        Self {
            probe,
            events,
            sample_interval,
            idle_threshold_secs,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            bail!("activity monitor already running");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(
            self.probe.clone(),
            self.events.clone(),
            self.sample_interval,
            self.idle_threshold_secs,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("idle sampling task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::events::{CoreEvent, EventBus, IdleStateChangePayload};

    use super::super::probe::IdleProbe;
    use super::ActivityMonitor;

    const TEST_SAMPLE: Duration = Duration::from_millis(5);
    const RECV_DEADLINE: Duration = Duration::from_millis(500);

    /// Replays a fixed sample sequence, then keeps returning the final
    /// value.
    struct ScriptedProbe {
        samples: Mutex<VecDeque<u64>>,
        hold: u64,
    }

    impl ScriptedProbe {
        fn new(samples: &[u64]) -> Self {
            Self {
                samples: Mutex::new(samples.iter().copied().collect()),
                hold: *samples.last().expect("non-empty script"),
            }
        }
    }

    impl IdleProbe for ScriptedProbe {
        fn idle_seconds(&self) -> u64 {
            self.samples
                .lock()
                .expect("probe lock")
                .pop_front()
                .unwrap_or(self.hold)
        }
    }

    async fn next_idle_event(
        rx: &mut tokio::sync::broadcast::Receiver<CoreEvent>,
    ) -> IdleStateChangePayload {
        loop {
            let event = timeout(RECV_DEADLINE, rx.recv())
                .await
                .expect("event deadline")
                .expect("event channel open");
            if let CoreEvent::IdleStateChange(payload) = event {
                return payload;
            }
        }
    }

    #[tokio::test]
    async fn announces_edges_only() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let probe = Arc::new(ScriptedProbe::new(&[10, 20, 29, 30, 35, 25, 5]));
        let mut monitor =
            ActivityMonitor::with_sampling(probe, bus, TEST_SAMPLE, 30);
        monitor.start().expect("start");

        let went_idle = next_idle_event(&mut rx).await;
        assert!(went_idle.is_idle);
        assert_eq!(went_idle.idle_duration_ms, 30_000);

        let returned = next_idle_event(&mut rx).await;
        assert!(!returned.is_idle);
        assert_eq!(returned.idle_duration_ms, 0);

        // The script holds at 5s below threshold: no more edges.
        assert!(timeout(TEST_SAMPLE * 10, rx.recv()).await.is_err());

        monitor.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let bus = EventBus::new();
        let probe = Arc::new(ScriptedProbe::new(&[0]));
        let mut monitor = ActivityMonitor::with_sampling(probe, bus, TEST_SAMPLE, 30);

        monitor.start().expect("first start");
        assert!(monitor.start().is_err());

        monitor.stop().await.expect("stop");
        monitor.start().expect("restart after stop");
        monitor.stop().await.expect("final stop");
    }

    #[tokio::test]
    async fn stop_without_start_is_ok() {
        let bus = EventBus::new();
        let probe = Arc::new(ScriptedProbe::new(&[0]));
        let mut monitor = ActivityMonitor::with_sampling(probe, bus, TEST_SAMPLE, 30);
        monitor.stop().await.expect("stop with nothing running");
    }
}
