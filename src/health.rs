//! Bounded background liveness polling.
//!
//! [`HealthMonitor`] probes once on start, then on a fixed interval, and stops
//! on its own once the bound has elapsed since start. The last observed
//! status is kept after that. Both timers live inside one spawned task, so
//! aborting the task clears them together.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::QueryClient;
use crate::traits::{HealthProbe, HttpClient};

/// Default time between probes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default total polling lifetime.
pub const DEFAULT_BOUND: Duration = Duration::from_secs(60);

/// Backend reachability as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    /// No probe has completed yet
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn from_probe(healthy: bool) -> Self {
        if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[async_trait]
impl<C: HttpClient + 'static> HealthProbe for QueryClient<C> {
    async fn probe(&self) -> bool {
        self.health_check().await
    }
}

/// Periodic prober with a bounded lifetime.
///
/// Must be used inside a tokio runtime. Dropping the monitor stops it.
pub struct HealthMonitor {
    probe: Arc<dyn HealthProbe>,
    interval: Duration,
    bound: Duration,
    status: Arc<watch::Sender<HealthStatus>>,
    task: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// A zero `interval` falls back to [`DEFAULT_INTERVAL`].
    pub fn new(probe: Arc<dyn HealthProbe>, interval: Duration, bound: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!("Zero health interval, using {:?}", DEFAULT_INTERVAL);
            DEFAULT_INTERVAL
        } else {
            interval
        };
        let (status, _) = watch::channel(HealthStatus::Unknown);
        Self {
            probe,
            interval,
            bound,
            status: Arc::new(status),
            task: None,
        }
    }

    /// Begin polling. No-op while already running; after a stop or bound
    /// expiry a new bounded run begins.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        tracing::info!(
            "Health monitor started (interval: {:?}, bound: {:?})",
            self.interval,
            self.bound
        );

        let probe = Arc::clone(&self.probe);
        let status = Arc::clone(&self.status);
        self.task = Some(tokio::spawn(poll_until_bound(
            probe,
            status,
            self.interval,
            self.bound,
        )));
    }

    /// Cancel polling immediately. The last status is kept.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                tracing::debug!("Health monitor stopped");
            }
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    pub fn status(&self) -> HealthStatus {
        *self.status.borrow()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<HealthStatus> {
        self.status.subscribe()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_until_bound(
    probe: Arc<dyn HealthProbe>,
    status: Arc<watch::Sender<HealthStatus>>,
    interval: Duration,
    bound: Duration,
) {
    let started = Instant::now();
    let deadline = started + bound;

    let mut ticker = tokio::time::interval_at(started, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let polling = async {
        loop {
            let scheduled = ticker.tick().await;
            // A probe due exactly at the bound is not issued
            if scheduled >= deadline {
                break;
            }

            let next = HealthStatus::from_probe(probe.probe().await);
            let previous = status.send_replace(next);
            if previous != next {
                tracing::info!("Backend health changed: {} -> {}", previous, next);
            }
        }
    };

    if tokio::time::timeout_at(deadline, polling).await.is_err() {
        tracing::debug!("Health probe still pending at bound, cancelled");
    }
    tracing::debug!("Health monitor reached its bound, polling ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingProbe {
        healthy: bool,
        started: Instant,
        calls: Mutex<Vec<Duration>>,
    }

    impl RecordingProbe {
        fn new(healthy: bool) -> Arc<Self> {
            Arc::new(Self {
                healthy,
                started: Instant::now(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_times(&self) -> Vec<u64> {
            self.calls.lock().unwrap().iter().map(Duration::as_secs).collect()
        }
    }

    #[async_trait]
    impl HealthProbe for RecordingProbe {
        async fn probe(&self) -> bool {
            self.calls.lock().unwrap().push(self.started.elapsed());
            self.healthy
        }
    }

    fn monitor(probe: Arc<RecordingProbe>) -> HealthMonitor {
        HealthMonitor::new(probe, DEFAULT_INTERVAL, DEFAULT_BOUND)
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_every_interval_until_bound() {
        let probe = RecordingProbe::new(false);
        let mut monitor = monitor(Arc::clone(&probe));
        assert_eq!(monitor.status(), HealthStatus::Unknown);

        monitor.start();
        tokio::time::sleep(Duration::from_secs(120)).await;

        let expected: Vec<u64> = (0..12).map(|i| i * 5).collect();
        assert_eq!(probe.call_times(), expected);
        assert_eq!(monitor.status(), HealthStatus::Unhealthy);
        assert!(!monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let probe = RecordingProbe::new(true);
        let mut monitor = monitor(Arc::clone(&probe));

        monitor.start();
        monitor.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(probe.call_times(), vec![0]);
        assert_eq!(monitor.status(), HealthStatus::Healthy);
        assert!(monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_uses_default() {
        let probe = RecordingProbe::new(true);
        let mut monitor = HealthMonitor::new(probe.clone(), Duration::ZERO, DEFAULT_BOUND);

        monitor.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(probe.call_times(), vec![0]);
        assert_eq!(monitor.status(), HealthStatus::Healthy);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(probe.call_times(), vec![0, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_polling_and_keeps_status() {
        let probe = RecordingProbe::new(true);
        let mut monitor = monitor(Arc::clone(&probe));

        monitor.start();
        tokio::time::sleep(Duration::from_secs(7)).await;
        monitor.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(probe.call_times(), vec![0, 5]);
        assert_eq!(monitor.status(), HealthStatus::Healthy);
        assert!(!monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let probe = RecordingProbe::new(true);
        let mut monitor = monitor(Arc::clone(&probe));

        monitor.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(monitor);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(probe.call_times(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_observes_changes() {
        let probe = RecordingProbe::new(true);
        let mut monitor = monitor(probe);
        let mut rx = monitor.subscribe();

        monitor.start();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), HealthStatus::Healthy);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(HealthStatus::Unknown.to_string(), "unknown");
        assert_eq!(HealthStatus::Unhealthy.to_string(), "unhealthy");
    }
}
