//! # Producer loop
//!
//! The [`Scheduler`] is the single producer. Each cycle walks
//!
//! ```text
//! Idle → AcquiringLocation → Computing → Publishing → Idle
//! ```
//!
//! - **AcquiringLocation**: ask the [`LocationProvider`]; on failure the last known observer is
//!   reused.
//! - **Computing**: stars and solar-system bodies, no lock held.
//! - **Publishing**: swap the snapshot, enqueue the stars to the logger, notify the display.
//!
//! Between cycles the producer waits on the shared wake-up signal, so a shutdown request takes
//! effect without waiting out the interval.
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, trace, warn};

use crate::engine::PositionEngine;
use crate::logger::ResultLogger;
use crate::observers::{LocationProvider, Observer};
use crate::shared_state::{ResultSnapshot, SharedState};
use crate::zenith_errors::ZenithError;

/// Display refresh callback, called once per publish.
pub type Notifier = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    AcquiringLocation,
    Computing,
    Publishing,
}

pub struct Scheduler {
    engine: Arc<PositionEngine>,
    location: Arc<dyn LocationProvider>,
    state: Arc<SharedState>,
    logger: Option<Arc<ResultLogger>>,
    notifier: Option<Notifier>,
    interval: Duration,
    last_observer: Observer,
    sequence: u64,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("engine", &self.engine)
            .field("logging", &self.logger.is_some())
            .field("interval", &self.interval)
            .field("last_observer", &self.last_observer)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// The first observer fallback is the one the shared state was created with.
    pub fn new(
        engine: Arc<PositionEngine>,
        location: Arc<dyn LocationProvider>,
        state: Arc<SharedState>,
        interval: Duration,
    ) -> Self {
        let initial = state.snapshot();
        Scheduler {
            engine,
            location,
            last_observer: initial.observer,
            sequence: initial.sequence,
            state,
            logger: None,
            notifier: None,
            interval,
        }
    }

    pub fn with_logger(mut self, logger: Arc<ResultLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_notifier<F>(mut self, notifier: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier = Some(Box::new(notifier));
        self
    }

    fn enter(&self, phase: CyclePhase) {
        trace!(?phase, sequence = self.sequence, "scheduler phase");
    }

    fn acquire_location(&mut self) -> Observer {
        match self.location.get_location() {
            Ok(observer) => {
                self.last_observer = observer;
                observer
            }
            Err(err) => {
                warn!(%err, observer = %self.last_observer, "location unavailable, reusing last observer");
                self.last_observer
            }
        }
    }

    /// Run exactly one cycle and return the published sequence number.
    pub fn run_cycle(&mut self) -> u64 {
        self.enter(CyclePhase::AcquiringLocation);
        let observer = self.acquire_location();
        self.state.set_live_location(self.location.is_live());

        self.enter(CyclePhase::Computing);
        let now = Utc::now();
        let stars = self.engine.calculate_zenith_proximity(&observer, &now);
        let solar_bodies = self.engine.calculate_solar_system(&observer, &now);

        self.enter(CyclePhase::Publishing);
        self.sequence += 1;
        let snapshot = Arc::new(ResultSnapshot {
            observer,
            stars,
            solar_bodies,
            computed_at: now,
            sequence: self.sequence,
        });
        self.state.publish(snapshot.clone());

        if let Some(logger) = &self.logger {
            logger.log(&snapshot.observer, &snapshot.stars);
        }
        if let Some(notify) = &self.notifier {
            notify();
        }

        self.enter(CyclePhase::Idle);
        self.sequence
    }

    /// Cycle until shutdown is requested on the shared state.
    pub fn run(mut self) {
        info!(interval_ms = self.interval.as_millis() as u64, "scheduler started");
        while self.state.is_running() {
            self.run_cycle();
            if self.state.wait_for_shutdown(self.interval) {
                break;
            }
        }
        info!(cycles = self.sequence, "scheduler stopped");
    }

    /// Start the producer on its own named thread.
    pub fn spawn(self) -> Result<SchedulerHandle, ZenithError> {
        let state = self.state.clone();
        let handle = thread::Builder::new()
            .name("zenith-scheduler".into())
            .spawn(move || self.run())?;
        Ok(SchedulerHandle { state, handle })
    }
}

/// Handle on a spawned [`Scheduler`].
#[derive(Debug)]
pub struct SchedulerHandle {
    state: Arc<SharedState>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn shutdown(&self) {
        self.state.request_shutdown();
    }

    pub fn join(self) -> Result<(), ZenithError> {
        self.handle
            .join()
            .map_err(|_| ZenithError::WorkerPanicked("zenith-scheduler".into()))
    }

    /// Request shutdown and wait for the producer to exit.
    pub fn stop(self) -> Result<(), ZenithError> {
        self.shutdown();
        self.join()
    }
}

#[cfg(test)]
mod scheduler_test {
    use super::*;
    use crate::catalog::{BrightStars, CatalogSource};
    use crate::observers::{SampledLocationProvider, StaticLocationProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn engine() -> Arc<PositionEngine> {
        let mut engine = PositionEngine::new().with_horizon_cutoff(None);
        engine.set_catalog(&BrightStars.stars().unwrap());
        Arc::new(engine)
    }

    #[test]
    fn test_run_cycle_publishes() {
        let observer = Observer::new(37.7749, -122.4194, 16.0);
        let state = Arc::new(SharedState::new(observer));
        let notified = Arc::new(AtomicUsize::new(0));

        let mut scheduler = Scheduler::new(
            engine(),
            Arc::new(StaticLocationProvider::new(observer)),
            state.clone(),
            Duration::from_secs(1),
        )
        .with_notifier({
            let notified = notified.clone();
            move || {
                notified.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert_eq!(scheduler.run_cycle(), 1);
        assert_eq!(scheduler.run_cycle(), 2);

        let snap = state.snapshot();
        assert_eq!(snap.sequence, 2);
        assert_eq!(snap.observer, observer);
        assert_eq!(snap.stars.len(), 50);
        assert_eq!(snap.solar_bodies.len(), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 2);
        assert!(!state.is_live_location());
    }

    #[test]
    fn test_location_failure_reuses_last_observer() {
        let first = Observer::new(48.8566, 2.3522, 35.0);
        let calls = AtomicUsize::new(0);
        let provider = SampledLocationProvider::new("flaky", move || {
            (calls.fetch_add(1, Ordering::SeqCst) == 0).then_some(first)
        });

        let state = Arc::new(SharedState::new(Observer::new(0.0, 0.0, 0.0)));
        let mut scheduler = Scheduler::new(
            engine(),
            Arc::new(provider),
            state.clone(),
            Duration::from_secs(1),
        );

        scheduler.run_cycle();
        scheduler.run_cycle();

        let snap = state.snapshot();
        assert_eq!(snap.sequence, 2);
        assert_eq!(snap.observer, first);
        assert!(state.is_live_location());
    }

    #[test]
    fn test_logger_receives_every_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(ResultLogger::start(dir.path().join("cycles.csv")).unwrap());
        let observer = Observer::new(-33.87, 151.21, 58.0);
        let state = Arc::new(SharedState::new(observer));

        let mut scheduler = Scheduler::new(
            engine(),
            Arc::new(StaticLocationProvider::new(observer)),
            state,
            Duration::from_secs(1),
        )
        .with_logger(logger.clone());

        for _ in 0..3 {
            scheduler.run_cycle();
        }
        assert_eq!(logger.stop().unwrap(), 150);
    }

    #[test]
    fn test_spawn_stops_promptly() {
        let observer = Observer::new(0.0, 0.0, 0.0);
        let state = Arc::new(SharedState::new(observer));
        let scheduler = Scheduler::new(
            engine(),
            Arc::new(StaticLocationProvider::new(observer)),
            state.clone(),
            Duration::from_secs(60),
        );

        let handle = scheduler.spawn().unwrap();
        let start = Instant::now();
        while state.snapshot().sequence == 0 && start.elapsed() < Duration::from_secs(10) {
            thread::sleep(Duration::from_millis(5));
        }

        let stop_requested = Instant::now();
        handle.stop().unwrap();
        assert!(stop_requested.elapsed() < Duration::from_secs(5));
        assert_eq!(state.snapshot().sequence, 1);
    }
}
