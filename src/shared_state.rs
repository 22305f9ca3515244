//! # Shared result state
//!
//! One producer publishes immutable [`ResultSnapshot`]s; any number of consumers read them.
//!
//! - The snapshot bundles the observer with the results computed for it, so a reader can never
//!   pair one cycle's observer with another cycle's results.
//! - Publishing swaps an `Arc` under the write lock; readers hold the read lock only long enough
//!   to clone that `Arc`. Nobody computes or formats under the lock.
//! - Consumers may skip snapshots: the latest one wins.
//!
//! The running flag and a wake-up condition variable let [`SharedState::request_shutdown`]
//! interrupt the producer's inter-cycle wait immediately.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex, RwLock};
use serde::Serialize;

use crate::engine::{CelestialResult, SolarBody};
use crate::observers::Observer;

/// Everything one scheduler cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSnapshot {
    pub observer: Observer,
    pub stars: Vec<CelestialResult>,
    pub solar_bodies: Vec<SolarBody>,
    pub computed_at: DateTime<Utc>,
    /// 0 for the initial empty snapshot, then one per publish
    pub sequence: u64,
}

impl ResultSnapshot {
    /// The snapshot visible before the first cycle completes.
    pub fn empty(observer: Observer) -> Self {
        ResultSnapshot {
            observer,
            stars: Vec::new(),
            solar_bodies: Vec::new(),
            computed_at: DateTime::<Utc>::UNIX_EPOCH,
            sequence: 0,
        }
    }
}

#[derive(Debug)]
pub struct SharedState {
    current: RwLock<Arc<ResultSnapshot>>,
    running: AtomicBool,
    live_location: AtomicBool,
    wake: Mutex<()>,
    wake_signal: Condvar,
}

impl SharedState {
    pub fn new(initial_observer: Observer) -> Self {
        SharedState {
            current: RwLock::new(Arc::new(ResultSnapshot::empty(initial_observer))),
            running: AtomicBool::new(true),
            live_location: AtomicBool::new(false),
            wake: Mutex::new(()),
            wake_signal: Condvar::new(),
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<ResultSnapshot> {
        self.current.read().clone()
    }

    /// Replace the current snapshot.
    pub(crate) fn publish(&self, snapshot: Arc<ResultSnapshot>) {
        let previous = std::mem::replace(&mut *self.current.write(), snapshot);
        // the old snapshot may be the last reference: free it outside the lock
        drop(previous);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether the current observer comes from a live location source.
    pub fn is_live_location(&self) -> bool {
        self.live_location.load(Ordering::Relaxed)
    }

    pub(crate) fn set_live_location(&self, live: bool) {
        self.live_location.store(live, Ordering::Relaxed);
    }

    /// Clear the running flag and wake every waiter.
    pub fn request_shutdown(&self) {
        let _guard = self.wake.lock();
        self.running.store(false, Ordering::Release);
        self.wake_signal.notify_all();
    }

    /// Sleep up to `timeout`, returning early on shutdown.
    ///
    /// Returns `true` when shutdown has been requested.
    pub fn wait_for_shutdown(&self, timeout: Duration) -> bool {
        let mut guard = self.wake.lock();
        if !self.is_running() {
            return true;
        }
        // spurious wake-ups only shorten one cycle
        self.wake_signal.wait_for(&mut guard, timeout);
        !self.is_running()
    }
}

#[cfg(test)]
mod shared_state_test {
    use super::*;
    use std::thread;
    use std::time::Instant;

    fn snapshot(sequence: u64) -> ResultSnapshot {
        // latitude encodes the sequence so a torn read would be visible
        ResultSnapshot {
            observer: Observer::new(sequence as f64 / 1000.0, 0.0, 0.0),
            stars: vec![
                CelestialResult {
                    name: format!("star-{sequence}"),
                    elevation: 10.0,
                    azimuth: 90.0,
                    zenith_distance: 80.0,
                    is_rising: true,
                };
                3
            ],
            solar_bodies: Vec::new(),
            computed_at: Utc::now(),
            sequence,
        }
    }

    #[test]
    fn test_initial_snapshot_is_empty() {
        let state = SharedState::new(Observer::new(1.0, 2.0, 3.0));
        let snap = state.snapshot();
        assert_eq!(snap.sequence, 0);
        assert!(snap.stars.is_empty());
        assert_eq!(snap.observer, Observer::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_never_torn() {
        let state = Arc::new(SharedState::new(Observer::new(0.0, 0.0, 0.0)));

        let writer = {
            let state = state.clone();
            thread::spawn(move || {
                for sequence in 1..=100 {
                    state.publish(Arc::new(snapshot(sequence)));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..1000 {
                        let snap = state.snapshot();
                        let seq = snap.sequence;
                        assert!(seq >= last, "sequence went backwards");
                        last = seq;
                        if seq > 0 {
                            assert_eq!(snap.observer.latitude, seq as f64 / 1000.0);
                            assert!(snap.stars.iter().all(|s| s.name == format!("star-{seq}")));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(state.snapshot().sequence, 100);
    }

    #[test]
    fn test_shutdown_interrupts_wait() {
        let state = Arc::new(SharedState::new(Observer::new(0.0, 0.0, 0.0)));
        let waiter = {
            let state = state.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let stopped = state.wait_for_shutdown(Duration::from_secs(30));
                (stopped, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(50));
        state.request_shutdown();

        let (stopped, elapsed) = waiter.join().unwrap();
        assert!(stopped);
        assert!(elapsed < Duration::from_secs(5));
        assert!(!state.is_running());
        assert!(state.wait_for_shutdown(Duration::from_secs(30)));
    }

    #[test]
    fn test_wait_times_out_while_running() {
        let state = SharedState::new(Observer::new(0.0, 0.0, 0.0));
        assert!(!state.wait_for_shutdown(Duration::from_millis(10)));
        assert!(state.is_running());
    }
}
