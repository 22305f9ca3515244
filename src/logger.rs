//! # CSV result logger
//!
//! Queue semantics: [`ResultLogger::log`] only enqueues and never blocks the producer; a
//! dedicated writer thread drains the queue to CSV. [`ResultLogger::stop`] closes the queue
//! and joins the writer once every queued entry has been written, so entries are neither
//! dropped nor duplicated.
//!
//! File layout, one row per star per logged cycle:
//!
//! ```text
//! Time,Latitude,Longitude,Altitude,Star,Elevation,Azimuth,ZenithDist
//! 2024-06-21 08:47:00,37.774900,-122.419400,16.00,Vega,88.9612,12.3456,1.0388
//! ```
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use crate::engine::CelestialResult;
use crate::observers::Observer;
use crate::zenith_errors::ZenithError;

const HEADER: [&str; 8] = [
    "Time",
    "Latitude",
    "Longitude",
    "Altitude",
    "Star",
    "Elevation",
    "Azimuth",
    "ZenithDist",
];

#[derive(Debug)]
struct LogEntry {
    time: DateTime<Utc>,
    observer: Observer,
    results: Vec<CelestialResult>,
}

/// Default log file name for a start instant: `zenith_log_YYYYMMDD_HHMMSS.csv`.
pub fn log_file_name(start: &DateTime<Utc>) -> String {
    format!("zenith_log_{}.csv", start.format("%Y%m%d_%H%M%S"))
}

/// Asynchronous CSV logger of star results.
#[derive(Debug)]
pub struct ResultLogger {
    sender: RwLock<Option<UnboundedSender<LogEntry>>>,
    writer: Mutex<Option<JoinHandle<Result<u64, ZenithError>>>>,
    path: Option<PathBuf>,
}

impl ResultLogger {
    /// Create (truncate) `path` and start the writer thread.
    pub fn start(path: impl AsRef<Path>) -> Result<Self, ZenithError> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::create(&path)?;
        let mut logger = Self::with_writer(file)?;
        info!(path = %path.display(), "result logging started");
        logger.path = Some(path);
        Ok(logger)
    }

    /// Start logging to a timestamped file inside `dir`, creating the directory if needed.
    pub fn start_in_dir(dir: impl AsRef<Path>) -> Result<Self, ZenithError> {
        fs::create_dir_all(dir.as_ref())?;
        Self::start(dir.as_ref().join(log_file_name(&Utc::now())))
    }

    /// Start logging to an arbitrary sink.
    pub fn with_writer<W: Write + Send + 'static>(sink: W) -> Result<Self, ZenithError> {
        let (sender, receiver) = unbounded_channel();
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);

        let handle = thread::Builder::new()
            .name("zenith-logger".into())
            .spawn(move || {
                let written = write_loop(receiver, writer);
                if let Err(err) = &written {
                    error!(%err, "result logger stopped on error");
                }
                written
            })?;

        Ok(ResultLogger {
            sender: RwLock::new(Some(sender)),
            writer: Mutex::new(Some(handle)),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Enqueue one cycle's results. Never blocks; ignored once stopped.
    pub fn log(&self, observer: &Observer, results: &[CelestialResult]) {
        let entry = LogEntry {
            time: Utc::now(),
            observer: *observer,
            results: results.to_vec(),
        };

        if let Some(sender) = self.sender.read().as_ref() {
            if sender.send(entry).is_err() {
                debug!("result logger writer is gone, entry discarded");
            }
        }
    }

    /// Close the queue, wait for the writer to drain it and return the number of rows written.
    ///
    /// Errors
    /// ------
    /// * [`ZenithError::LoggerStopped`] if the logger was already stopped.
    /// * Any I/O or CSV error the writer hit.
    pub fn stop(&self) -> Result<u64, ZenithError> {
        let sender = self.sender.write().take();
        let handle = self.writer.lock().take();

        match (sender, handle) {
            (_, None) => Err(ZenithError::LoggerStopped),
            (sender, Some(handle)) => {
                drop(sender);
                let rows = handle
                    .join()
                    .map_err(|_| ZenithError::WorkerPanicked("zenith-logger".into()))??;
                info!(rows, "result logging stopped");
                Ok(rows)
            }
        }
    }
}

impl Drop for ResultLogger {
    fn drop(&mut self) {
        if self.writer.get_mut().is_some() {
            if let Err(err) = self.stop() {
                error!(%err, "result logger failed while stopping");
            }
        }
    }
}

fn write_loop<W: Write>(
    mut receiver: UnboundedReceiver<LogEntry>,
    mut writer: csv::Writer<W>,
) -> Result<u64, ZenithError> {
    writer.write_record(HEADER)?;
    writer.flush()?;

    let mut rows = 0u64;
    while let Some(entry) = receiver.blocking_recv() {
        let time = entry.time.format("%Y-%m-%d %H:%M:%S").to_string();
        let latitude = format!("{:.6}", entry.observer.latitude);
        let longitude = format!("{:.6}", entry.observer.longitude);
        let altitude = format!("{:.2}", entry.observer.altitude);

        for result in &entry.results {
            let elevation = format!("{:.4}", result.elevation);
            let azimuth = format!("{:.4}", result.azimuth);
            let zenith_distance = format!("{:.4}", result.zenith_distance);
            writer.write_record([
                time.as_str(),
                latitude.as_str(),
                longitude.as_str(),
                altitude.as_str(),
                result.name.as_str(),
                elevation.as_str(),
                azimuth.as_str(),
                zenith_distance.as_str(),
            ])?;
            rows += 1;
        }
        writer.flush()?;
    }

    Ok(rows)
}

#[cfg(test)]
mod logger_test {
    use super::*;
    use chrono::TimeZone;

    fn results(k: usize) -> Vec<CelestialResult> {
        (0..k)
            .map(|i| CelestialResult {
                name: format!("Star {i}"),
                elevation: 45.0 + i as f64,
                azimuth: 123.456789,
                zenith_distance: 45.0 - i as f64,
                is_rising: false,
            })
            .collect()
    }

    #[test]
    fn test_log_file_name() {
        let start = Utc.with_ymd_and_hms(2024, 6, 21, 8, 47, 5).unwrap();
        assert_eq!(log_file_name(&start), "zenith_log_20240621_084705.csv");
    }

    #[test]
    fn test_every_entry_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ResultLogger::start_in_dir(dir.path()).unwrap();
        let path = logger.path().unwrap().to_path_buf();
        let observer = Observer::new(37.7749, -122.4194, 16.0);

        for _ in 0..50 {
            logger.log(&observer, &results(3));
        }
        assert_eq!(logger.stop().unwrap(), 150);

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 151);
        assert_eq!(
            lines[0],
            "Time,Latitude,Longitude,Altitude,Star,Elevation,Azimuth,ZenithDist"
        );
        assert!(lines[1].ends_with(",37.774900,-122.419400,16.00,Star 0,45.0000,123.4568,45.0000"));
    }

    #[test]
    fn test_log_after_stop_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let logger = ResultLogger::start(&path).unwrap();
        let observer = Observer::new(0.0, 0.0, 0.0);

        logger.log(&observer, &results(2));
        assert_eq!(logger.stop().unwrap(), 2);
        assert!(!logger.is_running());

        logger.log(&observer, &results(2));
        assert_eq!(logger.stop(), Err(ZenithError::LoggerStopped));

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_drop_drains_queue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drop.csv");
        {
            let logger = ResultLogger::start(&path).unwrap();
            for _ in 0..10 {
                logger.log(&Observer::new(1.0, 2.0, 3.0), &results(1));
            }
        }
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 11);
    }
}
