//! Zenith terminal binary
//!
//! Continuously shows which catalog stars and solar-system bodies are closest to the zenith
//! for the configured observer.
//!
//! # Usage
//!
//! ```bash
//! zenith              # reads ./config.toml, defaults if missing
//! zenith my_site.toml
//! RUST_LOG=zenith=debug zenith
//! ```
//!
//! Ctrl-C stops the scheduler, drains the result log and writes the configuration back.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zenith::catalog::{BrightStars, CatalogSource};
use zenith::config::Config;
use zenith::display::SnapshotDisplay;
use zenith::ephemeris::MeanElementsEphemeris;
use zenith::logger::ResultLogger;
use zenith::observers::StaticLocationProvider;
use zenith::scheduler::Scheduler;
use zenith::shared_state::SharedState;
use zenith::PositionEngine;

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::load(&config_path)?;
    let observer = config.observer();
    info!(config = %config_path.display(), %observer, "starting zenith");

    let mut engine = PositionEngine::new().with_earth_orientation(config.earth_orientation());
    engine.set_catalog(&BrightStars.stars()?);
    if config.ephemeris.enabled {
        engine.set_ephemeris(Some(Box::new(MeanElementsEphemeris::new())));
    }

    let logger = if config.logging.enabled {
        match ResultLogger::start_in_dir(&config.logging.directory) {
            Ok(logger) => Some(Arc::new(logger)),
            Err(err) => {
                warn!(%err, "result logging disabled");
                None
            }
        }
    } else {
        None
    };

    let state = Arc::new(SharedState::new(observer));
    let refresh = Arc::new(Notify::new());

    let mut scheduler = Scheduler::new(
        Arc::new(engine),
        Arc::new(StaticLocationProvider::new(observer)),
        state.clone(),
        config.refresh_interval(),
    )
    .with_notifier({
        let refresh = refresh.clone();
        move || refresh.notify_one()
    });
    if let Some(logger) = &logger {
        scheduler = scheduler.with_logger(logger.clone());
    }
    let handle = scheduler.spawn()?;

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = refresh.notified() => {
                let snap = state.snapshot();
                let view = SnapshotDisplay::new(&snap)
                    .with_live_location(state.is_live_location())
                    .with_logging(logger.is_some());
                print!("\x1b[2J\x1b[H{view}");
            }
            result = &mut ctrl_c => {
                result?;
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    tokio::task::spawn_blocking(move || handle.stop()).await??;
    if let Some(logger) = logger {
        let rows = logger.stop()?;
        info!(rows, "result log closed");
    }

    let mut config = config;
    config.set_observer(&state.snapshot().observer);
    config.save(&config_path)?;
    info!(config = %config_path.display(), "configuration saved");

    Ok(())
}
