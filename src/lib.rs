pub mod astrometry;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod display;
pub mod engine;
pub mod ephemeris;
pub mod logger;
pub mod observers;
mod ref_system;
pub mod scheduler;
pub mod shared_state;
pub mod time;
pub mod zenith_errors;

pub use engine::{CelestialResult, PositionEngine, RisingCriterion, SolarBody};
pub use observers::Observer;
pub use zenith_errors::ZenithError;
