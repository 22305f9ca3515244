//! TOML configuration file support.
//!
//! ```toml
//! [observer]
//! latitude = 51.5074
//! longitude = -0.1278
//! altitude = 0.0
//!
//! [ui]
//! refresh_rate_ms = 1000
//!
//! [earth_orientation]
//! dut1 = 0.1
//! polar_x = 104.89
//! polar_y = 387.83
//!
//! [logging]
//! enabled = false
//! directory = "."
//!
//! [ephemeris]
//! enabled = true
//! ```
//!
//! Every section and key is optional; a missing file yields the defaults.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::astrometry::EarthOrientation;
use crate::observers::Observer;
use crate::zenith_errors::ZenithError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub observer: ObserverSettings,
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub earth_orientation: EarthOrientationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub ephemeris: EphemerisSettings,
}

/// Observer site, degrees and meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverSettings {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default = "default_refresh_rate_ms")]
    pub refresh_rate_ms: u64,
}

/// UT1 − UTC in seconds, polar motion in milliarcseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthOrientationSettings {
    #[serde(default = "default_dut1")]
    pub dut1: f64,
    #[serde(default = "default_polar_x")]
    pub polar_x: f64,
    #[serde(default = "default_polar_y")]
    pub polar_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSettings {
    #[serde(default = "default_ephemeris_enabled")]
    pub enabled: bool,
}

fn default_latitude() -> f64 {
    51.5074
}

fn default_longitude() -> f64 {
    -0.1278
}

fn default_refresh_rate_ms() -> u64 {
    1000
}

fn default_dut1() -> f64 {
    EarthOrientation::default().dut1
}

fn default_polar_x() -> f64 {
    EarthOrientation::default().polar_x
}

fn default_polar_y() -> f64 {
    EarthOrientation::default().polar_y
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_ephemeris_enabled() -> bool {
    true
}

impl Default for ObserverSettings {
    fn default() -> Self {
        ObserverSettings {
            latitude: default_latitude(),
            longitude: default_longitude(),
            altitude: 0.0,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        UiSettings {
            refresh_rate_ms: default_refresh_rate_ms(),
        }
    }
}

impl Default for EarthOrientationSettings {
    fn default() -> Self {
        EarthOrientationSettings {
            dut1: default_dut1(),
            polar_x: default_polar_x(),
            polar_y: default_polar_y(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            enabled: false,
            directory: default_log_directory(),
        }
    }
}

impl Default for EphemerisSettings {
    fn default() -> Self {
        EphemerisSettings {
            enabled: default_ephemeris_enabled(),
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults when `path` does not exist.
    ///
    /// # Returns
    /// * `Err(ZenithError)` if the file exists but cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ZenithError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration back as TOML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ZenithError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ZenithError> {
        let obs = &self.observer;
        if !(-90.0..=90.0).contains(&obs.latitude) {
            return Err(ZenithError::InvalidConfig(format!(
                "observer.latitude must be within [-90, 90], got {}",
                obs.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&obs.longitude) {
            return Err(ZenithError::InvalidConfig(format!(
                "observer.longitude must be within [-180, 180], got {}",
                obs.longitude
            )));
        }
        if !obs.altitude.is_finite() {
            return Err(ZenithError::InvalidConfig(
                "observer.altitude must be finite".to_string(),
            ));
        }
        if self.ui.refresh_rate_ms == 0 {
            return Err(ZenithError::InvalidConfig(
                "ui.refresh_rate_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn observer(&self) -> Observer {
        Observer::new(
            self.observer.latitude,
            self.observer.longitude,
            self.observer.altitude,
        )
    }

    pub fn set_observer(&mut self, observer: &Observer) {
        self.observer = ObserverSettings {
            latitude: observer.latitude,
            longitude: observer.longitude,
            altitude: observer.altitude,
        };
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.ui.refresh_rate_ms)
    }

    pub fn earth_orientation(&self) -> EarthOrientation {
        EarthOrientation {
            dut1: self.earth_orientation.dut1,
            polar_x: self.earth_orientation.polar_x,
            polar_y: self.earth_orientation.polar_y,
        }
    }
}
