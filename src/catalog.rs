//! # Star catalog
//!
//! [`Star`] is the immutable catalog record consumed by the engine. Catalogs are supplied
//! through the [`CatalogSource`] capability; [`BrightStars`] ships the fifty brightest stars
//! (J2000 positions, no space motion).
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, MilliArcSec};
use crate::zenith_errors::ZenithError;

/// Per-field quality letters as published by the source catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    pub coordinates: Option<char>,
    pub proper_motion: Option<char>,
    pub parallax: Option<char>,
    pub radial_velocity: Option<char>,
}

/// A catalog star, positions referred to the ICRS at epoch J2000.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Display name
    pub name: String,
    /// Source catalog designation (e.g. "HIP")
    pub catalog: String,
    /// Identifier within the source catalog
    pub catalog_id: i64,
    /// Right ascension in degrees
    pub ra: Degree,
    /// Declination in degrees
    pub dec: Degree,
    /// Proper motion in right ascension, μα·cos δ, in mas/yr
    pub pm_ra: MilliArcSec,
    /// Proper motion in declination in mas/yr
    pub pm_dec: MilliArcSec,
    /// Annual parallax in mas
    pub parallax: MilliArcSec,
    /// Radial velocity in km/s, positive receding
    pub radial_velocity: f64,
    pub quality: QualityFlags,
}

impl Star {
    /// A star with position only: no space motion, no parallax.
    pub fn new(name: impl Into<String>, ra: Degree, dec: Degree) -> Self {
        Star {
            name: name.into(),
            catalog: String::new(),
            catalog_id: 0,
            ra,
            dec,
            pm_ra: 0.0,
            pm_dec: 0.0,
            parallax: 0.0,
            radial_velocity: 0.0,
            quality: QualityFlags::default(),
        }
    }

    pub fn with_catalog_id(mut self, catalog: impl Into<String>, catalog_id: i64) -> Self {
        self.catalog = catalog.into();
        self.catalog_id = catalog_id;
        self
    }

    /// Set proper motion (mas/yr), parallax (mas) and radial velocity (km/s).
    pub fn with_space_motion(
        mut self,
        pm_ra: MilliArcSec,
        pm_dec: MilliArcSec,
        parallax: MilliArcSec,
        radial_velocity: f64,
    ) -> Self {
        self.pm_ra = pm_ra;
        self.pm_dec = pm_dec;
        self.parallax = parallax;
        self.radial_velocity = radial_velocity;
        self
    }
}

/// Something able to produce a list of stars.
pub trait CatalogSource {
    fn stars(&self) -> Result<Vec<Star>, ZenithError>;
}

impl CatalogSource for Vec<Star> {
    fn stars(&self) -> Result<Vec<Star>, ZenithError> {
        Ok(self.clone())
    }
}

impl CatalogSource for [Star] {
    fn stars(&self) -> Result<Vec<Star>, ZenithError> {
        Ok(self.to_vec())
    }
}

/// The fifty brightest stars, J2000 right ascension and declination in degrees.
const BRIGHT_STARS: [(&str, Degree, Degree); 50] = [
    ("Sirius", 101.287, -16.716),
    ("Canopus", 95.988, -52.696),
    ("Rigil Kentaurus", 219.902, -60.833),
    ("Arcturus", 213.915, 19.182),
    ("Vega", 279.235, 38.784),
    ("Capella", 79.172, 45.998),
    ("Rigel", 78.634, -8.202),
    ("Procyon", 114.825, 5.225),
    ("Achernar", 24.429, -57.237),
    ("Betelgeuse", 88.793, 7.407),
    ("Hadar", 210.951, -60.373),
    ("Altair", 297.696, 8.868),
    ("Acrux", 186.649, -63.099),
    ("Aldebaran", 68.98, 16.509),
    ("Antares", 247.352, -26.432),
    ("Spica", 201.298, -11.161),
    ("Pollux", 116.329, 28.026),
    ("Fomalhaut", 344.413, -29.622),
    ("Deneb", 310.358, 45.28),
    ("Mimosa", 191.93, -59.689),
    ("Regulus", 152.093, 11.967),
    ("Adhara", 104.656, -28.972),
    ("Castor", 113.65, 31.888),
    ("Gacrux", 187.791, -57.113),
    ("Shaula", 263.402, -37.103),
    ("Bellatrix", 81.283, 6.349),
    ("Elnath", 81.573, 28.608),
    ("Miaplacidus", 138.3, -69.717),
    ("Alnilam", 84.053, -1.202),
    ("Alnair", 332.058, -46.961),
    ("Alnitak", 85.19, -1.943),
    ("Alioth", 193.507, 55.959),
    ("Dubhe", 165.93, 61.751),
    ("Mirfak", 51.081, 49.857),
    ("Wezen", 106.381, -26.393),
    ("Kaus Australis", 276.191, -34.385),
    ("Avior", 125.628, -59.513),
    ("Alkaid", 206.885, 49.313),
    ("Sargas", 264.33, -42.998),
    ("Menkalinan", 89.867, 44.947),
    ("Atria", 252.166, -69.028),
    ("Alhena", 99.428, 16.399),
    ("Peacock", 306.412, -56.735),
    ("Alsephina", 137.047, -47.343),
    ("Mirzam", 95.675, -17.956),
    ("Alphard", 141.897, -8.658),
    ("Polaris", 37.946, 89.264),
    ("Hamal", 31.681, 23.462),
    ("Algieba", 154.993, 19.842),
    ("Diphda", 10.897, -17.986),
];

/// Built-in catalog of the fifty brightest stars.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrightStars;

impl CatalogSource for BrightStars {
    fn stars(&self) -> Result<Vec<Star>, ZenithError> {
        Ok(BRIGHT_STARS
            .iter()
            .enumerate()
            .map(|(rank, &(name, ra, dec))| {
                Star::new(name, ra, dec).with_catalog_id("BRIGHT", rank as i64 + 1)
            })
            .collect())
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_bright_stars() {
        let stars = BrightStars.stars().unwrap();
        assert_eq!(stars.len(), 50);
        assert!(stars.iter().map(|s| &s.name).all_unique());

        let polaris = stars.iter().find(|s| s.name == "Polaris").unwrap();
        assert_eq!(polaris.ra, 37.946);
        assert_eq!(polaris.dec, 89.264);
        assert_eq!(polaris.catalog, "BRIGHT");
        assert_eq!(polaris.catalog_id, 47);
    }

    #[test]
    fn test_catalog_ranges() {
        for star in BrightStars.stars().unwrap() {
            assert!((0.0..360.0).contains(&star.ra), "{}", star.name);
            assert!((-90.0..=90.0).contains(&star.dec), "{}", star.name);
        }
    }

    #[test]
    fn test_vec_source() {
        let stars = vec![Star::new("Vega", 279.235, 38.784).with_space_motion(
            200.94, 286.23, 130.23, -13.5,
        )];
        let loaded = stars.stars().unwrap();
        assert_eq!(loaded, stars);
        assert_eq!(loaded[0].parallax, 130.23);
        assert_eq!(loaded[0].quality, QualityFlags::default());
    }
}
