//! # Text rendering of a result snapshot
//!
//! [`SnapshotDisplay`] borrows a [`ResultSnapshot`] and renders it through `{}`:
//!
//! - a status line (observer, location source, logging flag, computation time),
//! - the stars closest to the zenith (at most [`DEFAULT_STAR_ROWS`]),
//! - the solar-system bodies down to [`TWILIGHT_LIMIT`] degrees of elevation.
//!
//! Tables use `comfy-table` with the `UTF8_FULL` preset. Nothing is cloned; the renderer only
//! builds the transient strings of each row.
//!
//! ```rust,ignore
//! let snap = state.snapshot();
//! println!("{}", SnapshotDisplay::new(&snap).with_live_location(state.is_live_location()));
//! ```
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::constants::Degree;
use crate::shared_state::ResultSnapshot;

pub const DEFAULT_STAR_ROWS: usize = 16;

/// Bodies below nautical twilight depth are not shown.
pub const TWILIGHT_LIMIT: Degree = -12.0;

const EMPTY_SKY: &str = "no objects above horizon";

#[derive(Debug, Clone, Copy)]
pub struct SnapshotDisplay<'a> {
    snapshot: &'a ResultSnapshot,
    star_rows: usize,
    live_location: bool,
    logging: bool,
}

impl<'a> SnapshotDisplay<'a> {
    pub fn new(snapshot: &'a ResultSnapshot) -> Self {
        SnapshotDisplay {
            snapshot,
            star_rows: DEFAULT_STAR_ROWS,
            live_location: false,
            logging: false,
        }
    }

    pub fn with_star_rows(mut self, rows: usize) -> Self {
        self.star_rows = rows;
        self
    }

    pub fn with_live_location(mut self, live: bool) -> Self {
        self.live_location = live;
        self
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    fn status_line(&self) -> String {
        let snap = self.snapshot;
        let source = if self.live_location { "live" } else { "manual" };
        let logging = if self.logging { "on" } else { "off" };
        let computed = if snap.sequence == 0 {
            "pending".to_string()
        } else {
            snap.computed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
        };
        format!(
            "{} ({source}) | logging {logging} | {computed} | cycle {}",
            snap.observer, snap.sequence
        )
    }

    fn star_table(&self) -> Option<Table> {
        let stars = &self.snapshot.stars;
        if stars.is_empty() {
            return None;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("#"),
            Cell::new("Star"),
            Cell::new("Elev [°]"),
            Cell::new("Az [°]"),
            Cell::new("Zenith dist [°]"),
            Cell::new(""),
        ]);

        for (i, star) in stars.iter().take(self.star_rows).enumerate() {
            table.add_row(Row::from(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(&star.name),
                Cell::new(format!("{:.2}", star.elevation)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", star.azimuth)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", star.zenith_distance))
                    .set_alignment(CellAlignment::Right),
                Cell::new(rising_mark(star.is_rising)),
            ]));
        }
        Some(table)
    }

    fn solar_table(&self) -> Option<Table> {
        let mut visible = self
            .snapshot
            .solar_bodies
            .iter()
            .filter(|b| b.elevation >= TWILIGHT_LIMIT)
            .peekable();
        visible.peek()?;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Body"),
            Cell::new("Elev [°]"),
            Cell::new("Az [°]"),
            Cell::new("Distance [AU]"),
            Cell::new(""),
        ]);

        for body in visible {
            table.add_row(Row::from(vec![
                Cell::new(&body.name),
                Cell::new(format!("{:.2}", body.elevation)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", body.azimuth)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", body.distance_au)).set_alignment(CellAlignment::Right),
                Cell::new(rising_mark(body.is_rising)),
            ]));
        }
        Some(table)
    }
}

fn rising_mark(rising: bool) -> &'static str {
    if rising {
        "↑"
    } else {
        "↓"
    }
}

impl fmt::Display for SnapshotDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status_line())?;

        let stars = self.star_table();
        let solar = self.solar_table();
        if stars.is_none() && solar.is_none() {
            return writeln!(f, "{EMPTY_SKY}");
        }

        if let Some(table) = stars {
            writeln!(f, "{table}")?;
        }
        if let Some(table) = solar {
            writeln!(f, "{table}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod display_test {
    use super::*;
    use crate::engine::{CelestialResult, SolarBody};
    use crate::ephemeris::Body;
    use crate::observers::Observer;
    use chrono::{TimeZone, Utc};

    fn star(i: usize) -> CelestialResult {
        CelestialResult {
            name: format!("Star{i:02}"),
            elevation: 89.0 - i as f64,
            azimuth: 10.0 * i as f64,
            zenith_distance: 1.0 + i as f64,
            is_rising: i % 2 == 0,
        }
    }

    fn body(body: Body, elevation: f64) -> SolarBody {
        SolarBody {
            body,
            name: body.name().to_string(),
            elevation,
            azimuth: 100.0,
            zenith_distance: 90.0 - elevation,
            is_rising: true,
            distance_au: 1.0,
        }
    }

    fn snapshot(stars: usize, bodies: Vec<SolarBody>) -> ResultSnapshot {
        ResultSnapshot {
            observer: Observer::new(37.7749, -122.4194, 16.0),
            stars: (0..stars).map(star).collect(),
            solar_bodies: bodies,
            computed_at: Utc.with_ymd_and_hms(2024, 6, 21, 8, 47, 0).unwrap(),
            sequence: 3,
        }
    }

    #[test]
    fn test_star_rows_are_capped() {
        let snap = snapshot(30, vec![]);
        let out = SnapshotDisplay::new(&snap).to_string();

        assert!(out.contains("Star00"));
        assert!(out.contains("Star15"));
        assert!(!out.contains("Star16"));
        assert!(!out.contains(EMPTY_SKY));

        let out = SnapshotDisplay::new(&snap).with_star_rows(3).to_string();
        assert!(out.contains("Star02"));
        assert!(!out.contains("Star03"));
    }

    #[test]
    fn test_bodies_below_twilight_are_hidden() {
        let snap = snapshot(
            0,
            vec![body(Body::Sun, -5.0), body(Body::Moon, -12.5), body(Body::Mars, 30.0)],
        );
        let out = SnapshotDisplay::new(&snap).to_string();

        assert!(out.contains("Sun"));
        assert!(out.contains("Mars"));
        assert!(!out.contains("Moon"));
    }

    #[test]
    fn test_empty_sky() {
        let snap = snapshot(0, vec![body(Body::Sun, -40.0)]);
        let out = SnapshotDisplay::new(&snap).to_string();
        assert!(out.contains(EMPTY_SKY));
    }

    #[test]
    fn test_status_line() {
        let snap = snapshot(1, vec![]);
        let out = SnapshotDisplay::new(&snap)
            .with_live_location(true)
            .with_logging(true)
            .to_string();
        let first = out.lines().next().unwrap();

        assert!(first.contains("(live)"));
        assert!(first.contains("logging on"));
        assert!(first.contains("2024-06-21 08:47:00 UTC"));
        assert!(first.contains("cycle 3"));

        let pending = ResultSnapshot::empty(Observer::new(0.0, 0.0, 0.0));
        let out = SnapshotDisplay::new(&pending).to_string();
        assert!(out.contains("(manual)"));
        assert!(out.contains("pending"));
    }
}
