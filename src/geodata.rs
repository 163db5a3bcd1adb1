//! ZIP coordinates and heatmap layer data.
//!
//! Coordinates come from an offline GeoNames postal-code dump (`US.txt`):
//! tab-separated, no header, postal code in column 2, latitude and longitude
//! in columns 10 and 11.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use tracing::{debug, info, warn};

use crate::workload::aggregate::ranked;
use crate::workload::utility::mean;

const POSTAL_CODE_COLUMN: usize = 1;
const LATITUDE_COLUMN: usize = 9;
const LONGITUDE_COLUMN: usize = 10;

/// Blue-green ramp from low to high workload.
pub const COLOR_RANGE: [[u8; 3]; 5] = [
    [255, 255, 204],
    [161, 218, 180],
    [65, 182, 196],
    [44, 127, 184],
    [37, 52, 148],
];

pub const RADIUS_PIXELS: u32 = 30;
pub const DEFAULT_ZOOM: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Postal code to coordinate lookup.
#[derive(Debug, Default)]
pub struct ZipGazetteer {
    entries: HashMap<String, Coordinates>,
}

impl ZipGazetteer {
    /// Loads a GeoNames postal-code dump from `path`.
    #[tracing::instrument]
    pub fn load(path: &str) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open gazetteer {}", path))?;
        let gazetteer =
            Self::from_reader(file).with_context(|| format!("failed to read gazetteer {}", path))?;
        info!(entries = gazetteer.len(), "Gazetteer loaded");
        Ok(gazetteer)
    }

    /// Parses GeoNames rows. Rows without usable coordinates are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let record = result?;
            let parsed = (
                record.get(POSTAL_CODE_COLUMN).map(str::trim),
                parse_coord(record.get(LATITUDE_COLUMN)),
                parse_coord(record.get(LONGITUDE_COLUMN)),
            );
            match parsed {
                (Some(code), Some(lat), Some(lon)) if !code.is_empty() => {
                    entries.insert(code.to_string(), Coordinates { lat, lon });
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "Gazetteer rows without coordinates skipped");
        }

        Ok(ZipGazetteer { entries })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Coordinates)>) -> Self {
        ZipGazetteer {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn lookup(&self, zip_code: &str) -> Option<Coordinates> {
        self.entries.get(zip_code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_coord(field: Option<&str>) -> Option<f64> {
    field
        .map(str::trim)
        .and_then(|f| f.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// A weighted heatmap point for one ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub zip_code: String,
    pub lat: f64,
    pub lon: f64,
    pub estimated_stops: u64,
}

/// Initial camera for the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

/// Heatmap layer ready to be handed to a map renderer.
#[derive(Debug, Serialize)]
pub struct HeatmapLayer {
    pub generated_at: DateTime<Utc>,
    pub radius_pixels: u32,
    pub aggregation: &'static str,
    pub color_range: [[u8; 3]; 5],
    pub view_state: Option<ViewState>,
    pub points: Vec<HeatPoint>,
    /// ZIP codes with no known coordinates. Still present in tabular views.
    pub missing: Vec<String>,
}

/// Joins ZIP totals with coordinates. ZIPs that cannot be located are listed
/// in [`HeatmapLayer::missing`] rather than plotted.
pub fn build_heatmap(zip_totals: &HashMap<String, u64>, gazetteer: &ZipGazetteer) -> HeatmapLayer {
    let mut points = Vec::new();
    let mut missing = Vec::new();

    for (zip_code, estimated_stops) in ranked(zip_totals) {
        match gazetteer.lookup(&zip_code) {
            Some(c) => points.push(HeatPoint {
                zip_code,
                lat: c.lat,
                lon: c.lon,
                estimated_stops,
            }),
            None => missing.push(zip_code),
        }
    }

    if !missing.is_empty() {
        warn!(
            missing = missing.len(),
            "ZIP codes without coordinates left off the heatmap"
        );
    }

    let view_state = if points.is_empty() {
        None
    } else {
        let lats: Vec<f64> = points.iter().map(|p| p.lat).collect();
        let lons: Vec<f64> = points.iter().map(|p| p.lon).collect();
        Some(ViewState {
            latitude: mean(&lats),
            longitude: mean(&lons),
            zoom: DEFAULT_ZOOM,
            pitch: 0.0,
        })
    };

    missing.sort();

    HeatmapLayer {
        generated_at: Utc::now(),
        radius_pixels: RADIUS_PIXELS,
        aggregation: "SUM",
        color_range: COLOR_RANGE,
        view_state,
        points,
        missing,
    }
}
