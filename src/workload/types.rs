//! Data types shared by the workload pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single row of the route dataset.
///
/// `zip_codes` keeps the raw whitespace-separated string exactly as it was
/// read; zone classification runs against that raw text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteRecord {
    pub route_code: String,
    #[serde(default)]
    pub zip_codes: String,
    pub estimated_stops_per_day: u32,
}

impl RouteRecord {
    pub fn new(route_code: &str, zip_codes: &str, estimated_stops_per_day: u32) -> Self {
        RouteRecord {
            route_code: route_code.to_string(),
            zip_codes: zip_codes.to_string(),
            estimated_stops_per_day,
        }
    }

    /// Every whitespace-separated token of `zip_codes`, valid or not.
    pub fn zip_tokens(&self) -> impl Iterator<Item = &str> {
        self.zip_codes.split_whitespace()
    }

    /// Tokens that are exactly five ASCII digits.
    pub fn valid_zips(&self) -> impl Iterator<Item = &str> {
        self.zip_tokens()
            .filter(|t| crate::workload::explode::is_valid_zip(t))
    }
}

/// One route expanded to one of its ZIP codes. Carries the route's full stop
/// count, not a share of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipRecord {
    pub route_code: String,
    pub zip_code: String,
    pub estimated_stops: u32,
}

/// Coarse area label derived from a route's ZIP codes.
///
/// Variants are declared alphabetically so that sorting zones matches sorting
/// their display names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Zone {
    #[serde(rename = "Mixed")]
    Mixed,
    #[serde(rename = "Other Rural Areas")]
    OtherRuralAreas,
    #[serde(rename = "Philly Core")]
    PhillyCore,
    #[serde(rename = "Suburbs")]
    Suburbs,
}

impl Zone {
    pub const ALL: [Zone; 4] = [
        Zone::Mixed,
        Zone::OtherRuralAreas,
        Zone::PhillyCore,
        Zone::Suburbs,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Mixed => "Mixed",
            Zone::OtherRuralAreas => "Other Rural Areas",
            Zone::PhillyCore => "Philly Core",
            Zone::Suburbs => "Suburbs",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
