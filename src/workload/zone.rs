//! Zone classification of routes.
//!
//! The default rules check for the area-code patterns `"191"` (Philly Core)
//! and `"190"` (Suburbs) anywhere in the raw ZIP string, so a ZIP such as
//! `19910` also counts as core. [`ZoneMatching::Prefix`] restricts the check
//! to the leading digits of validated ZIP codes.

use crate::workload::explode::is_valid_zip;
use crate::workload::types::Zone;
use serde::{Deserialize, Serialize};

/// How zone patterns are matched against a route's ZIP codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMatching {
    /// Pattern may occur anywhere in the raw `zip_codes` string.
    #[default]
    Substring,
    /// Pattern must be the prefix of a valid 5-digit ZIP.
    Prefix,
}

/// Patterns and matching mode used to derive a [`Zone`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRules {
    pub matching: ZoneMatching,
    pub core_prefixes: Vec<String>,
    pub suburb_prefixes: Vec<String>,
}

impl Default for ZoneRules {
    fn default() -> Self {
        ZoneRules {
            matching: ZoneMatching::Substring,
            core_prefixes: vec!["191".to_string()],
            suburb_prefixes: vec!["190".to_string()],
        }
    }
}

impl ZoneRules {
    pub fn with_matching(mut self, matching: ZoneMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Classifies a raw `zip_codes` string. Total over all inputs.
    pub fn classify(&self, zip_codes: &str) -> Zone {
        let (core, suburb) = match self.matching {
            ZoneMatching::Substring => (
                contains_any(zip_codes, &self.core_prefixes),
                contains_any(zip_codes, &self.suburb_prefixes),
            ),
            ZoneMatching::Prefix => {
                let zips: Vec<&str> = zip_codes
                    .split_whitespace()
                    .filter(|t| is_valid_zip(t))
                    .collect();
                (
                    starts_with_any(&zips, &self.core_prefixes),
                    starts_with_any(&zips, &self.suburb_prefixes),
                )
            }
        };

        zone_from_matches(core, suburb)
    }
}

/// Classifies with the default substring rules.
pub fn classify_zone(zip_codes: &str) -> Zone {
    ZoneRules::default().classify(zip_codes)
}

fn zone_from_matches(core: bool, suburb: bool) -> Zone {
    match (core, suburb) {
        (true, true) => Zone::Mixed,
        (true, false) => Zone::PhillyCore,
        (false, true) => Zone::Suburbs,
        (false, false) => Zone::OtherRuralAreas,
    }
}

fn contains_any(haystack: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| !p.is_empty() && haystack.contains(p.as_str()))
}

fn starts_with_any(zips: &[&str], prefixes: &[String]) -> bool {
    zips.iter().any(|z| {
        prefixes
            .iter()
            .any(|p| !p.is_empty() && z.starts_with(p.as_str()))
    })
}
