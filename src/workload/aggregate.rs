use crate::workload::types::{RouteRecord, Zone, ZipRecord};
use crate::workload::zone::ZoneRules;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Total stops for one ZIP code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipWorkload {
    pub zip_code: String,
    pub estimated_stops: u64,
}

/// One zone's slice of the overall workload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneShare {
    pub zone: Zone,
    pub estimated_stops: u64,
    pub percent: f64,
}

/// Sums `estimated_stops` per ZIP code across every route touching it.
pub fn zip_totals(records: &[ZipRecord]) -> HashMap<String, u64> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for record in records {
        *totals.entry(record.zip_code.clone()).or_default() += u64::from(record.estimated_stops);
    }
    totals
}

/// Orders totals by value descending, keys ascending on ties.
pub fn ranked<K: Ord + Clone + Hash>(totals: &HashMap<K, u64>) -> Vec<(K, u64)> {
    let mut rows: Vec<(K, u64)> = totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// The `n` busiest ZIP codes. `n == 0` returns every ZIP.
pub fn top_zips(totals: &HashMap<String, u64>, n: usize) -> Vec<ZipWorkload> {
    let rows = ranked(totals);
    let take = if n == 0 { rows.len() } else { n };
    rows.into_iter()
        .take(take)
        .map(|(zip_code, estimated_stops)| ZipWorkload {
            zip_code,
            estimated_stops,
        })
        .collect()
}

/// Sums each route's daily stops into its zone bucket. Routes are not
/// exploded here, so every route counts once.
pub fn zone_totals(routes: &[RouteRecord], rules: &ZoneRules) -> HashMap<Zone, u64> {
    let mut totals: HashMap<Zone, u64> = HashMap::new();
    for route in routes {
        *totals.entry(rules.classify(&route.zip_codes)).or_default() +=
            u64::from(route.estimated_stops_per_day);
    }
    totals
}

/// Percentage split of zone totals, ordered by zone name. Zones with no
/// routes are omitted.
pub fn zone_shares(totals: &HashMap<Zone, u64>) -> Vec<ZoneShare> {
    let grand_total: u64 = totals.values().sum();

    let mut shares: Vec<ZoneShare> = totals
        .iter()
        .map(|(zone, stops)| ZoneShare {
            zone: *zone,
            estimated_stops: *stops,
            percent: if grand_total == 0 {
                0.0
            } else {
                *stops as f64 / grand_total as f64 * 100.0
            },
        })
        .collect();
    shares.sort_by_key(|s| s.zone);
    shares
}
