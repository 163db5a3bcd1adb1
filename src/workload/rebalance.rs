//! Even redistribution of overloaded routes across their ZIP codes.
//!
//! Each overloaded route's daily stops are floor-divided by its number of
//! valid ZIPs and that quotient is assigned to every ZIP. The remainder is
//! dropped, so a route's rebalanced total is `S - S % K`.

use crate::workload::aggregate::{ZipWorkload, top_zips};
use crate::workload::types::RouteRecord;
use crate::workload::utility::sample_stddev;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// One ZIP's share of a rebalanced route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebalancedZip {
    pub route_code: String,
    pub zip_code: String,
    pub rebalanced_stops: u32,
}

/// Why an overloaded route could not be rebalanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoValidZips,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoValidZips => f.write_str("route has no valid 5-digit ZIP codes"),
        }
    }
}

/// An overloaded route left out of rebalancing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRoute {
    pub route_code: String,
    pub estimated_stops_per_day: u32,
    pub reason: SkipReason,
}

/// Before/after totals for one rebalanced route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteComparison {
    pub route_code: String,
    pub original: u32,
    pub rebalanced: u32,
    pub improvement: u32,
}

/// Everything produced by a rebalancing run.
#[derive(Debug, Serialize)]
pub struct RebalanceOutcome {
    pub overload_threshold: u32,
    pub candidates: usize,
    #[serde(skip)]
    pub rebalanced: Vec<RebalancedZip>,
    pub skipped: Vec<SkippedRoute>,
    /// Sorted by improvement, largest first.
    pub comparison: Vec<RouteComparison>,
    pub stddev_before: Option<f64>,
    pub stddev_after: Option<f64>,
}

impl RebalanceOutcome {
    /// Sum of rebalanced stops per ZIP across all rebalanced routes.
    pub fn zip_totals(&self) -> HashMap<String, u64> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for row in &self.rebalanced {
            *totals.entry(row.zip_code.clone()).or_default() += u64::from(row.rebalanced_stops);
        }
        totals
    }

    pub fn top_zips(&self, n: usize) -> Vec<ZipWorkload> {
        top_zips(&self.zip_totals(), n)
    }
}

/// Routes strictly above `threshold`, busiest first. Ties keep input order.
pub fn overloaded_routes(routes: &[RouteRecord], threshold: u32) -> Vec<&RouteRecord> {
    let mut overloaded: Vec<&RouteRecord> = routes
        .iter()
        .filter(|r| r.estimated_stops_per_day > threshold)
        .collect();
    overloaded.sort_by(|a, b| b.estimated_stops_per_day.cmp(&a.estimated_stops_per_day));
    overloaded
}

/// Splits one route's stops evenly over its valid ZIPs.
///
/// Returns `None` for a route with no valid ZIP codes.
pub fn rebalance_route(route: &RouteRecord) -> Option<Vec<RebalancedZip>> {
    let zips: Vec<&str> = route.valid_zips().collect();
    if zips.is_empty() {
        return None;
    }
    let per_zip = route.estimated_stops_per_day / zips.len() as u32;

    Some(
        zips.into_iter()
            .map(|zip| RebalancedZip {
                route_code: route.route_code.clone(),
                zip_code: zip.to_string(),
                rebalanced_stops: per_zip,
            })
            .collect(),
    )
}

/// Rebalances every route above `threshold` and measures the change in
/// per-route dispersion.
///
/// Routes without valid ZIPs are reported in [`RebalanceOutcome::skipped`].
/// Both standard deviations are taken over the routes that were actually
/// rebalanced.
pub fn rebalance(routes: &[RouteRecord], threshold: u32) -> RebalanceOutcome {
    let candidates = overloaded_routes(routes, threshold);
    info!(
        threshold,
        candidates = candidates.len(),
        "Overloaded routes selected"
    );

    let mut rebalanced = Vec::new();
    let mut skipped = Vec::new();
    let mut comparison = Vec::new();

    for route in &candidates {
        match rebalance_route(route) {
            Some(rows) => {
                let total: u32 = rows.iter().map(|r| r.rebalanced_stops).sum();
                debug!(
                    route_code = %route.route_code,
                    zips = rows.len(),
                    original = route.estimated_stops_per_day,
                    rebalanced = total,
                    "Route rebalanced"
                );
                comparison.push(RouteComparison {
                    route_code: route.route_code.clone(),
                    original: route.estimated_stops_per_day,
                    rebalanced: total,
                    improvement: route.estimated_stops_per_day - total,
                });
                rebalanced.extend(rows);
            }
            None => {
                let reason = SkipReason::NoValidZips;
                warn!(route_code = %route.route_code, %reason, "Route is unrebalanceable");
                skipped.push(SkippedRoute {
                    route_code: route.route_code.clone(),
                    estimated_stops_per_day: route.estimated_stops_per_day,
                    reason,
                });
            }
        }
    }

    let before: Vec<f64> = comparison.iter().map(|c| f64::from(c.original)).collect();
    let after: Vec<f64> = comparison.iter().map(|c| f64::from(c.rebalanced)).collect();
    let stddev_before = sample_stddev(&before);
    let stddev_after = sample_stddev(&after);

    comparison.sort_by(|a, b| b.improvement.cmp(&a.improvement));

    info!(
        rebalanced_routes = comparison.len(),
        skipped = skipped.len(),
        ?stddev_before,
        ?stddev_after,
        "Rebalancing complete"
    );

    RebalanceOutcome {
        overload_threshold: threshold,
        candidates: candidates.len(),
        rebalanced,
        skipped,
        comparison,
        stddev_before,
        stddev_after,
    }
}
