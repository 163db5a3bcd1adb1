use crate::workload::types::RouteRecord;
use crate::workload::utility::{mean, round2};
use serde::Serialize;

/// Headline numbers for the routes in view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSummary {
    pub total_stops: u64,
    /// Mean stops per route rounded to two decimals; `None` for an empty view.
    pub avg_stops: Option<f64>,
    pub routes_in_view: usize,
    pub overloaded_in_view: usize,
}

/// A route and its daily stop count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteLoad {
    pub route_code: String,
    pub estimated_stops_per_day: u32,
}

impl From<&RouteRecord> for RouteLoad {
    fn from(route: &RouteRecord) -> Self {
        RouteLoad {
            route_code: route.route_code.clone(),
            estimated_stops_per_day: route.estimated_stops_per_day,
        }
    }
}

/// Most and least loaded routes of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extremes {
    pub most_loaded: RouteLoad,
    pub least_loaded: RouteLoad,
}

/// One bar of the per-route stop chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteBar {
    pub route_code: String,
    pub estimated_stops_per_day: u32,
    pub overloaded: bool,
}

pub fn summarize_view(view: &[RouteRecord], threshold: u32) -> ViewSummary {
    let stops: Vec<f64> = view
        .iter()
        .map(|r| f64::from(r.estimated_stops_per_day))
        .collect();

    ViewSummary {
        total_stops: view
            .iter()
            .map(|r| u64::from(r.estimated_stops_per_day))
            .sum(),
        avg_stops: if view.is_empty() {
            None
        } else {
            Some(round2(mean(&stops)))
        },
        routes_in_view: view.len(),
        overloaded_in_view: view
            .iter()
            .filter(|r| r.estimated_stops_per_day > threshold)
            .count(),
    }
}

/// Finds the busiest and quietest routes. On ties the earliest row wins.
pub fn extremes(routes: &[RouteRecord]) -> Option<Extremes> {
    let first = routes.first()?;
    let (mut most, mut least) = (first, first);

    for route in &routes[1..] {
        if route.estimated_stops_per_day > most.estimated_stops_per_day {
            most = route;
        }
        if route.estimated_stops_per_day < least.estimated_stops_per_day {
            least = route;
        }
    }

    Some(Extremes {
        most_loaded: most.into(),
        least_loaded: least.into(),
    })
}

/// Routes in view ordered by stops descending, each flagged when above
/// `threshold`.
pub fn route_bars(view: &[RouteRecord], threshold: u32) -> Vec<RouteBar> {
    let mut bars: Vec<RouteBar> = view
        .iter()
        .map(|r| RouteBar {
            route_code: r.route_code.clone(),
            estimated_stops_per_day: r.estimated_stops_per_day,
            overloaded: r.estimated_stops_per_day > threshold,
        })
        .collect();
    bars.sort_by(|a, b| b.estimated_stops_per_day.cmp(&a.estimated_stops_per_day));
    bars
}
