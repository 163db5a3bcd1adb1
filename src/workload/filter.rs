//! Selection of the routes in view.

use crate::workload::types::{RouteRecord, Zone};
use crate::workload::zone::ZoneRules;
use std::collections::{BTreeSet, HashSet};

/// Zone and route-code selection. An unset zone and an empty route set both
/// mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub zone: Option<Zone>,
    pub routes: HashSet<String>,
}

impl RouteFilter {
    pub fn new(zone: Option<Zone>, routes: impl IntoIterator<Item = String>) -> Self {
        RouteFilter {
            zone,
            routes: routes.into_iter().collect(),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.zone.is_none() && self.routes.is_empty()
    }

    /// A route is in view when it is in the selected zone and, if any codes
    /// were selected, its code is one of them.
    pub fn matches(&self, route: &RouteRecord, rules: &ZoneRules) -> bool {
        if let Some(zone) = self.zone {
            if rules.classify(&route.zip_codes) != zone {
                return false;
            }
        }
        self.routes.is_empty() || self.routes.contains(&route.route_code)
    }

    /// Routes in view, in dataset order.
    pub fn apply<'a>(&self, routes: &'a [RouteRecord], rules: &ZoneRules) -> Vec<&'a RouteRecord> {
        routes.iter().filter(|r| self.matches(r, rules)).collect()
    }

    /// Owned copy of the routes in view.
    pub fn select(&self, routes: &[RouteRecord], rules: &ZoneRules) -> Vec<RouteRecord> {
        self.apply(routes, rules).into_iter().cloned().collect()
    }
}

/// Sorted unique route codes available under `zone` (all routes when `None`).
pub fn route_options(routes: &[RouteRecord], zone: Option<Zone>, rules: &ZoneRules) -> Vec<String> {
    routes
        .iter()
        .filter(|r| zone.is_none_or(|z| rules.classify(&r.zip_codes) == z))
        .map(|r| r.route_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Raw `zip_codes` of each selected route code, in dataset order. Codes that
/// are not in the dataset are skipped.
pub fn selected_zip_codes(routes: &[RouteRecord], filter: &RouteFilter) -> Vec<(String, String)> {
    routes
        .iter()
        .filter(|r| filter.routes.contains(&r.route_code))
        .map(|r| (r.route_code.clone(), r.zip_codes.clone()))
        .collect()
}

/// Sorted zones that at least one route falls into.
pub fn zones_present(routes: &[RouteRecord], rules: &ZoneRules) -> Vec<Zone> {
    routes
        .iter()
        .map(|r| rules.classify(&r.zip_codes))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_routes() -> Vec<RouteRecord> {
        vec![
            RouteRecord::new("R003", "19102 19103", 48),
            RouteRecord::new("R001", "19010 19041", 52),
            RouteRecord::new("R002", "19102 19010", 30),
            RouteRecord::new("R004", "19104", 44),
        ]
    }

    fn codes(view: &[&RouteRecord]) -> Vec<String> {
        view.iter().map(|r| r.route_code.clone()).collect()
    }

    #[test]
    fn test_unfiltered_keeps_everything() {
        let routes = sample_routes();
        let filter = RouteFilter::default();
        assert!(filter.is_unfiltered());
        assert_eq!(filter.apply(&routes, &ZoneRules::default()).len(), 4);
    }

    #[test]
    fn test_zone_filter() {
        let routes = sample_routes();
        let filter = RouteFilter::new(Some(Zone::PhillyCore), Vec::new());
        let view = filter.apply(&routes, &ZoneRules::default());
        assert_eq!(codes(&view), vec!["R003", "R004"]);
    }

    #[test]
    fn test_route_filter() {
        let routes = sample_routes();
        let filter = RouteFilter::new(None, vec!["R001".to_string(), "R004".to_string()]);
        let view = filter.apply(&routes, &ZoneRules::default());
        assert_eq!(codes(&view), vec!["R001", "R004"]);
    }

    #[test]
    fn test_route_outside_zone_is_excluded() {
        let routes = sample_routes();
        let filter = RouteFilter::new(
            Some(Zone::Suburbs),
            vec!["R001".to_string(), "R003".to_string()],
        );
        let view = filter.apply(&routes, &ZoneRules::default());
        assert_eq!(codes(&view), vec!["R001"]);
    }

    #[test]
    fn test_select_returns_owned_copies() {
        let routes = sample_routes();
        let filter = RouteFilter::new(Some(Zone::Mixed), Vec::new());
        let view = filter.select(&routes, &ZoneRules::default());
        assert_eq!(view, vec![routes[2].clone()]);
    }

    #[test]
    fn test_unknown_route_code_yields_empty_view() {
        let routes = sample_routes();
        let filter = RouteFilter::new(None, vec!["R999".to_string()]);
        assert!(filter.apply(&routes, &ZoneRules::default()).is_empty());
    }

    #[test]
    fn test_route_options_sorted() {
        let routes = sample_routes();
        let rules = ZoneRules::default();
        assert_eq!(
            route_options(&routes, None, &rules),
            vec!["R001", "R002", "R003", "R004"]
        );
        assert_eq!(
            route_options(&routes, Some(Zone::PhillyCore), &rules),
            vec!["R003", "R004"]
        );
    }

    #[test]
    fn test_selected_zip_codes_keeps_dataset_order() {
        let routes = sample_routes();
        let filter = RouteFilter::new(
            None,
            vec!["R004".to_string(), "R999".to_string(), "R003".to_string()],
        );

        let selected = selected_zip_codes(&routes, &filter);
        assert_eq!(
            selected,
            vec![
                ("R003".to_string(), "19102 19103".to_string()),
                ("R004".to_string(), "19104".to_string()),
            ]
        );
    }

    #[test]
    fn test_selected_zip_codes_without_selection() {
        assert!(selected_zip_codes(&sample_routes(), &RouteFilter::default()).is_empty());
    }

    #[test]
    fn test_zones_present() {
        let zones = zones_present(&sample_routes(), &ZoneRules::default());
        assert_eq!(zones, vec![Zone::Mixed, Zone::PhillyCore, Zone::Suburbs]);
    }
}
