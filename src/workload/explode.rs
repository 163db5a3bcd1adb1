//! Expansion of routes into per-ZIP records.

use crate::workload::types::{RouteRecord, ZipRecord};
use serde::Serialize;
use tracing::{debug, warn};

/// A token from a route's `zip_codes` field that was not a 5-digit ZIP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedToken {
    pub route_code: String,
    pub token: String,
}

/// Result of exploding a set of routes.
#[derive(Debug, Default)]
pub struct Explosion {
    pub records: Vec<ZipRecord>,
    pub dropped: Vec<DroppedToken>,
}

impl Explosion {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Returns true when `token` is exactly five ASCII digits.
pub fn is_valid_zip(token: &str) -> bool {
    token.len() == 5 && token.bytes().all(|b| b.is_ascii_digit())
}

/// Emits one [`ZipRecord`] per valid ZIP token of every route.
///
/// Each record carries the route's full daily stop count. Malformed tokens
/// are collected in [`Explosion::dropped`] instead of being emitted.
pub fn explode_routes(routes: &[RouteRecord]) -> Explosion {
    let mut explosion = Explosion::default();

    for route in routes {
        for token in route.zip_tokens() {
            if is_valid_zip(token) {
                explosion.records.push(ZipRecord {
                    route_code: route.route_code.clone(),
                    zip_code: token.to_string(),
                    estimated_stops: route.estimated_stops_per_day,
                });
            } else {
                debug!(route_code = %route.route_code, token, "Dropping malformed ZIP token");
                explosion.dropped.push(DroppedToken {
                    route_code: route.route_code.clone(),
                    token: token.to_string(),
                });
            }
        }
    }

    if !explosion.dropped.is_empty() {
        warn!(
            dropped = explosion.dropped.len(),
            "Malformed ZIP tokens excluded from explosion"
        );
    }
    debug!(
        routes = routes.len(),
        records = explosion.records.len(),
        "Routes exploded into ZIP records"
    );

    explosion
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_zip() {
        assert!(is_valid_zip("19102"));
        assert!(is_valid_zip("00000"));
        assert!(!is_valid_zip("1910"));
        assert!(!is_valid_zip("191020"));
        assert!(!is_valid_zip("1910a"));
        assert!(!is_valid_zip("-1910"));
        assert!(!is_valid_zip(""));
        // non-ASCII digits are rejected
        assert!(!is_valid_zip("１９１０２"));
    }

    #[test]
    fn test_explode_copies_full_stop_count() {
        let routes = vec![RouteRecord::new("R001", "19102 19103 19106", 48)];
        let explosion = explode_routes(&routes);

        assert_eq!(explosion.records.len(), 3);
        assert!(explosion.records.iter().all(|r| r.estimated_stops == 48));
        assert!(explosion.records.iter().all(|r| r.route_code == "R001"));
        assert_eq!(explosion.dropped_count(), 0);
    }

    #[test]
    fn test_explode_counts_dropped_tokens() {
        let routes = vec![
            RouteRecord::new("R001", "19102 nan 1910", 30),
            RouteRecord::new("R002", "  19020\t19103  ", 20),
        ];
        let explosion = explode_routes(&routes);

        assert_eq!(explosion.records.len(), 3);
        assert_eq!(explosion.dropped_count(), 2);
        assert_eq!(
            explosion.dropped[0],
            DroppedToken {
                route_code: "R001".into(),
                token: "nan".into()
            }
        );
    }

    #[test]
    fn test_route_without_valid_zips_contributes_nothing() {
        let routes = vec![RouteRecord::new("R009", "", 55)];
        let explosion = explode_routes(&routes);

        assert!(explosion.records.is_empty());
        assert!(explosion.dropped.is_empty());
    }
}
