use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::workload::filter::RouteFilter;
use crate::workload::types::Zone;
use crate::workload::zone::{ZoneMatching, ZoneRules};

/// Environment variable that overrides [`DashboardConfig::overload_threshold`].
pub const THRESHOLD_ENV: &str = "COURIER_OVERLOAD_THRESHOLD";

pub const DEFAULT_OVERLOAD_THRESHOLD: u32 = 50;

/// Settings shared by every subcommand.
///
/// Stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "overload_threshold": 50,
///   "zone_filter": "Philly Core",
///   "route_filter": ["R001", "R007"],
///   "zone_matching": "substring",
///   "core_prefixes": ["191"],
///   "suburb_prefixes": ["190"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Routes with more daily stops than this are overloaded.
    pub overload_threshold: u32,
    pub zone_filter: Option<Zone>,
    pub route_filter: Vec<String>,
    pub zone_matching: ZoneMatching,
    pub core_prefixes: Vec<String>,
    pub suburb_prefixes: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let rules = ZoneRules::default();
        DashboardConfig {
            overload_threshold: DEFAULT_OVERLOAD_THRESHOLD,
            zone_filter: None,
            route_filter: Vec::new(),
            zone_matching: rules.matching,
            core_prefixes: rules.core_prefixes,
            suburb_prefixes: rules.suburb_prefixes,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path))?;
        Self::from_json(&content).with_context(|| format!("invalid config {}", path))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Applies environment overrides through `lookup` (normally
    /// `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(THRESHOLD_ENV) {
            self.overload_threshold = raw.trim().parse().with_context(|| {
                format!("{} must be a non-negative integer, got {:?}", THRESHOLD_ENV, raw)
            })?;
            debug!(
                threshold = self.overload_threshold,
                "Threshold taken from environment"
            );
        }
        Ok(())
    }

    /// Applies command-line flags on top of file and environment values. A
    /// non-empty `routes` replaces the configured route filter.
    pub fn apply_overrides(
        &mut self,
        threshold: Option<u32>,
        zone: Option<Zone>,
        routes: &[String],
        zone_matching: Option<ZoneMatching>,
    ) {
        if let Some(threshold) = threshold {
            self.overload_threshold = threshold;
        }
        if let Some(zone) = zone {
            self.zone_filter = Some(zone);
        }
        if !routes.is_empty() {
            self.route_filter = routes.to_vec();
        }
        if let Some(matching) = zone_matching {
            self.zone_matching = matching;
        }
    }

    pub fn zone_rules(&self) -> ZoneRules {
        ZoneRules {
            matching: self.zone_matching,
            core_prefixes: self.core_prefixes.clone(),
            suburb_prefixes: self.suburb_prefixes.clone(),
        }
    }

    pub fn route_filter(&self) -> RouteFilter {
        RouteFilter::new(self.zone_filter, self.route_filter.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.overload_threshold, 50);
        assert_eq!(config.zone_rules(), ZoneRules::default());
        assert!(config.route_filter().is_unfiltered());
    }

    #[test]
    fn test_from_json_partial() {
        let config = DashboardConfig::from_json(r#"{"overload_threshold": 52}"#).unwrap();
        assert_eq!(config.overload_threshold, 52);
        assert_eq!(config.zone_matching, ZoneMatching::Substring);
        assert_eq!(config.core_prefixes, vec!["191"]);
    }

    #[test]
    fn test_from_json_full() {
        let config = DashboardConfig::from_json(
            r#"{
                "overload_threshold": 45,
                "zone_filter": "Suburbs",
                "route_filter": ["R001", "R002"],
                "zone_matching": "prefix",
                "core_prefixes": ["191"],
                "suburb_prefixes": ["190", "189"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.zone_filter, Some(Zone::Suburbs));
        assert_eq!(config.zone_matching, ZoneMatching::Prefix);
        let filter = config.route_filter();
        assert!(filter.routes.contains("R002"));
        assert_eq!(config.zone_rules().suburb_prefixes.len(), 2);
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        assert!(DashboardConfig::from_json(r#"{"threshold": 52}"#).is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = DashboardConfig::default();
        config
            .apply_env(|key| (key == THRESHOLD_ENV).then(|| " 52 ".to_string()))
            .unwrap();
        assert_eq!(config.overload_threshold, 52);
    }

    #[test]
    fn test_env_override_absent() {
        let mut config = DashboardConfig::default();
        config.apply_env(|_| None).unwrap();
        assert_eq!(config.overload_threshold, 50);
    }

    #[test]
    fn test_env_override_invalid() {
        let mut config = DashboardConfig::default();
        assert!(config.apply_env(|_| Some("many".to_string())).is_err());
    }

    fn file_config() -> DashboardConfig {
        DashboardConfig::from_json(
            r#"{"overload_threshold": 45, "zone_filter": "Suburbs", "route_filter": ["R001", "R002"]}"#,
        )
        .unwrap()
    }

    fn env_threshold(key: &str) -> Option<String> {
        (key == THRESHOLD_ENV).then(|| "52".to_string())
    }

    #[test]
    fn test_env_beats_file() {
        let mut config = file_config();
        config.apply_env(env_threshold).unwrap();
        config.apply_overrides(None, None, &[], None);

        assert_eq!(config.overload_threshold, 52);
        assert_eq!(config.zone_filter, Some(Zone::Suburbs));
        assert_eq!(config.route_filter, vec!["R001", "R002"]);
    }

    #[test]
    fn test_flag_beats_env() {
        let mut config = file_config();
        config.apply_env(env_threshold).unwrap();
        config.apply_overrides(
            Some(60),
            Some(Zone::PhillyCore),
            &[],
            Some(ZoneMatching::Prefix),
        );

        assert_eq!(config.overload_threshold, 60);
        assert_eq!(config.zone_filter, Some(Zone::PhillyCore));
        assert_eq!(config.zone_matching, ZoneMatching::Prefix);
    }

    #[test]
    fn test_route_flag_replaces_file_routes() {
        let mut config = file_config();
        config.apply_overrides(None, None, &["R007".to_string()], None);

        assert_eq!(config.route_filter, vec!["R007"]);
        let filter = config.route_filter();
        assert_eq!(filter.routes.len(), 1);
        assert!(!filter.routes.contains("R001"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(DashboardConfig::load("/nonexistent/courier_config.json").is_err());
    }
}
