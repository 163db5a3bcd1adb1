//! CSV loader for the route dataset.

use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::workload::types::RouteRecord;

/// Reads the route dataset from `path`. Files ending in `.gz` are
/// decompressed on the fly.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a row fails to parse, or a
/// route code appears more than once.
#[tracing::instrument]
pub fn load_routes(path: &str) -> Result<Vec<RouteRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open route dataset {}", path))?;

    let routes = if Path::new(path).extension().and_then(|e| e.to_str()) == Some("gz") {
        read_routes(GzDecoder::new(file))
    } else {
        read_routes(file)
    }
    .with_context(|| format!("failed to read route dataset {}", path))?;

    info!(routes = routes.len(), "Route dataset loaded");
    Ok(routes)
}

/// Parses route rows from any CSV reader with a header line.
pub fn read_routes<R: Read>(reader: R) -> Result<Vec<RouteRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut routes = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in rdr.deserialize().enumerate() {
        let route: RouteRecord =
            result.with_context(|| format!("malformed route row {}", index + 1))?;
        if !seen.insert(route.route_code.clone()) {
            bail!("duplicate route_code {:?} at row {}", route.route_code, index + 1);
        }
        routes.push(route);
    }

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;

    const SAMPLE: &str = "route_code,zip_codes,estimated_stops_per_day\n\
        R001,\"19102 19103 19106\",48\n\
        R002,19010,53\n";

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_read_routes() {
        let routes = read_routes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0], RouteRecord::new("R001", "19102 19103 19106", 48));
        assert_eq!(routes[1].zip_codes, "19010");
    }

    #[test]
    fn test_read_routes_empty_zip_cell() {
        let data = "route_code,zip_codes,estimated_stops_per_day\nR009,,55\n";
        let routes = read_routes(data.as_bytes()).unwrap();
        assert_eq!(routes[0].zip_codes, "");
        assert_eq!(routes[0].valid_zips().count(), 0);
    }

    #[test]
    fn test_read_routes_ignores_extra_columns() {
        let data = "route_code,zip_codes,estimated_stops_per_day,zone\n\
            R001,19102,48,Philly Core\n";
        let routes = read_routes(data.as_bytes()).unwrap();
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_read_routes_rejects_bad_stop_count() {
        let data = "route_code,zip_codes,estimated_stops_per_day\nR001,19102,lots\n";
        let err = read_routes(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_read_routes_rejects_duplicate_codes() {
        let data = "route_code,zip_codes,estimated_stops_per_day\n\
            R001,19102,48\nR001,19103,40\n";
        let err = read_routes(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duplicate route_code"));
    }

    #[test]
    fn test_load_routes_missing_file() {
        let err = load_routes(&temp_path("courier_workload_missing.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open route dataset"));
    }

    #[test]
    fn test_load_routes_gzip() {
        let path = temp_path("courier_workload_test_load.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let routes = load_routes(&path).unwrap();
        assert_eq!(routes.len(), 2);

        fs::remove_file(&path).unwrap();
    }
}
