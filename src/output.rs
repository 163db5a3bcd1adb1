//! Output formatting and persistence for derived tables.
//!
//! Supports pretty-printing, JSON files, and CSV files with optional gzip
//! compression.

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

/// Logs any value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Serializes `rows` as CSV with a header line into any writer.
pub fn write_csv_to<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `rows` to a CSV file, replacing any existing file.
///
/// With `gzip`, the output is compressed and `.gz` is appended to `path`
/// unless it is already there. Returns the path actually written.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T], gzip: bool) -> Result<String> {
    let target = if gzip && !path.ends_with(".gz") {
        format!("{}.gz", path)
    } else {
        path.to_string()
    };
    debug!(path = %target, rows = rows.len(), gzip, "Writing CSV");

    let file = File::create(&target).with_context(|| format!("failed to create {}", target))?;

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_csv_to(&mut encoder, rows)?;
        encoder.finish()?;
    } else {
        write_csv_to(file, rows)?;
    }

    info!(path = %target, rows = rows.len(), "CSV written");
    Ok(target)
}

/// Writes a value as pretty-printed JSON to `path`.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path))?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path, "JSON written");
    Ok(())
}
