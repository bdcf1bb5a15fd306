//! Input boundary: raw records from a CSV file or URL.

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::record::RawRecord;

/// Column every source must carry; all others may be absent.
pub const REQUIRED_COLUMN: &str = "Record_ID";

pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

/// Loads raw records from a local path or fetches them over HTTP.
#[tracing::instrument(fields(source = %source))]
pub fn load_source(source: &str) -> Result<Vec<RawRecord>> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        fetch_bytes(source)?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source bytes loaded, parsing");
    parse_csv(&bytes)
}

/// Deserializes CSV rows into [`RawRecord`]s.
///
/// Rows that cannot be shaped into a record (wrong field count, missing or
/// non-numeric `Record_ID`) are logged and skipped.
///
/// # Errors
///
/// Returns an error if the header is unreadable or lacks `Record_ID`.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = rdr.headers()?;
    if !headers.iter().any(|h| h == REQUIRED_COLUMN) {
        bail!("CSV header is missing the {REQUIRED_COLUMN} column");
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize::<RawRecord>() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => {
                skipped += 1;
                let line = e.position().map(|p| p.line());
                warn!(?line, error = %e, "Skipping malformed CSV row");
            }
        }
    }

    debug!(rows = rows.len(), skipped, "CSV parsed");
    Ok(rows)
}
