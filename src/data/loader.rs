use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::datetime;
use crate::error::{AnalysisError, Result};
use crate::state::series::{Sample, Series};

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const VALUES_COLUMN: &str = "Values";

/// Where the raw table comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl DataSource {
    /// Pick the input for a run. Uploaded bytes win over a path; a path is
    /// only accepted if it exists.
    pub fn resolve(path: Option<&Path>, bytes: Option<Vec<u8>>) -> Result<Self> {
        if let Some(bytes) = bytes {
            return Ok(DataSource::Bytes(bytes));
        }
        match path {
            Some(p) if p.exists() => Ok(DataSource::Path(p.to_path_buf())),
            _ => Err(AnalysisError::MissingInput),
        }
    }

    fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            DataSource::Path(path) => {
                if !path.exists() {
                    return Err(AnalysisError::MissingInput);
                }
                Ok(Cow::Owned(std::fs::read(path)?))
            }
            DataSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes.as_slice())),
        }
    }
}

/// Unparsed cells grouped by column. `cells[c]` holds the `rows` cells under
/// `headers[c]`, in file order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub cells: Vec<Vec<String>>,
    pub rows: usize,
}

impl RawTable {
    /// Cells under the first header equal to `name`.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        let idx = self.headers.iter().position(|h| h == name)?;
        self.cells.get(idx).map(Vec::as_slice)
    }
}

/// Row accounting for one load, so callers can surface data-quality gaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows in the table, excluding the header.
    pub rows_read: usize,
    /// Rows dropped because `Timestamp` did not parse.
    pub dropped_timestamps: usize,
    /// Kept rows whose `Values` cell was not numeric (stored as NaN).
    pub non_numeric_values: usize,
}

/// Decode as UTF-8, falling back to Latin-1 byte-per-char.
fn decode_text(content: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(content) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(content.iter().map(|&b| b as char).collect()),
    }
}

/// Split CSV text into a `RawTable`. The first record is the header.
/// Short rows are padded with empty cells, surplus cells are ignored and
/// unreadable records are skipped.
pub fn read_table(content: &[u8]) -> Result<RawTable> {
    let text = decode_text(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(header) => header?
            .iter()
            .map(|s| s.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut table = RawTable {
        cells: vec![Vec::new(); headers.len()],
        headers,
        rows: 0,
    };

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping unreadable CSV record: {e}");
                continue;
            }
        };
        for (c, column) in table.cells.iter_mut().enumerate() {
            column.push(record.get(c).unwrap_or_default().to_string());
        }
        table.rows += 1;
    }

    Ok(table)
}

/// Build a cleaned, time-ordered series from a raw table.
pub fn series_from_table(table: &RawTable, window: usize) -> Result<(Series, LoadReport)> {
    let timestamps = table.column(TIMESTAMP_COLUMN);
    let values = table.column(VALUES_COLUMN);

    let (timestamps, values) = match (timestamps, values) {
        (Some(t), Some(v)) => (t, v),
        (t, v) => {
            let mut missing = Vec::new();
            if t.is_none() {
                missing.push(TIMESTAMP_COLUMN.to_string());
            }
            if v.is_none() {
                missing.push(VALUES_COLUMN.to_string());
            }
            return Err(AnalysisError::Schema { missing });
        }
    };

    let mut report = LoadReport {
        rows_read: table.rows,
        ..Default::default()
    };
    let mut samples = Vec::with_capacity(table.rows);

    for (raw_ts, raw_value) in timestamps.iter().zip(values.iter()) {
        let Some(timestamp) = datetime::parse_timestamp(raw_ts) else {
            report.dropped_timestamps += 1;
            continue;
        };
        let value = match raw_value.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                report.non_numeric_values += 1;
                f64::NAN
            }
        };
        samples.push(Sample::new(timestamp, value));
    }

    if report.dropped_timestamps > 0 {
        tracing::warn!(
            "Dropped {} of {} rows with unparseable timestamps",
            report.dropped_timestamps,
            report.rows_read
        );
    }
    if report.non_numeric_values > 0 {
        tracing::warn!("{} rows have non-numeric values", report.non_numeric_values);
    }

    Ok((Series::from_samples(samples, window), report))
}

/// Read `source` and build the series with a trailing moving average of
/// `window` samples.
pub fn load_series(source: &DataSource, window: usize) -> Result<(Series, LoadReport)> {
    let content = source.read()?;
    let table = read_table(&content)?;
    let (series, report) = series_from_table(&table, window)?;
    tracing::info!(
        "Loaded {} samples ({} rows read)",
        series.len(),
        report.rows_read
    );
    Ok((series, report))
}
