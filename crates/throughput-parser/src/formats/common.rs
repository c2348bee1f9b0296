use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::{naive_to_micros, TableKind};

/// Header row lookup; column names match case-insensitively.
pub(crate) struct HeaderIndex {
    table: TableKind,
    names: Vec<String>,
}

impl HeaderIndex {
    fn new(table: TableKind, header: &StringRecord) -> Self {
        let names = header
            .iter()
            .map(|name| name.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
            .collect();
        Self { table, names }
    }

    pub fn optional(&self, column: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
    }

    pub fn required(&self, column: &'static str) -> Result<usize, ParserError> {
        self.optional(column).ok_or(ParserError::MissingColumn {
            table: self.table,
            column,
        })
    }
}

/// Reads the header and every data row. Returns `(line_number, record)` pairs where
/// the header is line 1.
pub(crate) fn read_table(
    table: TableKind,
    content: &str,
) -> Result<(HeaderIndex, Vec<(usize, StringRecord)>), ParserError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let header = reader
        .headers()
        .map_err(|source| ParserError::Csv { table, source })?
        .clone();

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ParserError::Csv { table, source })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push((row_idx + 2, record));
    }

    Ok((HeaderIndex::new(table, &header), rows))
}

pub(crate) fn parse_timestamp(
    table: TableKind,
    value: &str,
    line: usize,
    column: &str,
) -> Result<NaiveDateTime, ParserError> {
    static FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let trimmed = value.trim();
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }
    // Wall-clock time is kept so hour-of-day matches the written hour.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }
    Err(ParserError::DataRow {
        table,
        line,
        message: format!("invalid timestamp '{trimmed}' in column '{column}'"),
    })
}

/// Parses a whole-number count. Integral floats such as `12.0` are accepted.
pub(crate) fn parse_count(
    table: TableKind,
    value: &str,
    line: usize,
    column: &str,
) -> Result<i64, ParserError> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(parsed);
    }
    let parsed = match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => parsed,
        _ => {
            return Err(ParserError::DataRow {
                table,
                line,
                message: format!("failed to parse column '{column}' as integer: '{trimmed}'"),
            })
        }
    };
    // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
    if parsed < i64::MIN as f64 || parsed >= i64::MAX as f64 {
        return Err(ParserError::DataRow {
            table,
            line,
            message: format!(
                "column '{column}' value '{trimmed}' does not fit in a 64-bit integer"
            ),
        });
    }
    Ok(parsed as i64)
}

pub(crate) fn parse_optional_count(
    table: TableKind,
    value: &str,
    line: usize,
    column: &str,
) -> Result<Option<i64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_count(table, trimmed, line, column).map(Some)
}

pub(crate) fn datetime_column(
    table: TableKind,
    name: &str,
    values: &[NaiveDateTime],
) -> Result<Column, ParserError> {
    let micros: Vec<i64> = values.iter().copied().map(naive_to_micros).collect();
    let series = Series::new(name.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .map_err(|err| ParserError::Frame {
            table,
            message: format!("failed to cast column '{name}' to datetime: {err}"),
        })?;
    Ok(series.into())
}
