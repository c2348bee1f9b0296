use chrono::Timelike;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::TableKind;

use super::schema::{ACTIVE_PICKERS, HOUR, TIMESTAMP, UNITS_PICKED};
use super::{datetime_column, parse_count, parse_timestamp, read_table};

const TABLE: TableKind = TableKind::Picking;

/// Parses `picking_activity.csv`.
///
/// The `hour` column is taken from the file when present (values must lie in 0..=23)
/// and derived from `timestamp` otherwise.
pub fn parse_picking(content: &str) -> Result<DataFrame, ParserError> {
    let (header, rows) = read_table(TABLE, content)?;
    let timestamp_idx = header.required(TIMESTAMP)?;
    let units_idx = header.required(UNITS_PICKED)?;
    let pickers_idx = header.required(ACTIVE_PICKERS)?;
    let hour_idx = header.optional(HOUR);

    if rows.is_empty() {
        return Err(ParserError::EmptyData { table: TABLE });
    }

    let mut timestamps = Vec::with_capacity(rows.len());
    let mut units = Vec::with_capacity(rows.len());
    let mut pickers = Vec::with_capacity(rows.len());
    let mut hours = Vec::with_capacity(rows.len());

    for (line, record) in &rows {
        let line = *line;
        let timestamp = parse_timestamp(
            TABLE,
            record.get(timestamp_idx).unwrap_or(""),
            line,
            TIMESTAMP,
        )?;
        units.push(parse_count(
            TABLE,
            record.get(units_idx).unwrap_or(""),
            line,
            UNITS_PICKED,
        )?);
        pickers.push(parse_count(
            TABLE,
            record.get(pickers_idx).unwrap_or(""),
            line,
            ACTIVE_PICKERS,
        )?);

        let hour = match hour_idx {
            Some(idx) => {
                let value = parse_count(TABLE, record.get(idx).unwrap_or(""), line, HOUR)?;
                if !(0..=23).contains(&value) {
                    return Err(ParserError::DataRow {
                        table: TABLE,
                        line,
                        message: format!("hour {value} is outside 0..=23"),
                    });
                }
                value
            }
            None => i64::from(timestamp.hour()),
        };
        hours.push(hour);
        timestamps.push(timestamp);
    }

    let columns: Vec<Column> = vec![
        datetime_column(TABLE, TIMESTAMP, &timestamps)?,
        Series::new(UNITS_PICKED.into(), units).into(),
        Series::new(ACTIVE_PICKERS.into(), pickers).into(),
        Series::new(HOUR.into(), hours).into(),
    ];

    DataFrame::new(columns).map_err(|err| ParserError::Frame {
        table: TABLE,
        message: format!("failed to build picking dataframe: {err}"),
    })
}
