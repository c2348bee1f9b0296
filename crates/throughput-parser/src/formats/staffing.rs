use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::TableKind;

use super::schema::{ACTIVE_PICKERS, TIMESTAMP};
use super::{datetime_column, parse_optional_count, parse_timestamp, read_table};

const TABLE: TableKind = TableKind::Staffing;

/// Parses `staffing_levels.csv`. `active_pickers` is carried when the column exists.
pub fn parse_staffing(content: &str) -> Result<DataFrame, ParserError> {
    let (header, rows) = read_table(TABLE, content)?;
    let timestamp_idx = header.required(TIMESTAMP)?;
    let pickers_idx = header.optional(ACTIVE_PICKERS);

    if rows.is_empty() {
        return Err(ParserError::EmptyData { table: TABLE });
    }

    let mut timestamps = Vec::with_capacity(rows.len());
    let mut pickers: Vec<Option<i64>> = Vec::with_capacity(rows.len());

    for (line, record) in &rows {
        let raw = record.get(timestamp_idx).unwrap_or("");
        timestamps.push(parse_timestamp(TABLE, raw, *line, TIMESTAMP)?);

        if let Some(idx) = pickers_idx {
            let raw = record.get(idx).unwrap_or("");
            pickers.push(parse_optional_count(TABLE, raw, *line, ACTIVE_PICKERS)?);
        }
    }

    let mut columns: Vec<Column> = vec![datetime_column(TABLE, TIMESTAMP, &timestamps)?];
    if pickers_idx.is_some() {
        columns.push(Series::new(ACTIVE_PICKERS.into(), pickers).into());
    }

    DataFrame::new(columns).map_err(|err| ParserError::Frame {
        table: TABLE,
        message: format!("failed to build staffing dataframe: {err}"),
    })
}
