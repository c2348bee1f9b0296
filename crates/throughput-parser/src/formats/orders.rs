use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::TableKind;

use super::schema::ORDER_COLUMNS;
use super::{datetime_column, parse_timestamp, read_table};

const TABLE: TableKind = TableKind::Orders;

/// Parses `order_flow.csv`; all four lifecycle columns are required timestamps.
pub fn parse_orders(content: &str) -> Result<DataFrame, ParserError> {
    let (header, rows) = read_table(TABLE, content)?;
    let indices = ORDER_COLUMNS
        .iter()
        .map(|column| header.required(*column))
        .collect::<Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Err(ParserError::EmptyData { table: TABLE });
    }

    let mut values: Vec<Vec<_>> = vec![Vec::with_capacity(rows.len()); ORDER_COLUMNS.len()];
    for (line, record) in &rows {
        for (slot, (column, idx)) in ORDER_COLUMNS.iter().zip(&indices).enumerate() {
            let raw = record.get(*idx).unwrap_or("");
            values[slot].push(parse_timestamp(TABLE, raw, *line, column)?);
        }
    }

    let columns = ORDER_COLUMNS
        .iter()
        .zip(&values)
        .map(|(column, parsed)| datetime_column(TABLE, column, parsed))
        .collect::<Result<Vec<Column>, _>>()?;

    DataFrame::new(columns).map_err(|err| ParserError::Frame {
        table: TABLE,
        message: format!("failed to build order dataframe: {err}"),
    })
}
