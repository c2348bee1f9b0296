use thiserror::Error;

use crate::model::TableKind;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{table} is missing required column '{column}'")]
    MissingColumn {
        table: TableKind,
        column: &'static str,
    },

    #[error("{table} CSV error: {source}")]
    Csv {
        table: TableKind,
        #[source]
        source: csv::Error,
    },

    #[error("{table} line {line}: {message}")]
    DataRow {
        table: TableKind,
        line: usize,
        message: String,
    },

    #[error("{table} did not contain any data rows")]
    EmptyData { table: TableKind },

    #[error("{table} frame construction failed: {message}")]
    Frame { table: TableKind, message: String },
}
