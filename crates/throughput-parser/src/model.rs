use std::fmt;

use chrono::{DateTime, NaiveDateTime};

/// The three operational logs the analyzer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Staffing,
    Picking,
    Orders,
}

impl TableKind {
    /// Conventional file name of the table inside a data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            TableKind::Staffing => "staffing_levels.csv",
            TableKind::Picking => "picking_activity.csv",
            TableKind::Orders => "order_flow.csv",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

pub fn naive_from_micros(value: i64) -> Option<NaiveDateTime> {
    let secs = value.div_euclid(1_000_000);
    let micros = value.rem_euclid(1_000_000) as u32;
    DateTime::from_timestamp(secs, micros * 1_000).map(|dt| dt.naive_utc())
}

pub fn naive_to_micros(value: NaiveDateTime) -> i64 {
    let dt_utc = value.and_utc();
    dt_utc.timestamp() * 1_000_000 + i64::from(dt_utc.timestamp_subsec_nanos() / 1_000)
}
