#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use throughput_parser::{parse_orders, parse_picking};

pub fn picking(rows: &[(&str, i64, i64)]) -> DataFrame {
    let mut csv = String::from("timestamp,units_picked,active_pickers\n");
    for (timestamp, units, pickers) in rows {
        csv.push_str(&format!("{timestamp},{units},{pickers}\n"));
    }
    parse_picking(&csv).unwrap()
}

/// `(pick_start, pick_end, sla_cutoff, actual_departure)`
pub fn orders(rows: &[(&str, &str, &str, &str)]) -> DataFrame {
    let mut csv = String::from("pick_start,pick_end,sla_cutoff,actual_departure\n");
    for (start, end, cutoff, departure) in rows {
        csv.push_str(&format!("{start},{end},{cutoff},{departure}\n"));
    }
    parse_orders(&csv).unwrap()
}

pub fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub const STAFFING_CSV: &str = "\
timestamp,active_pickers
2025-01-01 00:00:00,2
2025-01-01 01:00:00,1
2025-01-01 02:00:00,2
";

pub const PICKING_CSV: &str = "\
timestamp,units_picked,active_pickers
2025-01-01 00:00:00,700,2
2025-01-01 01:00:00,300,1
2025-01-01 02:00:00,900,2
2025-01-01 03:00:00,400,1
2025-01-01 04:00:00,1400,4
2025-01-01 05:00:00,100,0
";

pub const ORDERS_CSV: &str = "\
order_id,pick_start,pick_end,sla_cutoff,actual_departure
A1,2025-01-01 02:00:00,2025-01-01 02:30:00,2025-01-01 03:00:00,2025-01-01 03:30:00
A2,2025-01-01 02:10:00,2025-01-01 02:40:00,2025-01-01 04:00:00,2025-01-01 03:10:00
A3,2025-01-01 05:00:00,2025-01-01 05:20:00,2025-01-01 06:00:00,2025-01-01 06:00:00
";
