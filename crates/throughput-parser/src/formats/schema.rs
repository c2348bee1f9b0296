//! Canonical column names shared by the parser and the analysis crate.

pub const TIMESTAMP: &str = "timestamp";
pub const ACTIVE_PICKERS: &str = "active_pickers";
pub const UNITS_PICKED: &str = "units_picked";
pub const HOUR: &str = "hour";

pub const PICK_START: &str = "pick_start";
pub const PICK_END: &str = "pick_end";
pub const SLA_CUTOFF: &str = "sla_cutoff";
pub const ACTUAL_DEPARTURE: &str = "actual_departure";

pub const STAFFING_COLUMNS: &[&str] = &[TIMESTAMP, ACTIVE_PICKERS];
pub const PICKING_COLUMNS: &[&str] = &[TIMESTAMP, UNITS_PICKED, ACTIVE_PICKERS, HOUR];
pub const ORDER_COLUMNS: &[&str] = &[PICK_START, PICK_END, SLA_CUTOFF, ACTUAL_DEPARTURE];
