pub mod errors;
pub mod formats;
pub mod model;

pub use errors::ParserError;
pub use formats::{parse_orders, parse_picking, parse_staffing};
pub use model::{naive_from_micros, naive_to_micros, TableKind};
