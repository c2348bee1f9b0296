mod common;
mod orders;
mod picking;
pub mod schema;
mod staffing;

pub use orders::parse_orders;
pub use picking::parse_picking;
pub use staffing::parse_staffing;

pub(crate) use common::{
    datetime_column, parse_count, parse_optional_count, parse_timestamp, read_table,
    HeaderIndex,
};
