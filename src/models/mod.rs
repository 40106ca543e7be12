//! Shared data model: input addresses and output rows.

mod address;
mod row;

pub use address::{parse_lonlat, parse_place_line, Address, ParsedLine};
pub use row::{PlaceRow, BOUNDARY_NONE, NODE_NONE, NODE_WEAK};
