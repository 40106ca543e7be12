//! Overpass API access: resilient POST client and query builders.

mod client;
mod query;

pub use client::{FetchError, OverpassClient};
pub use query::{admin_search_query, around_query};
