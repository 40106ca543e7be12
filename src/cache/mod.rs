//! Durable cache for raw Overpass payloads.
//!
//! Keyed by (place key, radius in km). Entries are written once on the
//! first successful fetch and only rewritten on a force-refresh; there
//! is no TTL and no eviction. The store is not safe for concurrent
//! writers to the same key.

mod key;
mod store;

pub use key::place_key;
pub use store::{CacheKey, CacheStore, FsCache, MemoryCache};
