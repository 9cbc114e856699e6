//! Response Caching
//!
//! Optional TTL memoization in front of the query engines.

mod cleaner;
mod response_cache;

pub use cleaner::{CacheCleaner, SweepStats};
pub use response_cache::{ResponseCache, DEFAULT_MAX_ENTRIES};
