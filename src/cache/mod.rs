//! Cache Module
//!
//! Provides the in-memory byte cache with per-entry TTL expiry.

mod expiry;
mod stats;
mod store;


// Re-export public types
pub use stats::CacheStats;
pub use store::CacheStore;

pub(crate) use store::StoreInner;
