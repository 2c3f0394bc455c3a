//! Request and Response models for the cache server API
//!
//! This module defines the query-string parameters accepted by each endpoint,
//! the JSON bodies returned by the auxiliary endpoints, and TTL parsing.

pub mod requests;
pub mod responses;
pub mod ttl;

// Re-export commonly used types
pub use requests::{KeyQuery, SetQuery};
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
pub use ttl::parse_ttl;
