//! API Module
//!
//! HTTP handlers and routing that adapt query-string requests onto the cache.
//!
//! # Endpoints
//! - `GET /get?key=K` - Retrieve a raw value
//! - `POST /set?key=K&ttl=D` - Store the request body under a key
//! - `GET /has?key=K` - Existence probe (`true` / `false`)
//! - `DELETE /delete?key=K` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
