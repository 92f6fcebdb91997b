//! HTTP API layer for campus-rs.
//!
//! This crate provides the REST API and real-time streaming:
//!
//! - **Endpoints**: accounts, posts, events, clubs, profiles, uploads
//! - **Extractors**: Authentication
//! - **Middleware**: Bearer-token auth
//! - **Streaming**: Server-Sent Events for live feeds
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;

pub use endpoints::router;
