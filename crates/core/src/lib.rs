//! Core business logic for campus-rs.

pub mod services;

pub use services::*;
