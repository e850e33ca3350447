//! Shared types for the recommendation front end: wire model, HTTP client,
//! configuration and platform paths.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod platform;
