//! minestats: read-only query API over minesweeper game records
//!
//! Records come from a paged backing store (`store`), are held as an
//! immutable snapshot by a time-based, single-flight cache (`cache`), and are
//! narrowed per request by a fixed filter pipeline (`filtering`). The axum
//! surface in `webserver` is behind the default `web` feature.

pub mod arguments;
pub mod cache;
pub mod config;
pub mod errors;
pub mod filtering;
pub mod logger;
pub mod records;
pub mod store;

#[cfg(feature = "web")]
pub mod webserver;
