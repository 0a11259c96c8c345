//! Core types and shared functionality for icondex.
//!
//! This crate provides:
//! - Favicon cache with SQLite backend and the `FaviconStore` seam
//! - Unified error types
//! - Configuration structures and provider descriptors

pub mod cache;
pub mod config;
pub mod error;
pub mod provider;

pub use cache::{CacheDb, FaviconRecord, FaviconStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use provider::Provider;
