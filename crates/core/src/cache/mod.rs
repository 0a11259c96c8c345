//! SQLite-backed favicon cache.
//!
//! This module provides a persistent, domain-keyed cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Upsert-by-domain storage of resolved favicons
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Purge strategies (domain, age, LRU)

pub mod connection;
pub mod favicons;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use favicons::FaviconRecord;
pub use store::FaviconStore;
