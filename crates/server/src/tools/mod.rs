//! MCP tool implementations.
//!
//! This module contains all tools exposed by the icondex server.

pub mod cache;
pub mod resolve;
pub mod scan;
