//! Client code for icondex.
//!
//! This crate provides the timed fetch pipeline, the provider waterfall
//! resolver, the site icon scanner and the `FaviconService` that ties them
//! together for the server.

pub mod default_icon;
pub mod fetch;
pub mod resolve;
pub mod scan;
pub mod service;

pub use default_icon::{DEFAULT_ICON_FORMAT, DEFAULT_ICON_SIZE, default_icon};
pub use fetch::{FetchConfig, FetchFailure, FetchMode, FetchOptions, FetchOutcome, TimedFetcher, extract_domain};
pub use resolve::{FaviconResolver, IconSource, ResolvedIcon, ResolverConfig};
pub use scan::{CandidateKind, IconCandidate, ScanConfig, SiteScanner};
pub use service::FaviconService;
