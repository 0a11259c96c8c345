//! Storage seam used by the favicon resolver.
//!
//! The resolver only needs get/upsert/delete by domain. `CacheDb` is the
//! production implementation; anything else (a shared relational store, an
//! in-process map) can stand in by implementing [`FaviconStore`].

use async_trait::async_trait;

use super::connection::CacheDb;
use super::favicons::FaviconRecord;
use crate::Error;

/// Domain-keyed favicon store.
#[async_trait]
pub trait FaviconStore: Send + Sync {
    async fn get(&self, domain: &str) -> Result<Option<FaviconRecord>, Error>;

    /// Insert or overwrite, stamping the record with the current time.
    async fn upsert(&self, domain: &str, favicon_url: &str, size: &str, format: &str) -> Result<(), Error>;

    /// Returns true when a record was removed.
    async fn delete(&self, domain: &str) -> Result<bool, Error>;
}

#[async_trait]
impl FaviconStore for CacheDb {
    async fn get(&self, domain: &str) -> Result<Option<FaviconRecord>, Error> {
        self.get_favicon(domain).await
    }

    async fn upsert(&self, domain: &str, favicon_url: &str, size: &str, format: &str) -> Result<(), Error> {
        self.upsert_favicon(&FaviconRecord::new(domain, favicon_url, size, format))
            .await
    }

    async fn delete(&self, domain: &str) -> Result<bool, Error> {
        Ok(self.delete_favicon(domain).await? > 0)
    }
}
