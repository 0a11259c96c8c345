//! Favicon record CRUD operations.
//!
//! One row per domain. Writes are upserts, so concurrent resolutions of the
//! same domain simply overwrite each other.

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached favicon resolution for a single domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FaviconRecord {
    pub domain: String,
    pub favicon_url: String,
    pub size: String,
    pub format: String,
    /// RFC 3339 timestamp (UTC, millisecond precision).
    pub last_checked_at: String,
}

/// Format a timestamp the way it is stored, so string comparison orders by time.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl FaviconRecord {
    /// Build a record checked at the current time.
    pub fn new(
        domain: impl Into<String>, favicon_url: impl Into<String>, size: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self::checked_at(domain, favicon_url, size, format, Utc::now())
    }

    /// Build a record with an explicit check time.
    pub fn checked_at(
        domain: impl Into<String>, favicon_url: impl Into<String>, size: impl Into<String>,
        format: impl Into<String>, at: DateTime<Utc>,
    ) -> Self {
        Self {
            domain: domain.into(),
            favicon_url: favicon_url.into(),
            size: size.into(),
            format: format.into(),
            last_checked_at: format_timestamp(at),
        }
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.last_checked_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// A record is stale once it is older than `ttl`. Unreadable timestamps count as stale.
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.last_checked() {
            Some(checked) => now - checked > ttl,
            None => true,
        }
    }
}

impl CacheDb {
    /// Insert or overwrite the record for `record.domain`.
    pub async fn upsert_favicon(&self, record: &FaviconRecord) -> Result<(), Error> {
        let record = record.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO favicons (domain, favicon_url, size, format, last_checked_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(domain) DO UPDATE SET
                        favicon_url = excluded.favicon_url,
                        size = excluded.size,
                        format = excluded.format,
                        last_checked_at = excluded.last_checked_at",
                    params![
                        &record.domain,
                        &record.favicon_url,
                        &record.size,
                        &record.format,
                        &record.last_checked_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the record for a domain.
    ///
    /// Returns None if the domain has never been resolved or was cleared.
    pub async fn get_favicon(&self, domain: &str) -> Result<Option<FaviconRecord>, Error> {
        let domain = domain.to_string();
        self.conn
            .call(move |conn| -> Result<Option<FaviconRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT domain, favicon_url, size, format, last_checked_at
                    FROM favicons WHERE domain = ?1",
                )?;

                let result = stmt.query_row(params![domain], |row| {
                    Ok(FaviconRecord {
                        domain: row.get(0)?,
                        favicon_url: row.get(1)?,
                        size: row.get(2)?,
                        format: row.get(3)?,
                        last_checked_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete the record for a domain.
    ///
    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete_favicon(&self, domain: &str) -> Result<u64, Error> {
        let domain = domain.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM favicons WHERE domain = ?1", params![domain])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete records last checked more than `age` ago.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_favicons_older_than(&self, age: Duration) -> Result<u64, Error> {
        let cutoff = Utc::now()
            .checked_sub_signed(age)
            .map(format_timestamp)
            .ok_or_else(|| Error::InvalidInput(format!("age out of range: {age}")))?;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM favicons WHERE last_checked_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Purge least recently checked records until count <= max_entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_lru_favicons(&self, max_entries: usize) -> Result<u64, Error> {
        let max = max_entries as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM favicons", [], |row| row.get(0))?;
                if count <= max {
                    return Ok(0);
                }

                let to_delete = count - max;
                let deleted = conn.execute(
                    "DELETE FROM favicons WHERE domain IN (
                    SELECT domain FROM favicons ORDER BY last_checked_at ASC LIMIT ?1
                )",
                    params![to_delete],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached domains.
    pub async fn count_favicons(&self) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM favicons", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_aged(domain: &str, days: i64) -> FaviconRecord {
        FaviconRecord::checked_at(
            domain,
            format!("https://{domain}/favicon.ico"),
            "32",
            "ico",
            Utc::now() - Duration::days(days),
        )
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let record = FaviconRecord::new("example.com", "https://example.com/favicon.ico", "32", "ico");

        db.upsert_favicon(&record).await.unwrap();

        let retrieved = db.get_favicon("example.com").await.unwrap().unwrap();
        assert_eq!(retrieved, record);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_favicon("nonexistent.org").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_favicon(&FaviconRecord::new("example.com", "https://a/1.png", "32", "png"))
            .await
            .unwrap();
        db.upsert_favicon(&FaviconRecord::new("example.com", "https://a/2.svg", "default", "svg"))
            .await
            .unwrap();

        let retrieved = db.get_favicon("example.com").await.unwrap().unwrap();
        assert_eq!(retrieved.favicon_url, "https://a/2.svg");
        assert_eq!(retrieved.size, "default");
        assert_eq!(db.count_favicons().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_favicon(&record_aged("example.com", 0)).await.unwrap();

        assert_eq!(db.delete_favicon("example.com").await.unwrap(), 1);
        assert_eq!(db.delete_favicon("example.com").await.unwrap(), 0);
        assert!(db.get_favicon("example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_older_than() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_favicon(&record_aged("old.com", 40)).await.unwrap();
        db.upsert_favicon(&record_aged("new.com", 1)).await.unwrap();

        let deleted = db.purge_favicons_older_than(Duration::days(30)).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_favicon("old.com").await.unwrap().is_none());
        assert!(db.get_favicon("new.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_older_than_out_of_range_age() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_favicon(&record_aged("a.com", 1)).await.unwrap();

        let result = db.purge_favicons_older_than(Duration::MAX).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(db.count_favicons().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_purge_lru() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_favicon(&record_aged("a.com", 3)).await.unwrap();
        db.upsert_favicon(&record_aged("b.com", 2)).await.unwrap();
        db.upsert_favicon(&record_aged("c.com", 1)).await.unwrap();

        let deleted = db.purge_lru_favicons(2).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_favicon("a.com").await.unwrap().is_none());
        assert_eq!(db.count_favicons().await.unwrap(), 2);

        assert_eq!(db.purge_lru_favicons(5).await.unwrap(), 0);
    }

    #[test]
    fn test_staleness_window() {
        let now = Utc::now();
        let ttl = Duration::days(30);

        let fresh = FaviconRecord::checked_at("a.com", "u", "32", "ico", now - Duration::days(29));
        assert!(!fresh.is_stale(ttl, now));

        let inside = FaviconRecord::checked_at("a.com", "u", "32", "ico", now - ttl + Duration::seconds(1));
        assert!(!inside.is_stale(ttl, now));

        let stale = FaviconRecord::checked_at("a.com", "u", "32", "ico", now - Duration::days(31));
        assert!(stale.is_stale(ttl, now));
    }

    #[test]
    fn test_unparsable_timestamp_is_stale() {
        let record = FaviconRecord { last_checked_at: "yesterday".into(), ..record_aged("a.com", 0) };
        assert!(record.last_checked().is_none());
        assert!(record.is_stale(Duration::days(30), Utc::now()));
    }
}
