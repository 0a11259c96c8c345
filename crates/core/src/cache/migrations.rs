//! Favicon cache schema versions.
//!
//! `schema_version` holds one row per applied step. Steps run in ascending
//! order inside their own transaction, so a failed step leaves the previous
//! version in place.

use super::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

/// Schema steps, keyed by the version they bring the cache to.
const STEPS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_favicons.sql"))];

/// Latest schema version this build knows how to create.
const LATEST: i64 = STEPS[STEPS.len() - 1].0;

fn current_version(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
}

/// Bring the cache schema up to [`LATEST`] and return the resulting version.
///
/// A database already at a newer version than this build is left untouched.
pub async fn run(conn: &Connection) -> Result<i64, Error> {
    conn.call(|conn| -> Result<i64, Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )?;

        let found = current_version(conn)?;
        let mut version = found;

        for &(step, sql) in STEPS.iter().filter(|(step, _)| *step > found) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("schema version {step}: {e}")))?;
            tx.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![step, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;

            tracing::debug!(from = version, to = step, "favicon cache schema upgraded");
            version = step;
        }

        if version == found {
            tracing::debug!(version, latest = LATEST, "favicon cache schema up to date");
        }

        Ok(version)
    })
    .await
    .map_err(Error::from)
}
