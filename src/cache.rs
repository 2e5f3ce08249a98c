use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::error::PipelineError;

/// SQLite record of hours whose report has already been written.
///
/// Only the orchestrating thread touches it; workers never see the connection.
pub struct ReportCache {
    conn: Connection,
}

impl ReportCache {
    pub fn open(path: &Path) -> Result<Self, PipelineError> {
        let start_time = Instant::now();
        let conn = Connection::open(path)?;
        Self::init(conn, start_time, Some(path))
    }

    pub fn open_in_memory() -> Result<Self, PipelineError> {
        Self::init(Connection::open_in_memory()?, Instant::now(), None)
    }

    fn init(conn: Connection, start_time: Instant, path: Option<&Path>) -> Result<Self, PipelineError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS dumps_cache(
                date_id TEXT PRIMARY KEY,
                path TEXT NOT NULL
            )",
            [],
        )?;

        info!(
            action = "open",
            component = "report_cache",
            path = ?path,
            duration_ms = start_time.elapsed().as_millis(),
            "Report cache ready"
        );
        Ok(Self { conn })
    }

    pub fn get(&self, hour_key: &str) -> Result<Option<PathBuf>, PipelineError> {
        let path: Option<String> = self
            .conn
            .query_row(
                "SELECT path FROM dumps_cache WHERE date_id = ?1",
                params![hour_key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(path.map(PathBuf::from))
    }

    pub fn insert(&self, hour_key: &str, path: &Path) -> Result<(), PipelineError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO dumps_cache(date_id, path) VALUES (?1, ?2)",
            params![hour_key, path.to_string_lossy().into_owned()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let cache = ReportCache::open_in_memory().unwrap();
        assert_eq!(cache.get("20200101010000").unwrap(), None);

        cache
            .insert("20200101010000", Path::new("/dumps/20200101010000"))
            .unwrap();
        assert_eq!(
            cache.get("20200101010000").unwrap(),
            Some(PathBuf::from("/dumps/20200101010000"))
        );
    }

    #[test]
    fn insert_replaces_previous_path() {
        let cache = ReportCache::open_in_memory().unwrap();
        cache.insert("k", Path::new("/a/k")).unwrap();
        cache.insert("k", Path::new("/b/k")).unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(PathBuf::from("/b/k")));
    }

    #[test]
    fn persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cache.db");

        ReportCache::open(&db)
            .unwrap()
            .insert("k", Path::new("/dumps/k"))
            .unwrap();
        assert_eq!(
            ReportCache::open(&db).unwrap().get("k").unwrap(),
            Some(PathBuf::from("/dumps/k"))
        );
    }
}
