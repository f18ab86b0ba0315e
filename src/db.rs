//! Database access for the streak store.
//!
//! Single-writer model: connections are scoped per logical operation —
//! opened, used, dropped — rather than pooled or held long-lived, so no
//! locking discipline beyond SQLite's own transaction boundaries is needed.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics;
use crate::models::DeleteSummary;
use crate::schema::{results, streaks, users};

/// Handle to the on-disk streak database.
///
/// Cheap to clone; each operation opens its own connection against the
/// stored path.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (creating if necessary) the database at `path` and apply the
    /// schema migrations.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let db = Self { path };
        let conn = db.connect()?;
        Self::run_migrations(&conn)?;
        info!(path = %db.path.display(), "database ready");

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!(
            "../migrations/2025-06-01-000000_create_tables/up.sql"
        ))?;
        Ok(())
    }

    /// Filesystem path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection scoped to one logical operation.
    pub fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Delete one streak day and all its results, transactionally: both
    /// deletes commit together or not at all. Returns `None` when the day
    /// does not exist (expected outcome, not an error).
    pub fn delete_day(&self, day: u32) -> Result<Option<DeleteSummary>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
                streaks::TABLE,
                streaks::DAY
            ),
            params![day],
            |row| row.get(0),
        )?;

        if !exists {
            debug!(day, "delete requested for unknown day");
            return Ok(None);
        }

        let results_deleted = tx.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ?",
                results::TABLE,
                results::STREAK_DAY
            ),
            params![day],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?", streaks::TABLE, streaks::DAY),
            params![day],
        )?;
        tx.commit()?;

        metrics::record_day_deleted(results_deleted);
        info!(day, results_deleted, "deleted streak day");

        Ok(Some(DeleteSummary {
            day,
            results_deleted: results_deleted as u64,
        }))
    }

    /// Irreversibly delete every row in every table. Confirmation is the
    /// caller's responsibility; the store only exposes the operation.
    pub fn wipe(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute(&format!("DELETE FROM {}", results::TABLE), [])?;
        tx.execute(&format!("DELETE FROM {}", streaks::TABLE), [])?;
        tx.execute(&format!("DELETE FROM {}", users::TABLE), [])?;
        tx.commit()?;

        metrics::record_wipe();
        info!("wiped all streak data");
        Ok(())
    }

    /// Look up a user id by exact username.
    pub fn user_id(&self, username: &str) -> Result<Option<i64>> {
        let conn = self.connect()?;
        let id = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE {} = ?",
                    users::ID,
                    users::TABLE,
                    users::USERNAME
                ),
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}
