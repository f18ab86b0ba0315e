//! Ingestion service: applies parsed streak messages to the store.
//!
//! One message is one transaction. The streak day is created if absent
//! (an existing day and its import timestamp are left untouched), users are
//! created on first sight keyed by exact username, and each `(day, user)`
//! result is upserted with last-write-wins semantics. Any storage failure
//! rolls the whole message back; ingestion is all-or-nothing per message,
//! never per result.

use std::time::Instant;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::metrics;
use crate::models::IngestOutcome;
use crate::parser::{parse_message, ParsedResult, ParsedStreak};
use crate::schema::{results, streaks, users};
use crate::score::Score;

/// Parse a raw message and ingest it in one step.
///
/// Parse failures are surfaced before any store mutation happens.
pub fn ingest_message(db: &Database, message: &str) -> Result<IngestOutcome> {
    let parsed = parse_message(message).inspect_err(|_| metrics::record_parse_error())?;
    ingest(db, &parsed)
}

/// Apply one [`ParsedStreak`] to the store as a single transaction.
pub fn ingest(db: &Database, parsed: &ParsedStreak) -> Result<IngestOutcome> {
    let started = Instant::now();
    let mut conn = db.connect()?;
    let tx = conn.transaction()?;

    ensure_day(&tx, parsed.day)?;

    let mut users_touched = Vec::with_capacity(parsed.results.len());
    for result in &parsed.results {
        let user_id = ensure_user(&tx, &result.username)?;
        upsert_result(&tx, parsed.day, user_id, result)?;
        users_touched.push(result.username.clone());
    }

    let results_added: u64 = tx.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            results::TABLE,
            results::STREAK_DAY
        ),
        params![parsed.day],
        |row| row.get(0),
    )?;

    tx.commit()?;

    metrics::record_ingest(parsed.results.len(), started.elapsed());
    info!(
        day = parsed.day,
        results = parsed.results.len(),
        "ingested streak message"
    );

    Ok(IngestOutcome {
        day: parsed.day,
        results_added,
        users_touched,
    })
}

/// Create the streak day row if it does not exist. An existing row keeps its
/// `imported_at`; re-imports for a known day proceed without error.
fn ensure_day(conn: &Connection, day: u32) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?, ?)",
            streaks::TABLE,
            streaks::DAY,
            streaks::IMPORTED_AT
        ),
        params![day, Utc::now().naive_utc()],
    )?;
    Ok(())
}

/// Create the user on first sight (exact username match, no fuzzy merging)
/// and return its id.
fn ensure_user(conn: &Connection, username: &str) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?, ?)",
            users::TABLE,
            users::USERNAME,
            users::FIRST_SEEN
        ),
        params![username, Utc::now().naive_utc()],
    )?;

    let id = conn.query_row(
        &format!(
            "SELECT {} FROM {} WHERE {} = ?",
            users::ID,
            users::TABLE,
            users::USERNAME
        ),
        params![username],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Insert or overwrite the result for `(day, user)`. Last write wins; an
/// overwrite that changes the stored value is logged.
fn upsert_result(conn: &Connection, day: u32, user_id: i64, result: &ParsedResult) -> Result<()> {
    let existing: Option<(Score, bool)> = conn
        .query_row(
            &format!(
                "SELECT {}, {} FROM {} WHERE {} = ? AND {} = ?",
                results::SCORE,
                results::IS_WINNER,
                results::TABLE,
                results::STREAK_DAY,
                results::USER_ID
            ),
            params![day, user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    if let Some((old_score, old_winner)) = existing {
        if old_score != result.score || old_winner != result.is_winner {
            metrics::record_overwrite();
            warn!(
                day,
                username = %result.username,
                old_score = %old_score,
                new_score = %result.score,
                "overwriting existing result"
            );
        }
    }

    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
            results::TABLE,
            results::STREAK_DAY,
            results::USER_ID,
            results::SCORE,
            results::IS_WINNER
        ),
        params![day, user_id, result.score, result.is_winner],
    )?;
    Ok(())
}
