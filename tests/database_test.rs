use streak_tracker::db::Database;
use streak_tracker::ingest::{ingest, ingest_message};
use streak_tracker::parser::{ParsedResult, ParsedStreak};
use streak_tracker::score::Score;
use streak_tracker::stats;

fn temp_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db = Database::new(dir.path().join("test.db")).expect("Failed to create database");
    (dir, db)
}

fn result(username: &str, score: Score, is_winner: bool) -> ParsedResult {
    ParsedResult {
        username: username.to_string(),
        score,
        is_winner,
    }
}

#[test]
fn test_database_creation_and_migration() {
    let (_dir, db) = temp_db();
    let conn = db.connect().expect("Failed to get database connection");

    // All three tables exist after migration
    for table in ["users", "streaks", "results"] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                [table],
                |row| row.get(0),
            )
            .expect("schema query failed");
        assert_eq!(count, 1, "missing table {table}");
    }
}

#[test]
fn test_ingest_message_end_to_end() {
    let (_dir, db) = temp_db();

    let outcome = ingest_message(&db, "42 day streak\n👑 3/6: @Alice@Bob 5/6: @Carol")
        .expect("ingestion failed");

    assert_eq!(outcome.day, 42);
    assert_eq!(outcome.results_added, 3);
    assert_eq!(outcome.users_touched, vec!["Alice", "Bob", "Carol"]);

    let detail = stats::day_detail(&db, 42)
        .expect("query failed")
        .expect("day should exist");
    assert_eq!(detail.participants(), 3);
    assert_eq!(detail.winners(), vec!["Alice", "Bob"]);
}

#[test]
fn test_idempotent_day_creation() {
    let (_dir, db) = temp_db();

    ingest_message(&db, "5 day streak 3/6: @Alice").expect("first ingestion failed");
    let first_imported = stats::day_detail(&db, 5)
        .expect("query failed")
        .expect("day should exist")
        .imported_at;

    // Re-import for the same day: no duplicate streak row, results merge in,
    // and the original import timestamp survives.
    ingest_message(&db, "5 day streak 4/6: @Bob").expect("second ingestion failed");

    let days = stats::list_days(&db).expect("query failed");
    assert_eq!(days, vec![5]);

    let detail = stats::day_detail(&db, 5)
        .expect("query failed")
        .expect("day should exist");
    assert_eq!(detail.participants(), 2);
    assert_eq!(detail.imported_at, first_imported);
}

#[test]
fn test_last_write_wins_on_day_user_pair() {
    let (_dir, db) = temp_db();

    ingest_message(&db, "5 day streak 3/6: @Alice").expect("first ingestion failed");
    ingest_message(&db, "5 day streak X/6: @Alice").expect("second ingestion failed");

    let detail = stats::day_detail(&db, 5)
        .expect("query failed")
        .expect("day should exist");
    assert_eq!(detail.participants(), 1);
    assert_eq!(detail.results[0].score, Score::Fail);
}

#[test]
fn test_duplicate_user_in_one_message_later_wins() {
    let (_dir, db) = temp_db();

    let parsed = ParsedStreak {
        day: 8,
        results: vec![
            result("Sam", Score::Four, false),
            result("Sam", Score::Fail, false),
        ],
    };
    let outcome = ingest(&db, &parsed).expect("ingestion failed");

    assert_eq!(outcome.results_added, 1);
    let detail = stats::day_detail(&db, 8)
        .expect("query failed")
        .expect("day should exist");
    assert_eq!(detail.results[0].score, Score::Fail);
}

#[test]
fn test_parse_failure_leaves_store_untouched() {
    let (_dir, db) = temp_db();

    let err = ingest_message(&db, "no marker here 3/6: @Alice");
    assert!(err.is_err());

    // Day numbers start at 1; a zero-day message is rejected whole.
    let err = ingest_message(&db, "0 day streak 3/6: @Alice");
    assert!(err.is_err());

    let overview = stats::overview(&db).expect("query failed");
    assert_eq!(overview.total_days, 0);
    assert_eq!(overview.total_users, 0);
    assert_eq!(overview.total_results, 0);
}

#[test]
fn test_rollback_on_mid_transaction_failure() {
    let (_dir, db) = temp_db();

    // Simulate a storage fault partway through the message: the results
    // table is gone, so the day and user writes succeed inside the
    // transaction but the result upsert fails.
    let conn = db.connect().expect("Failed to get database connection");
    conn.execute("DROP TABLE results", [])
        .expect("drop table failed");
    drop(conn);

    let parsed = ParsedStreak {
        day: 77,
        results: vec![
            result("Alice", Score::One, false),
            result("Bob", Score::Two, false),
            result("Carol", Score::Three, false),
        ],
    };
    assert!(ingest(&db, &parsed).is_err());

    // Nothing from the failed message was persisted.
    let conn = db.connect().expect("Failed to get database connection");
    let streaks: i64 = conn
        .query_row("SELECT COUNT(*) FROM streaks", [], |row| row.get(0))
        .expect("count failed");
    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .expect("count failed");
    assert_eq!(streaks, 0);
    assert_eq!(users, 0);
}

#[test]
fn test_delete_day_cascades_to_results() {
    let (_dir, db) = temp_db();

    ingest_message(&db, "10 day streak 2/6: @Alice@Bob").expect("ingestion failed");
    ingest_message(&db, "11 day streak 3/6: @Alice").expect("ingestion failed");

    let summary = db
        .delete_day(10)
        .expect("delete failed")
        .expect("day should exist");
    assert_eq!(summary.day, 10);
    assert_eq!(summary.results_deleted, 2);

    assert!(stats::day_detail(&db, 10).expect("query failed").is_none());
    let overview = stats::overview(&db).expect("query failed");
    assert_eq!(overview.total_days, 1);
    assert_eq!(overview.total_results, 1);

    // No orphaned results left behind
    let diag = stats::diagnostics(&db).expect("diagnostics failed");
    assert_eq!(diag.orphaned_results, 0);
}

#[test]
fn test_delete_unknown_day_is_not_found() {
    let (_dir, db) = temp_db();
    assert!(db.delete_day(99).expect("delete failed").is_none());
}

#[test]
fn test_wipe_clears_everything() {
    let (_dir, db) = temp_db();

    ingest_message(&db, "1 day streak 2/6: @Alice").expect("ingestion failed");
    ingest_message(&db, "2 day streak X/6: @Bob").expect("ingestion failed");

    db.wipe().expect("wipe failed");

    let overview = stats::overview(&db).expect("query failed");
    assert_eq!(overview.total_days, 0);
    assert_eq!(overview.total_users, 0);
    assert_eq!(overview.total_results, 0);
    assert!(overview.users.is_empty());
}

#[test]
fn test_user_created_on_first_sight_only() {
    let (_dir, db) = temp_db();

    ingest_message(&db, "1 day streak 2/6: @Alice").expect("ingestion failed");
    let first_id = db
        .user_id("Alice")
        .expect("lookup failed")
        .expect("user should exist");

    ingest_message(&db, "2 day streak 5/6: @Alice").expect("ingestion failed");
    let second_id = db
        .user_id("Alice")
        .expect("lookup failed")
        .expect("user should exist");

    assert_eq!(first_id, second_id);
    // Exact-match usernames: no fuzzy merging
    assert!(db.user_id("alice").expect("lookup failed").is_none());
}
