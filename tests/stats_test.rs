use streak_tracker::db::Database;
use streak_tracker::ingest::ingest_message;
use streak_tracker::score::Score;
use streak_tracker::stats;

fn temp_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db = Database::new(dir.path().join("test.db")).expect("Failed to create database");
    (dir, db)
}

fn seed(db: &Database, messages: &[&str]) {
    for message in messages {
        ingest_message(db, message).expect("ingestion failed");
    }
}

#[test]
fn test_empty_store_reports_cleanly() {
    let (_dir, db) = temp_db();

    let overview = stats::overview(&db).expect("overview failed");
    assert_eq!(overview.total_days, 0);
    assert!(overview.users.is_empty());

    let diag = stats::diagnostics(&db).expect("diagnostics failed");
    assert!(diag.is_healthy());
    assert!(diag.day_range.is_none());

    assert!(stats::user_stats(&db).expect("user stats failed").is_empty());

    let series = stats::time_series(&db).expect("time series failed");
    assert!(series.days.is_empty());
    assert!(series.users.is_empty());
}

#[test]
fn test_diagnostics_find_gaps_in_day_sequence() {
    let (_dir, db) = temp_db();
    seed(
        &db,
        &[
            "1 day streak 3/6: @Alice",
            "2 day streak 4/6: @Alice",
            "4 day streak 2/6: @Alice",
            // Re-import of day 4: merges, never duplicates
            "4 day streak 2/6: @Alice",
        ],
    );

    let diag = stats::diagnostics(&db).expect("diagnostics failed");
    assert_eq!(diag.total_days, 3);
    assert_eq!(diag.day_range, Some((1, 4)));
    assert_eq!(diag.missing_days, vec![3]);
    assert_eq!(diag.gaps, vec![(3, 3)]);
    assert!(diag.duplicate_days.is_empty());
    assert_eq!(diag.orphaned_results, 0);
    assert_eq!(diag.orphaned_users, 0);
    assert!(!diag.is_healthy());
}

#[test]
fn test_diagnostics_count_orphaned_users() {
    let (_dir, db) = temp_db();
    seed(&db, &["6 day streak 5/6: @Gone@Stays"]);

    // Delete Gone's result directly, leaving the user row behind.
    let conn = db.connect().expect("Failed to get database connection");
    conn.execute(
        "DELETE FROM results WHERE user_id = (SELECT id FROM users WHERE username = 'Gone')",
        [],
    )
    .expect("delete failed");

    let diag = stats::diagnostics(&db).expect("diagnostics failed");
    assert_eq!(diag.orphaned_users, 1);
}

#[test]
fn test_day_detail_sorts_and_summarizes() {
    let (_dir, db) = temp_db();
    seed(&db, &["20 day streak 👑 2/6: @Zoe 5/6: @Ann X/6: @Max"]);

    let detail = stats::day_detail(&db, 20)
        .expect("query failed")
        .expect("day should exist");

    // Sorted by rank then username, fails last
    let order: Vec<&str> = detail.results.iter().map(|r| r.username.as_str()).collect();
    assert_eq!(order, vec!["Zoe", "Ann", "Max"]);

    assert_eq!(detail.winners(), vec!["Zoe"]);
    assert_eq!(detail.failures(), 1);
    assert_eq!(detail.best_score(), Some(Score::Two));
    // Average over solves only: (2 + 5) / 2
    let avg = detail.average_score().expect("average should exist");
    assert!((avg - 3.5).abs() < f64::EPSILON);
}

#[test]
fn test_day_detail_unknown_day_and_nearby() {
    let (_dir, db) = temp_db();
    seed(
        &db,
        &["10 day streak 3/6: @Alice", "13 day streak 3/6: @Alice"],
    );

    assert!(stats::day_detail(&db, 12).expect("query failed").is_none());
    assert_eq!(
        stats::nearby_days(&db, 12, 3).expect("query failed"),
        vec![10, 13]
    );
    // Window saturates at day zero instead of underflowing
    assert_eq!(
        stats::nearby_days(&db, 1, 5).expect("query failed"),
        vec![10]
    );
}

#[test]
fn test_nearby_days_saturates_at_day_limits() {
    let (_dir, db) = temp_db();
    seed(&db, &["4294967290 day streak 3/6: @Max"]);

    // The window clamps at u32::MAX instead of overflowing
    assert_eq!(
        stats::nearby_days(&db, u32::MAX, 5).expect("query failed"),
        vec![4_294_967_290]
    );
    assert_eq!(
        stats::nearby_days(&db, u32::MAX, 2).expect("query failed"),
        Vec::<u32>::new()
    );
}

#[test]
fn test_recent_days_returns_newest_ascending() {
    let (_dir, db) = temp_db();
    seed(
        &db,
        &[
            "1 day streak 3/6: @Ann",
            "2 day streak 3/6: @Ann",
            "5 day streak 3/6: @Ann",
            "9 day streak 3/6: @Ann",
        ],
    );

    assert_eq!(stats::recent_days(&db, 2).expect("query failed"), vec![5, 9]);
    assert_eq!(
        stats::recent_days(&db, 10).expect("query failed"),
        vec![1, 2, 5, 9]
    );
}

#[test]
fn test_user_stats_average_excludes_failures() {
    let (_dir, db) = temp_db();
    seed(
        &db,
        &[
            "1 day streak 👑 2/6: @Alice 4/6: @Bob",
            "2 day streak X/6: @Alice 3/6: @Bob",
            "3 day streak 👑 4/6: @Alice",
        ],
    );

    let all = stats::user_stats(&db).expect("user stats failed");
    assert_eq!(all.len(), 2);

    // Sorted by games played desc, then username
    let alice = &all[0];
    assert_eq!(alice.username, "Alice");
    assert_eq!(alice.games_played, 3);
    assert_eq!(alice.wins, 2);
    assert_eq!(alice.distribution.failures(), 1);
    // (2 + 4) / 2 — the failed day is excluded, not counted as 7
    let avg = alice.average_score.expect("average should exist");
    assert!((avg - 3.0).abs() < f64::EPSILON);
    assert!((alice.participation_rate - 1.0).abs() < f64::EPSILON);
    assert_eq!(alice.longest_streak, 3);
    assert!((alice.consistency_score - 1.0).abs() < f64::EPSILON);

    let bob = &all[1];
    assert_eq!(bob.username, "Bob");
    assert_eq!(bob.games_played, 2);
    assert_eq!(bob.wins, 0);
    assert!((bob.participation_rate - 2.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_user_stats_all_failures_has_no_average() {
    let (_dir, db) = temp_db();
    seed(&db, &["4 day streak X/6: @Rex"]);

    let all = stats::user_stats(&db).expect("user stats failed");
    assert_eq!(all[0].average_score, None);
    assert_eq!(all[0].distribution.failures(), 1);
}

#[test]
fn test_user_stats_gap_lowers_consistency() {
    let (_dir, db) = temp_db();
    // Lia plays days 1 and 4: one gap of two skipped days.
    seed(
        &db,
        &[
            "1 day streak 3/6: @Lia",
            "2 day streak 3/6: @Oz",
            "3 day streak 3/6: @Oz",
            "4 day streak 3/6: @Lia",
        ],
    );

    let all = stats::user_stats(&db).expect("user stats failed");
    let lia = all
        .iter()
        .find(|u| u.username == "Lia")
        .expect("Lia should exist");

    assert!((lia.average_gap - 2.0).abs() < f64::EPSILON);
    assert!((lia.consistency_score - 1.0 / 3.0).abs() < f64::EPSILON);
    assert_eq!(lia.longest_streak, 1);
}

#[test]
fn test_time_series_marks_absent_days_as_none() {
    let (_dir, db) = temp_db();
    seed(
        &db,
        &[
            "1 day streak 2/6: @Alice X/6: @Bob",
            "2 day streak 5/6: @Bob",
            "3 day streak 1/6: @Alice",
        ],
    );

    let series = stats::time_series(&db).expect("time series failed");
    assert_eq!(series.days, vec![1, 2, 3]);

    let alice = &series.users[0];
    assert_eq!(alice.username, "Alice");
    assert_eq!(alice.points, vec![Some(2), None, Some(1)]);

    let bob = &series.users[1];
    assert_eq!(bob.username, "Bob");
    // A failed solve plots at rank 7, not as a hole
    assert_eq!(bob.points, vec![Some(7), Some(5), None]);
}
