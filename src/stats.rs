//! Read-only query and reporting layer over the streak store.
//!
//! Everything here is a pure read: overviews, per-day detail, integrity
//! diagnostics, per-user aggregates, and the time-series export consumed by
//! charting and animation frontends. All operations tolerate an empty store
//! by returning empty or zero-valued results.

use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{
    mean, DayDetail, DayResult, Diagnostics, Overview, ScoreDistribution, TimeSeries, UserSeries,
    UserStats,
};
use crate::schema::{results, streaks, users};
use crate::score::Score;

/// Brief overview: counts plus the sorted user list.
pub fn overview(db: &Database) -> Result<Overview> {
    let conn = db.connect()?;

    let total_days = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", streaks::TABLE),
        [],
        |row| row.get(0),
    )?;
    let total_users = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", users::TABLE),
        [],
        |row| row.get(0),
    )?;
    let total_results = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", results::TABLE),
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY {}",
        users::USERNAME,
        users::TABLE,
        users::USERNAME
    ))?;
    let users = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(Overview {
        total_days,
        total_users,
        total_results,
        users,
    })
}

/// All stored day numbers, ascending.
pub fn list_days(db: &Database) -> Result<Vec<u32>> {
    let conn = db.connect()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY {}",
        streaks::DAY,
        streaks::TABLE,
        streaks::DAY
    ))?;
    let days = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<u32>>>()?;
    Ok(days)
}

/// The newest `limit` day numbers, ascending.
pub fn recent_days(db: &Database, limit: u32) -> Result<Vec<u32>> {
    let conn = db.connect()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY {} DESC LIMIT ?",
        streaks::DAY,
        streaks::TABLE,
        streaks::DAY
    ))?;
    let mut days = stmt
        .query_map(params![limit], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<u32>>>()?;
    days.reverse();
    Ok(days)
}

/// Full detail for one day, or `None` when the day is unknown.
pub fn day_detail(db: &Database, day: u32) -> Result<Option<DayDetail>> {
    let conn = db.connect()?;

    let imported_at = conn
        .query_row(
            &format!(
                "SELECT {} FROM {} WHERE {} = ?",
                streaks::IMPORTED_AT,
                streaks::TABLE,
                streaks::DAY
            ),
            params![day],
            |row| row.get(0),
        )
        .optional()?;

    let Some(imported_at) = imported_at else {
        debug!(day, "day detail requested for unknown day");
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT u.{}, r.{}, r.{} FROM {} r JOIN {} u ON r.{} = u.{} WHERE r.{} = ?",
        users::USERNAME,
        results::SCORE,
        results::IS_WINNER,
        results::TABLE,
        users::TABLE,
        results::USER_ID,
        users::ID,
        results::STREAK_DAY
    ))?;
    let mut day_results = stmt
        .query_map(params![day], |row| {
            Ok(DayResult {
                username: row.get(0)?,
                score: row.get(1)?,
                is_winner: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    day_results.sort_by(|a, b| {
        a.score
            .rank()
            .cmp(&b.score.rank())
            .then_with(|| a.username.cmp(&b.username))
    });

    Ok(Some(DayDetail {
        day,
        imported_at,
        results: day_results,
    }))
}

/// Days stored within `window` of the requested day; context for a
/// not-found lookup.
pub fn nearby_days(db: &Database, day: u32, window: u32) -> Result<Vec<u32>> {
    let conn = db.connect()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} WHERE {} BETWEEN ? AND ? ORDER BY {}",
        streaks::DAY,
        streaks::TABLE,
        streaks::DAY,
        streaks::DAY
    ))?;
    let days = stmt
        .query_map(
            params![day.saturating_sub(window), day.saturating_add(window)],
            |row| row.get(0),
        )?
        .collect::<rusqlite::Result<Vec<u32>>>()?;
    Ok(days)
}

/// Integrity diagnostics over the stored day set. Findings are reported,
/// never repaired.
pub fn diagnostics(db: &Database) -> Result<Diagnostics> {
    let days = list_days(db)?;
    let conn = db.connect()?;

    // Duplicate day numbers should be impossible under the uniqueness
    // constraint; a hit here is a data-integrity bug.
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} GROUP BY {} HAVING COUNT(*) > 1 ORDER BY {}",
        streaks::DAY,
        streaks::TABLE,
        streaks::DAY,
        streaks::DAY
    ))?;
    let duplicate_days = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<u32>>>()?;

    let orphaned_results = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} r WHERE r.{} NOT IN (SELECT {} FROM {})",
            results::TABLE,
            results::STREAK_DAY,
            streaks::DAY,
            streaks::TABLE
        ),
        [],
        |row| row.get(0),
    )?;
    let orphaned_users = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} u WHERE u.{} NOT IN (SELECT DISTINCT {} FROM {})",
            users::TABLE,
            users::ID,
            results::USER_ID,
            results::TABLE
        ),
        [],
        |row| row.get(0),
    )?;

    let day_range = match (days.first(), days.last()) {
        (Some(&min), Some(&max)) => Some((min, max)),
        _ => None,
    };

    let gaps = find_gaps(&days);
    let missing_days = gaps
        .iter()
        .flat_map(|&(first, last)| first..=last)
        .collect();

    Ok(Diagnostics {
        total_days: days.len() as u64,
        day_range,
        missing_days,
        duplicate_days,
        gaps,
        orphaned_results,
        orphaned_users,
    })
}

/// Aggregate statistics for every user, ordered by games played (desc) then
/// username.
pub fn user_stats(db: &Database) -> Result<Vec<UserStats>> {
    let total_days = list_days(db)?.len() as u64;
    let conn = db.connect()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT u.{}, r.{}, r.{}, r.{} FROM {} u \
         LEFT JOIN {} r ON u.{} = r.{} \
         ORDER BY u.{}, r.{}",
        users::USERNAME,
        results::STREAK_DAY,
        results::SCORE,
        results::IS_WINNER,
        users::TABLE,
        results::TABLE,
        users::ID,
        results::USER_ID,
        users::USERNAME,
        results::STREAK_DAY
    ))?;

    type ResultRow = (String, Option<u32>, Option<Score>, Option<bool>);
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<Vec<ResultRow>>>()?;

    // Preserve every user, including those with zero results.
    let mut per_user: BTreeMap<String, Vec<(u32, Score, bool)>> = BTreeMap::new();
    for (username, day, score, is_winner) in rows {
        let entry = per_user.entry(username).or_default();
        if let (Some(day), Some(score), Some(is_winner)) = (day, score, is_winner) {
            entry.push((day, score, is_winner));
        }
    }

    let mut stats: Vec<UserStats> = per_user
        .into_iter()
        .map(|(username, games)| build_user_stats(username, &games, total_days))
        .collect();

    stats.sort_by(|a, b| {
        b.games_played
            .cmp(&a.games_played)
            .then_with(|| a.username.cmp(&b.username))
    });
    Ok(stats)
}

/// Per-user time series over the full observed day axis.
pub fn time_series(db: &Database) -> Result<TimeSeries> {
    let days = list_days(db)?;
    let conn = db.connect()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT u.{}, r.{}, r.{} FROM {} r JOIN {} u ON r.{} = u.{} ORDER BY u.{}, r.{}",
        users::USERNAME,
        results::STREAK_DAY,
        results::SCORE,
        results::TABLE,
        users::TABLE,
        results::USER_ID,
        users::ID,
        users::USERNAME,
        results::STREAK_DAY
    ))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, Score>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut per_user: BTreeMap<String, BTreeMap<u32, Score>> = BTreeMap::new();
    for (username, day, score) in rows {
        per_user.entry(username).or_default().insert(day, score);
    }

    let users = per_user
        .into_iter()
        .map(|(username, scores)| UserSeries {
            username,
            points: days
                .iter()
                .map(|day| scores.get(day).map(|s| s.rank()))
                .collect(),
        })
        .collect();

    Ok(TimeSeries { days, users })
}

#[allow(clippy::cast_precision_loss)]
fn build_user_stats(username: String, games: &[(u32, Score, bool)], total_days: u64) -> UserStats {
    let mut distribution = ScoreDistribution::default();
    let mut wins = 0u64;
    for &(_, score, is_winner) in games {
        distribution.record(score);
        if is_winner {
            wins += 1;
        }
    }

    let average_score = mean(games.iter().filter_map(|&(_, score, _)| score.numeric()));

    let days_played: Vec<u32> = games.iter().map(|&(day, _, _)| day).collect();
    let average_gap = average_gap(&days_played);

    let participation_rate = if total_days == 0 {
        0.0
    } else {
        days_played.len() as f64 / total_days as f64
    };

    UserStats {
        username,
        games_played: games.len() as u64,
        distribution,
        wins,
        average_score,
        participation_rate,
        longest_streak: longest_consecutive_streak(&days_played),
        average_gap,
        consistency_score: 1.0 / (1.0 + average_gap),
    }
}

/// Longest run of consecutive day numbers. `days` must be sorted ascending.
fn longest_consecutive_streak(days: &[u32]) -> u32 {
    if days.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut current = 1;
    for pair in days.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

/// Mean number of skipped days between played days; 0 when fully
/// consecutive. `days` must be sorted ascending.
#[allow(clippy::cast_precision_loss)]
fn average_gap(days: &[u32]) -> f64 {
    let gaps: Vec<u32> = days
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > 1)
        .map(|pair| pair[1] - pair[0] - 1)
        .collect();

    if gaps.is_empty() {
        0.0
    } else {
        f64::from(gaps.iter().sum::<u32>()) / gaps.len() as f64
    }
}

/// Runs of missing days inside a sorted, ascending day list.
fn find_gaps(days: &[u32]) -> Vec<(u32, u32)> {
    days.windows(2)
        .filter(|pair| pair[1] - pair[0] > 1)
        .map(|pair| (pair[0] + 1, pair[1] - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_consecutive_streak() {
        assert_eq!(longest_consecutive_streak(&[]), 0);
        assert_eq!(longest_consecutive_streak(&[5]), 1);
        assert_eq!(longest_consecutive_streak(&[1, 2, 3, 7, 8]), 3);
        assert_eq!(longest_consecutive_streak(&[1, 3, 5]), 1);
    }

    #[test]
    fn test_average_gap_and_consistency() {
        // consecutive days have no gap
        assert!((average_gap(&[1, 2, 3]) - 0.0).abs() < f64::EPSILON);
        // 1 -> 4 skips two days
        assert!((average_gap(&[1, 4]) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_gaps() {
        assert!(find_gaps(&[1, 2, 3]).is_empty());
        assert_eq!(find_gaps(&[1, 2, 4]), vec![(3, 3)]);
        assert_eq!(find_gaps(&[1, 5, 6, 9]), vec![(2, 4), (7, 8)]);
    }
}
