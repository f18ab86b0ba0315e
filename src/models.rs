//! Data models for streak tracking and reporting
//!
//! This module contains the structures used throughout the application:
//! ingestion summaries and read-only report shapes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::score::{Score, ALL_SCORES};

/// One stored result joined with its username, for per-day reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayResult {
    /// Participant username
    pub username: String,
    /// Score token for the day
    pub score: Score,
    /// True when the crown marked this user as the day's winner
    pub is_winner: bool,
}

/// Summary returned by a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Day number the message was ingested into
    pub day: u32,
    /// Total results stored for the day after the commit
    pub results_added: u64,
    /// Usernames touched by this message, in parse order
    pub users_touched: Vec<String>,
}

/// Brief store overview
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overview {
    /// Number of streak days
    pub total_days: u64,
    /// Number of users
    pub total_users: u64,
    /// Number of stored results
    pub total_results: u64,
    /// All usernames, sorted
    pub users: Vec<String>,
}

/// Full detail for one streak day
#[derive(Debug, Clone, Serialize)]
pub struct DayDetail {
    /// Day number
    pub day: u32,
    /// When the day was first imported
    pub imported_at: NaiveDateTime,
    /// Participants with scores, sorted by rank then username
    pub results: Vec<DayResult>,
}

impl DayDetail {
    /// Number of participants for the day.
    #[must_use]
    pub fn participants(&self) -> usize {
        self.results.len()
    }

    /// Usernames flagged as winners.
    #[must_use]
    pub fn winners(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.is_winner)
            .map(|r| r.username.as_str())
            .collect()
    }

    /// Mean score over solves only (`X` excluded), if anyone solved.
    #[must_use]
    pub fn average_score(&self) -> Option<f64> {
        mean(self.results.iter().filter_map(|r| r.score.numeric()))
    }

    /// Count of failed solves.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.score.is_fail()).count()
    }

    /// Best (lowest-ranked) score achieved, `X` excluded.
    #[must_use]
    pub fn best_score(&self) -> Option<Score> {
        self.results
            .iter()
            .map(|r| r.score)
            .filter(|s| !s.is_fail())
            .min()
    }
}

/// Integrity findings over the stored day set. Diagnostic only: findings are
/// reported, never auto-repaired.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Number of stored streak days
    pub total_days: u64,
    /// Observed `(min, max)` day range, `None` on an empty store
    pub day_range: Option<(u32, u32)>,
    /// Days absent inside the observed range
    pub missing_days: Vec<u32>,
    /// Duplicate day numbers; should be impossible under the uniqueness
    /// invariant, surfacing one is a data-integrity bug
    pub duplicate_days: Vec<u32>,
    /// Runs of missing days as `(first, last)` pairs
    pub gaps: Vec<(u32, u32)>,
    /// Results referencing a nonexistent streak day
    pub orphaned_results: u64,
    /// Users with zero results
    pub orphaned_users: u64,
}

impl Diagnostics {
    /// True when nothing suspicious was found.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.missing_days.is_empty()
            && self.duplicate_days.is_empty()
            && self.orphaned_results == 0
            && self.orphaned_users == 0
    }
}

/// Per-token score counts for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    counts: [u64; 7],
}

impl ScoreDistribution {
    /// Record one occurrence of a score.
    pub fn record(&mut self, score: Score) {
        self.counts[usize::from(score.rank()) - 1] += 1;
    }

    /// Number of times the given score occurred.
    #[must_use]
    pub const fn count(&self, score: Score) -> u64 {
        self.counts[score.rank() as usize - 1]
    }

    /// Number of failed solves.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.count(Score::Fail)
    }

    /// Iterate `(score, count)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Score, u64)> + '_ {
        ALL_SCORES.into_iter().map(|s| (s, self.count(s)))
    }
}

/// Aggregate statistics for one user
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    /// Username
    pub username: String,
    /// Total games played
    pub games_played: u64,
    /// Per-token score counts
    pub distribution: ScoreDistribution,
    /// Days won (crown)
    pub wins: u64,
    /// Mean score over solves only; `None` when every game was a fail
    pub average_score: Option<f64>,
    /// Days played divided by total stored days
    pub participation_rate: f64,
    /// Longest run of consecutive played days
    pub longest_streak: u32,
    /// Mean gap between played days (0 when fully consecutive)
    pub average_gap: f64,
    /// `1 / (1 + average_gap)`; 1.0 means perfectly consistent
    pub consistency_score: f64,
}

/// One user's score-or-absent value for every day on the shared axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSeries {
    /// Username
    pub username: String,
    /// One entry per day in [`TimeSeries::days`]: the score's rank, or
    /// `None` on days the user did not play
    pub points: Vec<Option<u8>>,
}

/// Time-series export for charting/animation consumers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    /// All stored day numbers, ascending — the shared x axis
    pub days: Vec<u32>,
    /// One series per user
    pub users: Vec<UserSeries>,
}

/// What a day deletion removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    /// Day number deleted
    pub day: u32,
    /// Results removed alongside the day
    pub results_deleted: u64,
}

/// Mean over an iterator of numeric scores.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: impl Iterator<Item = u8>) -> Option<f64> {
    let mut sum = 0u64;
    let mut count = 0u64;
    for v in values {
        sum += u64::from(v);
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
