//! Free-text message parser for streak results.
//!
//! Group-chat messages are irregular: no escaping, inconsistent spacing,
//! emoji prefixes. The parser is built as an explicit staged scanner so the
//! graceful-degradation policy is testable stage by stage:
//!
//! 1. locate the day marker (`"<N> day streak"`) — the only fatal stage,
//! 2. split the text into score blocks at `"[👑]? <token>/6:"` markers,
//! 3. split each block into `@`-prefixed username segments,
//! 4. trim and validate each username.
//!
//! Malformed fragments are skipped silently; only a missing or invalid day
//! marker aborts the whole message.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ParseError;
use crate::score::Score;

/// One extracted result: who scored what, and whether they wore the crown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResult {
    /// Username exactly as written in the message (after trimming)
    pub username: String,
    /// Score token for the day
    pub score: Score,
    /// True when the block was introduced by a crown glyph
    pub is_winner: bool,
}

/// Everything extracted from one message: a day number plus its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStreak {
    /// Streak day number the message reports on
    pub day: u32,
    /// Results in the order they appeared in the message
    pub results: Vec<ParsedResult>,
}

#[allow(clippy::expect_used)]
fn day_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s+day\s+streak").expect("day marker pattern"))
}

#[allow(clippy::expect_used)]
fn score_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(👑\s*)?([1-6X])/6:").expect("score marker pattern"))
}

/// Parse one free-text message into a [`ParsedStreak`].
///
/// Returns [`ParseError::NoStreakDay`] when no day marker is present and
/// [`ParseError::InvalidDayNumber`] for a day of 0; every other irregularity
/// degrades to skipped fragments (an empty block yields zero results for
/// that score token).
pub fn parse_message(message: &str) -> Result<ParsedStreak, ParseError> {
    let day = locate_day_marker(message)?;

    let mut results = Vec::new();
    for block in score_blocks(message) {
        for username in split_block_usernames(block.text) {
            results.push(ParsedResult {
                username,
                score: block.score,
                is_winner: block.is_winner,
            });
        }
    }

    debug!(day, result_count = results.len(), "parsed streak message");
    Ok(ParsedStreak { day, results })
}

/// Stage 1: find the day number. Only the first marker counts; day numbers
/// start at 1.
fn locate_day_marker(message: &str) -> Result<u32, ParseError> {
    let captures = day_marker_re()
        .captures(message)
        .ok_or(ParseError::NoStreakDay)?;
    let day: u32 = captures[1].parse().map_err(|_| ParseError::NoStreakDay)?;
    if day == 0 {
        return Err(ParseError::InvalidDayNumber(0));
    }
    Ok(day)
}

/// One score block: the token/crown from its marker plus the raw text that
/// follows, up to the next marker or end of message.
struct ScoreBlock<'a> {
    score: Score,
    is_winner: bool,
    text: &'a str,
}

/// Stage 2: split the message into score blocks.
fn score_blocks(message: &str) -> Vec<ScoreBlock<'_>> {
    let markers: Vec<_> = score_marker_re().captures_iter(message).collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, captures)| {
            let full = captures.get(0)?;
            let token = captures.get(2)?.as_str();
            let score = Score::from_token(token)?;
            let end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(message.len(), |m| m.start());

            Some(ScoreBlock {
                score,
                is_winner: captures.get(1).is_some(),
                text: &message[full.end()..end],
            })
        })
        .collect()
}

/// Stage 3: extract usernames from a block. Text before the first `@`
/// belongs to the marker and is discarded; each segment is cut at the next
/// score-marker pattern if one sneaks in.
fn split_block_usernames(block: &str) -> Vec<String> {
    let mut segments = block.split('@');
    segments.next();

    segments
        .filter_map(|segment| {
            let cut = score_marker_re()
                .find(segment)
                .map_or(segment.len(), |m| m.start());
            trim_username(&segment[..cut])
        })
        .collect()
}

/// Stage 4: trim a raw username fragment. Strips surrounding whitespace and
/// runs of trailing punctuation; everything else (Unicode, emoji, internal
/// spaces) is preserved verbatim. Returns `None` for empty results.
fn trim_username(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_end_matches([',', ';', '.', '!', '?'])
        .trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_day_marker_first_match_wins() {
        assert_eq!(locate_day_marker("42 day streak, then 99 day streak"), Ok(42));
        assert_eq!(locate_day_marker("100 DAY STREAK"), Ok(100));
        assert_eq!(locate_day_marker("no marker here"), Err(ParseError::NoStreakDay));
    }

    #[test]
    fn test_day_zero_rejected() {
        assert_eq!(
            locate_day_marker("0 day streak"),
            Err(ParseError::InvalidDayNumber(0))
        );
        assert!(parse_message("0 day streak 3/6: @Alice").is_err());
    }

    #[test]
    fn test_score_blocks_with_crown() {
        let blocks = score_blocks("👑 3/6: @Alice 5/6: @Bob");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].score, Score::Three);
        assert!(blocks[0].is_winner);
        assert_eq!(blocks[1].score, Score::Five);
        assert!(!blocks[1].is_winner);
    }

    #[test]
    fn test_split_block_discards_pre_at_text() {
        let names = split_block_usernames(" some noise @Alice @Bob cat");
        assert_eq!(names, vec!["Alice".to_string(), "Bob cat".to_string()]);
    }

    #[test]
    fn test_trim_username_punctuation_runs() {
        assert_eq!(trim_username(" Alice!!, "), Some("Alice".to_string()));
        assert_eq!(trim_username("Bob the 🦊"), Some("Bob the 🦊".to_string()));
        assert_eq!(trim_username("  ,;. "), None);
        assert_eq!(trim_username(""), None);
    }
}
