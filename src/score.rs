//! Score lexicon for word-puzzle result tokens.
//!
//! Maps the textual tokens `1`..`6` and `X` onto a total order used for
//! ranking, sorting, and aggregation. `X` (failed to solve) ranks strictly
//! worse than every numeric score and is excluded from numeric averages.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A single game score: number of guesses used, or a failed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Score {
    /// Solved in one guess
    One,
    /// Solved in two guesses
    Two,
    /// Solved in three guesses
    Three,
    /// Solved in four guesses
    Four,
    /// Solved in five guesses
    Five,
    /// Solved in six guesses
    Six,
    /// Failed to solve (token `X`)
    Fail,
}

/// All tokens in rank order, best first.
pub const ALL_SCORES: [Score; 7] = [
    Score::One,
    Score::Two,
    Score::Three,
    Score::Four,
    Score::Five,
    Score::Six,
    Score::Fail,
];

impl Score {
    /// Total-order rank: `1..6` map to their value, `X` maps to 7.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Fail => 7,
        }
    }

    /// Numeric value for averaging; `None` for a failed solve.
    #[must_use]
    pub const fn numeric(self) -> Option<u8> {
        match self {
            Self::Fail => None,
            other => Some(other.rank()),
        }
    }

    /// True for the `X` token.
    #[must_use]
    pub const fn is_fail(self) -> bool {
        matches!(self, Self::Fail)
    }

    /// The textual token as it appears in messages and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Fail => "X",
        }
    }

    /// Parse a token. `X` is case-sensitive; anything else is rejected.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1" => Some(Self::One),
            "2" => Some(Self::Two),
            "3" => Some(Self::Three),
            "4" => Some(Self::Four),
            "5" => Some(Self::Five),
            "6" => Some(Self::Six),
            "X" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Score {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ParseError::InvalidScoreToken(s.to_string()))
    }
}

impl TryFrom<String> for Score {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Score> for String {
    fn from(score: Score) -> Self {
        score.as_str().to_string()
    }
}

impl ToSql for Score {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Score {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let token = value.as_str()?;
        Self::from_token(token).ok_or_else(|| {
            FromSqlError::Other(format!("invalid score token in storage: {token}").into())
        })
    }
}
