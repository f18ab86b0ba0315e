//! Database schema definitions
//!
//! This module provides constants for table and column names used with
//! rusqlite, keeping SQL strings in one place.

/// Users table schema
pub mod users {
    /// Table name
    pub const TABLE: &str = "users";
    /// Primary key column
    pub const ID: &str = "id";
    /// Unique username column (case-sensitive, arbitrary Unicode)
    pub const USERNAME: &str = "username";
    /// First-seen timestamp column
    pub const FIRST_SEEN: &str = "first_seen";
}

/// Streak days table schema
pub mod streaks {
    /// Table name
    pub const TABLE: &str = "streaks";
    /// Primary key column
    pub const ID: &str = "id";
    /// Unique day number column
    pub const DAY: &str = "day";
    /// Import timestamp column
    pub const IMPORTED_AT: &str = "imported_at";
}

/// Results table schema (joins users to streak days)
pub mod results {
    /// Table name
    pub const TABLE: &str = "results";
    /// Primary key column
    pub const ID: &str = "id";
    /// Owning streak day column (references `streaks.day`)
    pub const STREAK_DAY: &str = "streak_day";
    /// Owning user column (references `users.id`)
    pub const USER_ID: &str = "user_id";
    /// Score token column (`1`..`6` or `X`)
    pub const SCORE: &str = "score";
    /// Winner flag column
    pub const IS_WINNER: &str = "is_winner";
}
