//! Streak Tracker - Word-Puzzle Result Tracking
//!
//! A Rust library for parsing daily word-puzzle results shared in group-chat
//! messages, persisting them in SQLite, and producing statistics for
//! reporting and visualization frontends.
//!
//! # Features
//!
//! - Tolerant free-text parsing of streak messages (day marker, score
//!   blocks, crowned winners, `@`-prefixed usernames)
//! - Idempotent, transactional ingestion (last-write-wins per day/user)
//! - Read-only reporting: overviews, per-day detail, integrity diagnostics,
//!   per-user statistics, time-series export

/// Configuration management
pub mod config;
/// Database connections and destructive store operations
pub mod db;
/// Error types
pub mod error;
/// Transactional ingestion of parsed messages
pub mod ingest;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and report structures
pub mod models;
/// Free-text message parsing
pub mod parser;
/// Score lexicon
pub mod score;
/// Database schema definitions
pub mod schema;
/// Read-only query and reporting layer
pub mod stats;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::Database;
pub use error::{ParseError, Result, TrackerError};
pub use ingest::{ingest, ingest_message};
pub use models::IngestOutcome;
pub use parser::{parse_message, ParsedResult, ParsedStreak};
pub use score::Score;
