//! Input validation and sanitization for the CLI edges.

use anyhow::{anyhow, Result};

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a streak day number
    pub fn validate_day_number(day: i64) -> Result<u32> {
        if day < 1 {
            return Err(anyhow!("Day number must be positive"));
        }
        u32::try_from(day).map_err(|_| anyhow!("Day number too large"))
    }

    /// Validate a username
    pub fn validate_username(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Username cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(anyhow!("Username too long (max 100 characters)"));
        }

        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(anyhow!("Username contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a raw message before parsing
    pub fn validate_message(message: &str, max_len: usize) -> Result<()> {
        if message.trim().is_empty() {
            return Err(anyhow!("Message cannot be empty"));
        }

        if message.chars().count() > max_len {
            return Err(anyhow!("Message too long (max {max_len} characters)"));
        }

        Ok(())
    }

    /// Validate database path
    pub fn validate_database_path(path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(anyhow!("Database path cannot be empty"));
        }

        if path.len() > 4096 {
            return Err(anyhow!("Database path too long (max 4096 characters)"));
        }

        if path.contains('\0') {
            return Err(anyhow!("Database path contains invalid characters"));
        }

        Ok(())
    }
}
