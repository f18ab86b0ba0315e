//! Metrics collection for ingestion and store maintenance.
//!
//! Thin wrappers over the `metrics` facade; a recorder (Prometheus exporter,
//! logger, or the default no-op) is installed by the embedding application.

use std::time::Duration;

use metrics::{counter, histogram};

/// Record one successful message ingestion.
pub fn record_ingest(result_count: usize, duration: Duration) {
    counter!("streak_messages_ingested_total").increment(1);
    counter!("streak_results_upserted_total").increment(result_count as u64);
    histogram!("streak_ingest_duration_seconds").record(duration.as_secs_f64());
}

/// Record a message that failed to parse.
pub fn record_parse_error() {
    counter!("streak_parse_errors_total").increment(1);
}

/// Record an overwrite of an existing (day, user) result.
pub fn record_overwrite() {
    counter!("streak_result_overwrites_total").increment(1);
}

/// Record deletion of one streak day.
pub fn record_day_deleted(results_deleted: usize) {
    counter!("streak_days_deleted_total").increment(1);
    counter!("streak_results_deleted_total").increment(results_deleted as u64);
}

/// Record a full-store wipe.
pub fn record_wipe() {
    counter!("streak_wipes_total").increment(1);
}
