//! Metric normalization
//!
//! Converts raw per-query counters into the derived ratios the scorer and
//! classifier consume. Total function of the record: degenerate inputs
//! (zero rows, zero bytes, missing cache ratio) always resolve to a defined
//! value, never an error.

use crate::models::QueryExecutionRecord;

const BYTES_PER_MB: f64 = 1_048_576.0;
const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Derived metrics for one query execution. Ephemeral: recomputed per record
/// within a single scoring pass and discarded afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedMetrics {
    /// read_bytes / read_rows, 0.0 when no rows were read
    pub bytes_per_row: f64,
    /// shuffle_bytes / read_bytes, 0.0 when either side is zero
    pub shuffle_ratio: f64,
    pub spill_megabytes: f64,
    pub duration_seconds: f64,
    pub duration_minutes: f64,
    /// Cache-hit ratio with the missing-value default applied (1.0 = assume
    /// best case so untracked warehouses take no cache penalty)
    pub cache_hit_ratio: f64,
}

impl NormalizedMetrics {
    /// Normalize a record. Pure and total for structurally valid records.
    pub fn from_record(record: &QueryExecutionRecord) -> Self {
        let read_rows = record.read_rows.max(0) as f64;
        let read_bytes = record.read_bytes.max(0) as f64;
        let spilled_bytes = record.spilled_bytes.max(0) as f64;
        let shuffle_bytes = record.shuffle_bytes.max(0) as f64;
        let execution_ms = record.execution_duration_ms.max(0) as f64;

        let bytes_per_row = if read_rows > 0.0 { read_bytes / read_rows } else { 0.0 };
        let shuffle_ratio = if read_bytes > 0.0 && shuffle_bytes > 0.0 {
            shuffle_bytes / read_bytes
        } else {
            0.0
        };

        Self {
            bytes_per_row,
            shuffle_ratio,
            spill_megabytes: spilled_bytes / BYTES_PER_MB,
            duration_seconds: execution_ms / 1_000.0,
            duration_minutes: execution_ms / 60_000.0,
            cache_hit_ratio: record.cache_hit_ratio.unwrap_or(1.0),
        }
    }

    pub fn spill_gigabytes(&self) -> f64 {
        self.spill_megabytes / 1_024.0
    }
}

/// Bytes to gigabytes for display fields
pub fn bytes_to_gb(bytes: i64) -> f64 {
    bytes.max(0) as f64 / BYTES_PER_GB
}
