use std::fs;
use std::path::Path;
use tracing::info;

/// Run-scoped counters, incremented at every decision point and never
/// decremented. Passed explicitly through the pipeline so each stage can be
/// exercised in isolation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Files whose first sheet was read successfully.
    pub files_read: u64,
    /// Rows found in successfully-read files, valid headers or not.
    pub rows_read: u64,
    /// Rows iterated in files that passed the header check.
    pub rows_processed: u64,
    /// Rows acknowledged with a 2xx status.
    pub rows_sent: u64,
    /// Rows whose submission failed (no response, HTTP error, or an
    /// unexpected error while building the request).
    pub rows_failed: u64,
    /// Rows never submitted (bad header, null fields, missing data).
    pub rows_skipped: u64,
}

impl RunStats {
    /// Emit the end-of-run summary together with the resolved audit path.
    pub fn report(&self, log_path: &Path) {
        let resolved = fs::canonicalize(log_path).unwrap_or_else(|_| log_path.to_path_buf());
        info!(
            files_read = self.files_read,
            rows_read = self.rows_read,
            rows_processed = self.rows_processed,
            rows_sent = self.rows_sent,
            rows_failed = self.rows_failed,
            rows_skipped = self.rows_skipped,
            log = %resolved.display(),
            "run summary"
        );
    }
}
