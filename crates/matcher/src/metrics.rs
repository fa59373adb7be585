// Metrics hooks for the matcher.
//
// Attach a `MatchMetrics` implementation with `Matcher::with_metrics`; every
// `identify` call then reports latency and hit counts. This keeps
// instrumentation decoupled from any specific metrics backend.
use std::time::Duration;

/// Metrics observer for match operations.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of one query.
    ///
    /// `query_hashes` is the size of the query's hash set, `latency` the
    /// wall-clock time from samples to resolved hits, and `hit_count` the
    /// number of hits returned after filtering and truncation.
    fn record_match(&self, query_hashes: usize, latency: Duration, hit_count: usize);
}
