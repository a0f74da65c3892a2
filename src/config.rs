//! Global configuration and query defaults.
//!
//! The parallel threshold is process-wide and read once per `finish()` or
//! batch query, never inside the tree walk.

use crate::filter::{MatchType, StrandType};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of work items below which work stays on the calling
/// thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Set the minimum work size for rayon fan-out.
///
/// Applies to balancing in `finish()` (measured in entries) and to batch
/// queries (measured in queries). `0` always parallelizes,
/// `usize::MAX` never does.
///
/// # Example
///
/// ```
/// use gtftree::config;
///
/// config::set_parallel_threshold(usize::MAX);
/// assert_eq!(config::parallel_threshold(), usize::MAX);
/// config::set_parallel_threshold(config::DEFAULT_PARALLEL_THRESHOLD);
/// ```
#[inline]
pub fn set_parallel_threshold(threshold: usize) {
    PARALLEL_THRESHOLD.store(threshold, Ordering::Release);
}

/// Current parallel threshold.
#[inline]
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Acquire)
}

/// True when `work` items are enough to fan out across threads.
#[inline]
pub fn should_parallelize(work: usize) -> bool {
    work >= parallel_threshold()
}

/// Filters shared by every query in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub match_type: MatchType,
    pub strand_type: StrandType,
}

impl QueryOptions {
    pub fn new(match_type: MatchType, strand_type: StrandType) -> Self {
        Self {
            match_type,
            strand_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_threshold() {
        set_parallel_threshold(DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(parallel_threshold(), 10_000);
        assert!(!should_parallelize(9_999));
        assert!(should_parallelize(10_000));
    }

    #[test]
    #[serial]
    fn test_threshold_extremes() {
        set_parallel_threshold(0);
        assert!(should_parallelize(0));

        set_parallel_threshold(usize::MAX);
        assert!(!should_parallelize(1_000_000));

        set_parallel_threshold(DEFAULT_PARALLEL_THRESHOLD); // Reset
    }

    #[test]
    fn test_query_options_default() {
        let opts = QueryOptions::default();
        assert_eq!(opts.match_type, MatchType::Any);
        assert_eq!(opts.strand_type, StrandType::Ignore);
    }
}
