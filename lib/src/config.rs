//! Resource limits of the extension search.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Default maximal number of search node expansions.
pub const DEFAULT_MAX_NODES: u64 = 1_000_000;
/// Default wall-clock limit of one computation.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Limits of one computation.
///
/// A limit which is [None] is not enforced. Hitting a limit stops the search and yields a partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Maximal number of search node expansions.
    pub max_nodes: Option<u64>,
    /// Maximal wall-clock time in milliseconds.
    pub max_millis: Option<u64>,
    /// Number of worker threads used by the search (at least one).
    pub threads: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_nodes: Some(DEFAULT_MAX_NODES),
            max_millis: Some(DEFAULT_DEADLINE.as_millis() as u64),
            threads: 1,
        }
    }
}

impl Budget {
    /// A single-threaded budget without any limit.
    pub fn unlimited() -> Self {
        Self {
            max_nodes: None,
            max_millis: None,
            threads: 1,
        }
    }

    /// Sets the number of worker threads; zero is treated as one.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Sets the maximal number of node expansions.
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_max_millis(mut self, max_millis: u64) -> Self {
        self.max_millis = Some(max_millis);
        self
    }

    /// The number of workers actually started, clamped to the available parallelism.
    pub fn workers(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.threads.clamp(1, available)
    }

    /// The instant at which a computation started at `start` has to stop.
    pub fn deadline(&self, start: Instant) -> Option<Instant> {
        self.max_millis
            .and_then(|millis| start.checked_add(Duration::from_millis(millis)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults() {
        let budget = Budget::default();
        assert_eq!(budget.max_nodes, Some(1_000_000));
        assert_eq!(budget.max_millis, Some(120_000));
        assert_eq!(budget.threads, 1);
        let start = Instant::now();
        assert_eq!(budget.deadline(start), Some(start + DEFAULT_DEADLINE));
        assert_eq!(Budget::unlimited().deadline(start), None);
        assert_eq!(Budget::unlimited().with_threads(0).threads, 1);
    }

    #[test]
    fn serde() {
        let budget: Budget = serde_json::from_str(r#"{"max_nodes": 10}"#).unwrap();
        assert_eq!(budget.max_nodes, Some(10));
        assert_eq!(budget.max_millis, Some(120_000));
        assert_eq!(budget.threads, 1);
        let budget: Budget = serde_json::from_str(r#"{"max_millis": null, "threads": 4}"#).unwrap();
        assert_eq!(budget.max_millis, None);
        assert_eq!(budget.threads, 4);
    }

    #[test]
    fn workers() {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let budget: Budget = serde_json::from_str(r#"{"threads": 18446744073709551615}"#).unwrap();
        assert_eq!(budget.workers(), available);
        assert_eq!(Budget::unlimited().with_threads(1_000_000).workers(), available);
        assert_eq!(Budget::unlimited().workers(), 1);
        let budget: Budget = serde_json::from_str(r#"{"threads": 0}"#).unwrap();
        assert_eq!(budget.workers(), 1);
    }
}
