//! Per-stage instrumentation counters.
//!
//! Every analysis stage takes a `&mut impl MetricsSink` and reports into it:
//! one visit per node processed, one edge traversal per adjacency entry
//! examined, one relaxation per improved distance, and a wall-clock timer
//! around the whole stage. Stages never read the sink back.
//!
//! [`Counters`] is the standard accumulator; [`NullSink`] discards
//! everything and is used when a stage runs another stage internally (the
//! path analyzer's own topological sort) so the inner counts do not leak
//! into the caller's numbers.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Capability the analysis stages write their counters into.
pub trait MetricsSink {
    /// A node was entered/processed.
    fn record_visit(&mut self);
    /// An outgoing edge was examined.
    fn record_edge(&mut self);
    /// A distance was improved.
    fn record_relaxation(&mut self);
    /// Start (or restart) the wall-clock timer.
    fn start_timer(&mut self);
    /// Stop the timer, keeping the time elapsed since [`start_timer`].
    ///
    /// [`start_timer`]: MetricsSink::start_timer
    fn stop_timer(&mut self);
}

/// Counting [`MetricsSink`] for one stage run.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    visits: u64,
    edge_traversals: u64,
    relaxations: u64,
    started: Option<Instant>,
    elapsed: Duration,
}

impl Counters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn visits(&self) -> u64 {
        self.visits
    }

    #[must_use]
    pub const fn edge_traversals(&self) -> u64 {
        self.edge_traversals
    }

    #[must_use]
    pub const fn relaxations(&self) -> u64 {
        self.relaxations
    }

    /// Time between the last `start_timer`/`stop_timer` pair.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Zero all counters and the timer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Freeze the current values into a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StageMetrics {
        StageMetrics {
            visits: self.visits,
            edge_traversals: self.edge_traversals,
            relaxations: self.relaxations,
            elapsed_nanos: u64::try_from(self.elapsed.as_nanos()).unwrap_or(u64::MAX),
        }
    }
}

impl MetricsSink for Counters {
    fn record_visit(&mut self) {
        self.visits += 1;
    }

    fn record_edge(&mut self) {
        self.edge_traversals += 1;
    }

    fn record_relaxation(&mut self) {
        self.relaxations += 1;
    }

    fn start_timer(&mut self) {
        self.started = Some(Instant::now());
    }

    fn stop_timer(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record_visit(&mut self) {}
    fn record_edge(&mut self) {}
    fn record_relaxation(&mut self) {}
    fn start_timer(&mut self) {}
    fn stop_timer(&mut self) {}
}

/// Read-only counter values captured after a stage completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageMetrics {
    pub visits: u64,
    pub edge_traversals: u64,
    pub relaxations: u64,
    pub elapsed_nanos: u64,
}

impl StageMetrics {
    /// Elapsed time in (fractional) milliseconds, as written to result logs.
    #[must_use]
    pub fn elapsed_millis(&self) -> f64 {
        Duration::from_nanos(self.elapsed_nanos).as_secs_f64() * 1_000.0
    }
}

impl fmt::Display for StageMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Visits: {}, Edges: {}, Relaxations: {}, Time: {:.3} ms",
            self.visits,
            self.edge_traversals,
            self.relaxations,
            self.elapsed_millis()
        )
    }
}
