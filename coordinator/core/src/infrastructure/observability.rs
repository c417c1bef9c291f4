// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Observability Sink
//!
//! The ledgers report through an injected [`CoordinationSink`] instead of
//! talking to a logging or metrics backend directly.
//!
//! | Sink | Use |
//! |------|-----|
//! | [`NoopSink`] | Default; drops everything |
//! | [`TracingSink`] | Production; `tracing` events plus `metrics` counters/histograms |
//! | [`RecordingSink`] | Tests; keeps every call in memory |

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// Log/metric hook consumed by the coordination core. Every method defaults
/// to a no-op.
pub trait CoordinationSink: Send + Sync {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
    fn counter(&self, _name: &'static str, _value: u64) {}
    fn timer(&self, _name: &'static str, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl CoordinationSink for NoopSink {}

/// Forwards messages to `tracing` and numbers to the `metrics` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl CoordinationSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "gridlock", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "gridlock", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "gridlock", "{}", message);
    }

    fn counter(&self, name: &'static str, value: u64) {
        metrics::counter!(name).increment(value);
    }

    fn timer(&self, name: &'static str, elapsed: Duration) {
        metrics::histogram!(name).record(elapsed.as_secs_f64());
    }
}

/// Level of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkLevel {
    Info,
    Warn,
    Debug,
}

/// Keeps every message and counter total in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(SinkLevel, String)>>,
    counters: Mutex<HashMap<&'static str, u64>>,
    timers: Mutex<HashMap<&'static str, Vec<Duration>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(SinkLevel, String)> {
        self.messages.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(level, _)| *level == SinkLevel::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn counter_total(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn timer_samples(&self, name: &str) -> usize {
        self.timers.lock().get(name).map_or(0, Vec::len)
    }

    fn push(&self, level: SinkLevel, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }
}

impl CoordinationSink for RecordingSink {
    fn info(&self, message: &str) {
        self.push(SinkLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(SinkLevel::Warn, message);
    }

    fn debug(&self, message: &str) {
        self.push(SinkLevel::Debug, message);
    }

    fn counter(&self, name: &'static str, value: u64) {
        *self.counters.lock().entry(name).or_insert(0) += value;
    }

    fn timer(&self, name: &'static str, elapsed: Duration) {
        self.timers.lock().entry(name).or_default().push(elapsed);
    }
}

/// Metric names emitted by the core.
pub mod names {
    pub const CLAIMS_GRANTED: &str = "gridlock_claims_granted";
    pub const CLAIMS_DENIED: &str = "gridlock_claims_denied";
    pub const ZONES_GRANTED: &str = "gridlock_zones_granted";
    pub const ZONES_DENIED: &str = "gridlock_zones_denied";
    pub const CLEANUP_BLOCKS: &str = "gridlock_cleanup_block_claims";
    pub const CLEANUP_ZONES: &str = "gridlock_cleanup_zones";
    pub const CLEANUP_GOALS: &str = "gridlock_cleanup_goals";
    pub const GOAL_FALLBACKS: &str = "gridlock_goal_fallbacks";
    pub const SCAN_DURATION: &str = "gridlock_scan_duration_seconds";
    pub const SCAN_READ_FAULTS: &str = "gridlock_scan_read_faults";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_accumulates_counters() {
        let sink = RecordingSink::new();
        sink.counter(names::CLAIMS_GRANTED, 2);
        sink.counter(names::CLAIMS_GRANTED, 3);
        sink.warn("bad bounds");
        sink.timer(names::SCAN_DURATION, Duration::from_millis(2));

        assert_eq!(sink.counter_total(names::CLAIMS_GRANTED), 5);
        assert_eq!(sink.counter_total(names::CLAIMS_DENIED), 0);
        assert_eq!(sink.warnings(), vec!["bad bounds".to_string()]);
        assert_eq!(sink.timer_samples(names::SCAN_DURATION), 1);
    }

    #[test]
    fn test_noop_and_tracing_sinks_accept_calls() {
        let sinks: [&dyn CoordinationSink; 2] = [&NoopSink, &TracingSink];
        for sink in sinks {
            sink.info("hello");
            sink.counter(names::CLAIMS_DENIED, 1);
            sink.timer(names::SCAN_DURATION, Duration::from_micros(5));
        }
    }
}
