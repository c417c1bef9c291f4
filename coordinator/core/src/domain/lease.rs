// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Lease Mechanics
//!
//! Every ledger entry records when it was acquired. An entry is *live* while
//! `now - acquired_at < term`; nothing is ever evicted by a timer. Expired
//! entries are overwritten on the next conflicting request, dropped lazily by
//! read paths, or swept by `cleanup`.
//!
//! Time is read through [`Clock`] so tests can drive expiry with
//! [`ManualClock`] instead of sleeping.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source of "now" for lease bookkeeping.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::zero());
        let mut now = self.now.lock();
        *now = now.checked_add_signed(delta).unwrap_or(*now);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Anything held under a lease.
pub trait Leased {
    fn acquired_at(&self) -> DateTime<Utc>;
}

/// Lease length for one class of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseTerm {
    term: TimeDelta,
}

impl LeaseTerm {
    pub fn new(duration: Duration) -> Self {
        Self {
            term: TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn is_live(&self, entry: &impl Leased, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.acquired_at()) < self.term
    }

    pub fn is_expired(&self, entry: &impl Leased, now: DateTime<Utc>) -> bool {
        !self.is_live(entry, now)
    }

    /// Time left before `entry` expires, zero if already expired.
    pub fn remaining(&self, entry: &impl Leased, now: DateTime<Utc>) -> Duration {
        let elapsed = now.signed_duration_since(entry.acquired_at());
        self.term
            .checked_sub(&elapsed)
            .and_then(|left| left.to_std().ok())
            .unwrap_or(Duration::ZERO)
    }
}
