// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Claim Ledger
//!
//! Lease-based mutual exclusion over single cells. Prevents two agents from
//! mining, placing on, or otherwise working the same cell at once.
//!
//! ## Claim Decision Table
//! | Existing entry | Requester | Outcome |
//! |----------------|-----------|---------|
//! | none | any | granted |
//! | live, same owner | owner | granted, lease refreshed |
//! | live, other owner | any | denied |
//! | expired | any | granted, entry overwritten |
//!
//! The whole read-check-write runs under one mutex so two agents can never
//! both observe "unclaimed" and both write. `cleanup` takes the same lock.
//!
//! `release` performs no ownership check: any caller holding the cell key can
//! drop the claim (used for hand-off between agents). `release_owned` is the
//! checked variant.

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::domain::{AgentId, BlockClaim, Cell, Clock, CoordinationError, LeaseTerm};
use crate::infrastructure::observability::{names, CoordinationSink};

pub struct ClaimLedger {
    claims: Mutex<HashMap<Cell, BlockClaim>>,
    term: LeaseTerm,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn CoordinationSink>,
}

impl ClaimLedger {
    pub fn new(duration: Duration, clock: Arc<dyn Clock>, sink: Arc<dyn CoordinationSink>) -> Self {
        Self {
            claims: Mutex::new(HashMap::new()),
            term: LeaseTerm::new(duration),
            clock,
            sink,
        }
    }

    /// Attempt to claim `cell` for `agent`.
    ///
    /// Returns `false` only when a different agent holds a live claim.
    pub fn claim(&self, agent: &AgentId, cell: Cell, task: &str) -> bool {
        let now = self.clock.now();
        let fresh = BlockClaim {
            owner: agent.clone(),
            acquired_at: now,
            task: task.to_string(),
        };

        let granted = {
            let mut claims = self.claims.lock();
            match claims.entry(cell) {
                Entry::Occupied(mut existing) => {
                    let held = existing.get();
                    if held.owner != *agent && self.term.is_live(held, now) {
                        debug!(
                            cell = %cell,
                            requester = %agent,
                            holder = %held.owner,
                            task = %held.task,
                            "Block claim denied (already held)"
                        );
                        false
                    } else {
                        trace!(cell = %cell, agent = %agent, previous = %held.owner, "Block claim renewed or taken over");
                        existing.insert(fresh);
                        true
                    }
                }
                Entry::Vacant(vacant) => {
                    trace!(cell = %cell, agent = %agent, task = task, "Block claim granted");
                    vacant.insert(fresh);
                    true
                }
            }
        };

        let metric = if granted { names::CLAIMS_GRANTED } else { names::CLAIMS_DENIED };
        self.sink.counter(metric, 1);
        granted
    }

    /// Claim the first available cell among `candidates`, trying them in a
    /// random order drawn from `rng`.
    pub fn claim_first_available<R: Rng + ?Sized>(
        &self,
        agent: &AgentId,
        candidates: &[Cell],
        task: &str,
        rng: &mut R,
    ) -> Option<Cell> {
        let mut order = candidates.to_vec();
        order.shuffle(rng);
        order.into_iter().find(|cell| self.claim(agent, *cell, task))
    }

    /// Drop any claim on `cell`, whoever holds it. Returns whether an entry
    /// was removed.
    pub fn release(&self, cell: &Cell) -> bool {
        let removed = self.claims.lock().remove(cell);
        if let Some(claim) = &removed {
            trace!(cell = %cell, holder = %claim.owner, "Block claim released");
        }
        removed.is_some()
    }

    /// Drop the claim on `cell` only if `agent` holds it.
    pub fn release_owned(&self, agent: &AgentId, cell: &Cell) -> Result<(), CoordinationError> {
        let now = self.clock.now();
        let mut claims = self.claims.lock();
        let Some(held) = claims.get(cell) else {
            return Err(CoordinationError::ClaimNotFound(*cell));
        };
        if self.term.is_expired(held, now) {
            claims.remove(cell);
            return Err(CoordinationError::ClaimNotFound(*cell));
        }
        if held.owner != *agent {
            return Err(CoordinationError::NotOwner {
                agent: agent.clone(),
                cell: *cell,
                holder: held.owner.clone(),
            });
        }
        claims.remove(cell);
        Ok(())
    }

    /// Whether someone other than `exclude` holds a live claim on `cell`.
    ///
    /// An expired entry found here is evicted.
    pub fn is_claimed(&self, cell: &Cell, exclude: Option<&AgentId>) -> bool {
        let now = self.clock.now();
        let mut claims = self.claims.lock();
        let Some(held) = claims.get(cell) else {
            return false;
        };
        if self.term.is_expired(held, now) {
            claims.remove(cell);
            return false;
        }
        exclude != Some(&held.owner)
    }

    /// Live claim on `cell`, if any.
    pub fn holder(&self, cell: &Cell) -> Option<BlockClaim> {
        let now = self.clock.now();
        self.claims
            .lock()
            .get(cell)
            .filter(|held| self.term.is_live(*held, now))
            .cloned()
    }

    /// Live claims held by `agent`, ordered by cell.
    pub fn claims_for(&self, agent: &AgentId) -> Vec<(Cell, BlockClaim)> {
        let now = self.clock.now();
        let mut held: Vec<(Cell, BlockClaim)> = self
            .claims
            .lock()
            .iter()
            .filter(|(_, claim)| claim.owner == *agent && self.term.is_live(*claim, now))
            .map(|(cell, claim)| (*cell, claim.clone()))
            .collect();
        held.sort_by_key(|(cell, _)| *cell);
        held
    }

    /// Remove every claim owned by `agent`, live or not.
    pub fn release_all_for(&self, agent: &AgentId) -> usize {
        let mut claims = self.claims.lock();
        let before = claims.len();
        claims.retain(|_, claim| claim.owner != *agent);
        before - claims.len()
    }

    /// Sweep expired claims. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut claims = self.claims.lock();
        let before = claims.len();
        claims.retain(|_, claim| self.term.is_live(&*claim, now));
        before - claims.len()
    }

    pub fn len(&self) -> usize {
        self.claims.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.lock().is_empty()
    }

    /// Copy of every entry (expired ones included), ordered by cell.
    pub fn snapshot(&self) -> Vec<(Cell, BlockClaim)> {
        let mut entries: Vec<(Cell, BlockClaim)> = self
            .claims
            .lock()
            .iter()
            .map(|(cell, claim)| (*cell, claim.clone()))
            .collect();
        entries.sort_by_key(|(cell, _)| *cell);
        entries
    }
}
