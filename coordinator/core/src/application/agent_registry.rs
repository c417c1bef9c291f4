// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Registry
//!
//! Liveness and last-known position per agent, keyed by handle.
//!
//! An agent whose last refresh is older than `stale_after` drops out of the
//! active queries. A position report counts as a refresh; a source that has
//! nothing to say about an agent leaves it to go stale. Going stale never releases its claims; only lease expiry
//! or an explicit unregister does that.

use chrono::TimeDelta;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use crate::domain::{AgentId, AgentPositionSource, AgentRecord, Cell, Clock, CoordinationError};

pub struct AgentRegistry {
    agents: DashMap<AgentId, AgentRecord>,
    stale_after: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl AgentRegistry {
    pub fn new(stale_after: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            agents: DashMap::new(),
            stale_after: TimeDelta::from_std(stale_after).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Register `agent`, or refresh it if already present. Returns `true`
    /// for a new registration.
    pub fn register(&self, agent: &AgentId) -> bool {
        let now = self.clock.now();
        let mut created = false;
        self.agents
            .entry(agent.clone())
            .and_modify(|record| record.last_seen = now)
            .or_insert_with(|| {
                created = true;
                AgentRecord {
                    id: agent.clone(),
                    registered_at: now,
                    last_seen: now,
                    position: None,
                }
            });
        created
    }

    pub fn unregister(&self, agent: &AgentId) -> Option<AgentRecord> {
        self.agents.remove(agent).map(|(_, record)| record)
    }

    pub fn is_registered(&self, agent: &AgentId) -> bool {
        self.agents.contains_key(agent)
    }

    /// Mark `agent` seen now. A `None` position keeps the previous one.
    pub fn refresh(&self, agent: &AgentId, position: Option<Cell>) -> Result<(), CoordinationError> {
        let now = self.clock.now();
        let mut record = self
            .agents
            .get_mut(agent)
            .ok_or_else(|| CoordinationError::UnknownAgent(agent.clone()))?;
        record.last_seen = now;
        if position.is_some() {
            record.position = position;
        }
        Ok(())
    }

    /// Ask `source` for the position of every registered agent and refresh
    /// those it reports. Returns how many agents were refreshed.
    ///
    /// No map lock is held while `source` runs, so it may read the registry.
    pub fn refresh_all(&self, source: &dyn AgentPositionSource) -> usize {
        let ids: Vec<AgentId> = self.agents.iter().map(|record| record.key().clone()).collect();
        let mut refreshed = 0;
        for id in ids {
            let Some(position) = source.agent_position(&id) else {
                continue;
            };
            let now = self.clock.now();
            if let Some(mut record) = self.agents.get_mut(&id) {
                record.position = Some(position);
                record.last_seen = now;
                refreshed += 1;
            }
        }
        trace!(refreshed, "Agent positions refreshed");
        refreshed
    }

    pub fn record(&self, agent: &AgentId) -> Option<AgentRecord> {
        self.agents.get(agent).map(|record| record.clone())
    }

    /// Last known position of `agent`, stale or not.
    pub fn position_of(&self, agent: &AgentId) -> Option<Cell> {
        self.agents.get(agent).and_then(|record| record.position)
    }

    fn is_active(&self, record: &AgentRecord, now: chrono::DateTime<chrono::Utc>) -> bool {
        now.signed_duration_since(record.last_seen) <= self.stale_after
    }

    /// Agents refreshed within the staleness window, ordered by id.
    pub fn active_agents(&self) -> Vec<AgentRecord> {
        let now = self.clock.now();
        let mut active: Vec<AgentRecord> = self
            .agents
            .iter()
            .filter(|record| self.is_active(record.value(), now))
            .map(|record| record.value().clone())
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));
        active
    }

    /// Active agents with a known position within `radius` of `cell`,
    /// nearest first. `exclude` is left out.
    pub fn agents_near(&self, cell: &Cell, radius: f64, exclude: Option<&AgentId>) -> Vec<(AgentId, Cell)> {
        let mut near: Vec<(AgentId, Cell, f64)> = self
            .active_agents()
            .into_iter()
            .filter(|record| Some(&record.id) != exclude)
            .filter_map(|record| {
                let position = record.position?;
                let distance = position.distance(cell);
                (distance <= radius).then_some((record.id, position, distance))
            })
            .collect();
        near.sort_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
        near.into_iter().map(|(id, position, _)| (id, position)).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Every record, active or stale, ordered by id.
    pub fn snapshot(&self) -> Vec<AgentRecord> {
        let mut records: Vec<AgentRecord> = self.agents.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}
