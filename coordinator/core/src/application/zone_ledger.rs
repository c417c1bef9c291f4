// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Zone Ledger
//!
//! Leases on rectangular work regions, keyed by `(zone kind, agent)`. An agent
//! holds at most one live zone per kind; assigning again replaces it.
//!
//! `assign` only touches the caller's own entry. `assign_exclusive` also
//! refuses bounds that intersect another agent's live zone of the same kind;
//! zones of different kinds never conflict (a quarry may overlap a farm).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::domain::{AgentId, AreaBounds, Cell, Clock, LeaseTerm, ZoneClaim, ZoneKind};
use crate::infrastructure::observability::{names, CoordinationSink};

type ZoneKey = (ZoneKind, AgentId);

pub struct ZoneLedger {
    zones: RwLock<HashMap<ZoneKey, ZoneClaim>>,
    term: LeaseTerm,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn CoordinationSink>,
}

impl ZoneLedger {
    pub fn new(duration: Duration, clock: Arc<dyn Clock>, sink: Arc<dyn CoordinationSink>) -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            term: LeaseTerm::new(duration),
            clock,
            sink,
        }
    }

    /// Assign `bounds` to `agent` under `kind`, replacing any zone the agent
    /// already holds for that kind.
    pub fn assign(&self, kind: &ZoneKind, agent: &AgentId, bounds: AreaBounds) {
        let zone = ZoneClaim {
            acquired_at: self.clock.now(),
            bounds,
        };
        self.zones.write().insert((kind.clone(), agent.clone()), zone);
        trace!(kind = %kind, agent = %agent, bounds = %bounds, "Zone assigned");
        self.sink.counter(names::ZONES_GRANTED, 1);
    }

    /// Like [`ZoneLedger::assign`], but returns `false` without writing when
    /// another agent holds a live zone of the same kind that intersects
    /// `bounds`.
    pub fn assign_exclusive(&self, kind: &ZoneKind, agent: &AgentId, bounds: AreaBounds) -> bool {
        let now = self.clock.now();
        let mut zones = self.zones.write();

        let conflict = zones.iter().find(|((held_kind, holder), zone)| {
            held_kind == kind
                && holder != agent
                && self.term.is_live(*zone, now)
                && zone.bounds.intersects(&bounds)
        });
        if let Some(((_, holder), zone)) = conflict {
            debug!(
                kind = %kind,
                requester = %agent,
                holder = %holder,
                requested = %bounds,
                held = %zone.bounds,
                "Exclusive zone assignment denied (overlaps live zone)"
            );
            drop(zones);
            self.sink.counter(names::ZONES_DENIED, 1);
            return false;
        }

        zones.insert(
            (kind.clone(), agent.clone()),
            ZoneClaim {
                acquired_at: now,
                bounds,
            },
        );
        drop(zones);
        self.sink.counter(names::ZONES_GRANTED, 1);
        true
    }

    /// Live zone of `kind` held by `agent`. An expired entry is evicted.
    pub fn get(&self, kind: &ZoneKind, agent: &AgentId) -> Option<AreaBounds> {
        let now = self.clock.now();
        let key = (kind.clone(), agent.clone());
        let mut zones = self.zones.write();
        let zone = zones.get(&key)?;
        if self.term.is_expired(zone, now) {
            zones.remove(&key);
            return None;
        }
        Some(zone.bounds)
    }

    pub fn release(&self, kind: &ZoneKind, agent: &AgentId) -> bool {
        self.zones
            .write()
            .remove(&(kind.clone(), agent.clone()))
            .is_some()
    }

    /// Agent holding a live zone of `kind` that contains `cell`.
    pub fn holder_at(&self, kind: &ZoneKind, cell: &Cell) -> Option<AgentId> {
        let now = self.clock.now();
        self.zones
            .read()
            .iter()
            .find(|((held_kind, _), zone)| {
                held_kind == kind && zone.bounds.contains(cell) && self.term.is_live(*zone, now)
            })
            .map(|((_, holder), _)| holder.clone())
    }

    /// Live zones held by `agent`, ordered by kind.
    pub fn zones_for(&self, agent: &AgentId) -> Vec<(ZoneKind, ZoneClaim)> {
        let now = self.clock.now();
        let mut held: Vec<(ZoneKind, ZoneClaim)> = self
            .zones
            .read()
            .iter()
            .filter(|((_, holder), zone)| holder == agent && self.term.is_live(*zone, now))
            .map(|((kind, _), zone)| (kind.clone(), zone.clone()))
            .collect();
        held.sort_by(|a, b| a.0.cmp(&b.0));
        held
    }

    pub fn release_all_for(&self, agent: &AgentId) -> usize {
        let mut zones = self.zones.write();
        let before = zones.len();
        zones.retain(|(_, holder), _| holder != agent);
        before - zones.len()
    }

    /// Sweep expired zones. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut zones = self.zones.write();
        let before = zones.len();
        zones.retain(|_, zone| self.term.is_live(&*zone, now));
        before - zones.len()
    }

    pub fn len(&self) -> usize {
        self.zones.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.read().is_empty()
    }

    /// Copy of every entry, ordered by `(kind, agent)`.
    pub fn snapshot(&self) -> Vec<(ZoneKind, AgentId, ZoneClaim)> {
        let mut entries: Vec<(ZoneKind, AgentId, ZoneClaim)> = self
            .zones
            .read()
            .iter()
            .map(|((kind, agent), zone)| (kind.clone(), agent.clone(), zone.clone()))
            .collect();
        entries.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;
    use crate::infrastructure::observability::NoopSink;

    const TERM: Duration = Duration::from_millis(300_000);

    fn ledger() -> (ZoneLedger, ManualClock) {
        let clock = ManualClock::default();
        (ZoneLedger::new(TERM, Arc::new(clock.clone()), Arc::new(NoopSink)), clock)
    }

    fn area(a: (i32, i32, i32), b: (i32, i32, i32)) -> AreaBounds {
        AreaBounds::new(a.into(), b.into())
    }

    #[test]
    fn test_assign_and_get() {
        let (ledger, _) = ledger();
        let quarry = ZoneKind::from("quarry");
        let bot = AgentId::from("A");
        let bounds = area((0, 60, 0), (9, 64, 9));

        ledger.assign(&quarry, &bot, bounds);
        assert_eq!(ledger.get(&quarry, &bot), Some(bounds));
        assert_eq!(ledger.get(&ZoneKind::from("farm"), &bot), None);
        assert_eq!(ledger.holder_at(&quarry, &Cell::new(3, 62, 3)), Some(bot));
    }

    #[test]
    fn test_reassign_replaces_zone() {
        let (ledger, _) = ledger();
        let quarry = ZoneKind::from("quarry");
        let bot = AgentId::from("A");
        ledger.assign(&quarry, &bot, area((0, 0, 0), (4, 0, 4)));
        ledger.assign(&quarry, &bot, area((10, 0, 10), (14, 0, 14)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&quarry, &bot), Some(area((10, 0, 10), (14, 0, 14))));
    }

    #[test]
    fn test_assign_ignores_other_agents_zones() {
        let (ledger, _) = ledger();
        let quarry = ZoneKind::from("quarry");
        let (a, b) = (AgentId::from("A"), AgentId::from("B"));
        let bounds = area((0, 0, 0), (9, 0, 9));

        ledger.assign(&quarry, &a, bounds);
        ledger.assign(&quarry, &b, bounds);
        assert_eq!(ledger.get(&quarry, &a), Some(bounds));
        assert_eq!(ledger.get(&quarry, &b), Some(bounds));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_exclusive_overlap_of_same_kind_is_denied() {
        let (ledger, clock) = ledger();
        let quarry = ZoneKind::from("quarry");
        let (a, b) = (AgentId::from("A"), AgentId::from("B"));
        assert!(ledger.assign_exclusive(&quarry, &a, area((0, 0, 0), (9, 10, 9))));
        assert!(!ledger.assign_exclusive(&quarry, &b, area((5, 0, 5), (15, 10, 15))));
        assert_eq!(ledger.get(&quarry, &b), None);
        assert!(ledger.assign_exclusive(&quarry, &b, area((10, 0, 0), (19, 10, 9))));
        assert!(ledger.assign_exclusive(&ZoneKind::from("farm"), &b, area((5, 0, 5), (6, 0, 6))));

        clock.advance(TERM);
        assert!(ledger.assign_exclusive(&quarry, &b, area((5, 0, 5), (15, 10, 15))));
    }

    #[test]
    fn test_expired_zone_is_evicted_on_read() {
        let (ledger, clock) = ledger();
        let quarry = ZoneKind::from("quarry");
        let bot = AgentId::from("A");
        ledger.assign(&quarry, &bot, area((0, 0, 0), (1, 1, 1)));
        clock.advance(TERM);
        assert_eq!(ledger.get(&quarry, &bot), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_cleanup_and_cascade() {
        let (ledger, clock) = ledger();
        let bot = AgentId::from("A");
        ledger.assign(&ZoneKind::from("quarry"), &bot, area((0, 0, 0), (1, 1, 1)));
        ledger.assign(&ZoneKind::from("farm"), &bot, area((5, 0, 5), (6, 1, 6)));
        ledger.assign(&ZoneKind::from("farm"), &AgentId::from("B"), area((50, 0, 50), (60, 1, 60)));
        assert_eq!(ledger.zones_for(&bot).len(), 2);

        assert_eq!(ledger.release_all_for(&bot), 2);
        assert_eq!(ledger.cleanup(), 0);
        clock.advance(TERM);
        assert_eq!(ledger.cleanup(), 1);
        assert_eq!(ledger.cleanup(), 0);
    }
}
