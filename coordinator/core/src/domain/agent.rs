// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent identity and liveness record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::cell::Cell;

/// Unique handle of an agent (typically the bot's login name).
///
/// Ledgers store only this handle, never a reference to the agent itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Liveness entry kept by the agent registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    /// When the agent was registered.
    pub registered_at: DateTime<Utc>,
    /// Last refresh from the maintenance tick (or registration).
    pub last_seen: DateTime<Utc>,
    /// Last known position; `None` until the world layer reports one.
    pub position: Option<Cell>,
}

/// Where the world layer says an agent currently stands.
pub trait AgentPositionSource: Send + Sync {
    fn agent_position(&self, agent: &AgentId) -> Option<Cell>;
}

impl<F> AgentPositionSource for F
where
    F: Fn(&AgentId) -> Option<Cell> + Send + Sync,
{
    fn agent_position(&self, agent: &AgentId) -> Option<Cell> {
        self(agent)
    }
}
