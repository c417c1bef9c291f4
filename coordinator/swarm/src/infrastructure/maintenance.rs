// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Swarm Maintenance Loop - Background task for agent refresh and lease sweeps
//!
//! One task serves the whole swarm. It runs two independent schedules:
//!
//! - every `refresh_interval`: pull positions from the world layer and mark
//!   each agent it reports as seen
//! - every `cleanup_interval`: drop expired claims, zones and goals
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Drives time-based upkeep of the [`SwarmCoordinator`]

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use gridlock_core::AgentPositionSource;

use crate::application::SwarmCoordinator;

/// Floor for both schedules; `tokio::time::interval` rejects a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct MaintenanceLoop {
    coordinator: Arc<SwarmCoordinator>,
    positions: Arc<dyn AgentPositionSource>,
    refresh_interval: Duration,
    cleanup_interval: Duration,
    shutdown_token: CancellationToken,
}

impl MaintenanceLoop {
    /// Loop on the intervals from the coordinator's configuration.
    pub fn new(coordinator: Arc<SwarmCoordinator>, positions: Arc<dyn AgentPositionSource>) -> Self {
        let refresh_interval = coordinator.config().refresh_interval;
        let cleanup_interval = coordinator.config().cleanup_interval;
        Self {
            coordinator,
            positions,
            refresh_interval: refresh_interval.max(MIN_PERIOD),
            cleanup_interval: cleanup_interval.max(MIN_PERIOD),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get a handle to trigger shutdown
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Start the loop as a tokio task. Cancel the token from
    /// [`Self::shutdown_token`] and await the handle to stop it.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        info!(
            refresh_ms = self.refresh_interval.as_millis() as u64,
            cleanup_ms = self.cleanup_interval.as_millis() as u64,
            "Starting swarm maintenance loop"
        );

        let mut refresh_tick = interval(self.refresh_interval);
        let mut cleanup_tick = interval(self.cleanup_interval);
        refresh_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        cleanup_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping maintenance loop");
                    break;
                }
                _ = refresh_tick.tick() => {
                    let refreshed = self.coordinator.refresh_all(self.positions.as_ref());
                    debug!(refreshed, "Agent refresh tick");
                }
                _ = cleanup_tick.tick() => {
                    let report = self.coordinator.cleanup();
                    if report.is_empty() {
                        debug!("Cleanup tick removed nothing");
                    } else {
                        info!(
                            block_claims = report.block_claims,
                            zones = report.zones,
                            goals = report.goals,
                            "Expired leases removed"
                        );
                    }
                }
            }
        }

        info!("Swarm maintenance loop stopped");
    }
}
