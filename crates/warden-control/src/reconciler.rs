// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reconciliation of the tracking registry against the live population.

use crate::config::AfkConfig;
use crate::gate::RoundPhaseGate;
use crate::registry::{TrackingRegistry, UntrackReason};
use crate::timer::TimerQueue;
use crate::tracker::TimerEvent;
use std::sync::Arc;
use std::time::Duration;
use warden_core::{ActorId, Roster};

/// What a reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileReport {
    /// A snapshot was unavailable or the population empty; nothing changed.
    Skipped,
    /// Tracking is disabled; every tracked actor was released.
    Cleared {
        /// Number of actors untracked.
        untracked: usize,
    },
    /// Tracking is enabled and the population was evaluated.
    Evaluated {
        /// Actors that started being tracked.
        tracked: Vec<ActorId>,
        /// Actors released because they joined a group.
        untracked: Vec<ActorId>,
        /// Unassigned actors left alone because they are privileged.
        privileged_unassigned: Vec<ActorId>,
    },
}

/// Computes which actors should be tracked and drives the registry there.
///
/// The pass only moves forward from the population: an actor missing from
/// the snapshot is never released here, only through its disconnect event.
pub struct Reconciler {
    roster: Arc<dyn Roster>,
    privileged_scope: String,
    min_players: usize,
}

impl Reconciler {
    /// Creates a reconciler reading from `roster`.
    pub fn new(roster: Arc<dyn Roster>, config: &AfkConfig) -> Self {
        Self {
            roster,
            privileged_scope: config.privileged_scope.clone(),
            min_players: config.min_players_for_afk_kick,
        }
    }

    /// The population source.
    pub fn roster(&self) -> &Arc<dyn Roster> {
        &self.roster
    }

    /// Runs one pass.
    pub fn run(
        &self,
        registry: &mut TrackingRegistry,
        timers: &mut TimerQueue<TimerEvent>,
        gate: &RoundPhaseGate,
        now: Duration,
    ) -> ReconcileReport {
        // A live server never reports zero actors, so an empty list is a failed query.
        let Some(population) = self.roster.all_actors().filter(|p| !p.is_empty()) else {
            log::debug!("Reconciler: Population unavailable, skipping pass");
            return ReconcileReport::Skipped;
        };
        let Some(privileged) = self.roster.privileged_ids(&self.privileged_scope) else {
            log::debug!("Reconciler: Privileged list unavailable, skipping pass");
            return ReconcileReport::Skipped;
        };

        let below_threshold = population.len() < self.min_players;
        let enabled = !(gate.between_rounds() || below_threshold);
        log::debug!(
            "Reconciler: Update tracking list? {} (between rounds: {}, below player threshold: {})",
            enabled,
            gate.between_rounds(),
            below_threshold
        );

        if !enabled {
            let untracked = registry.clear(UntrackReason::ListCleared, timers);
            return ReconcileReport::Cleared { untracked };
        }

        let mut tracked = Vec::new();
        let mut untracked = Vec::new();
        let mut privileged_unassigned = Vec::new();

        for actor in &population {
            if !actor.is_unassigned() {
                if registry
                    .untrack(&actor.id, UntrackReason::JoinedGroup, timers)
                    .is_some()
                {
                    untracked.push(actor.id.clone());
                }
                continue;
            }

            if privileged.contains(&actor.id) {
                log::info!("Reconciler: Privileged actor is unassigned: {}", actor.name);
                privileged_unassigned.push(actor.id.clone());
                continue;
            }

            if !registry.is_tracked(&actor.id) {
                registry.track(actor, now, timers);
                tracked.push(actor.id.clone());
            }
        }

        ReconcileReport::Evaluated {
            tracked,
            untracked,
            privileged_unassigned,
        }
    }
}
