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

//! The AFK tracker: registry, gate, reconciler and timers in one domain.

use crate::config::{AfkConfig, ConfigError};
use crate::escalation::{format_remaining, render_warning, EscalationPolicy};
use crate::gate::RoundPhaseGate;
use crate::reconciler::{ReconcileReport, Reconciler};
use crate::registry::{TrackingRegistry, UntrackReason};
use crate::timer::TimerQueue;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use warden_core::{ActorId, AdminTransport, Roster};

/// Payload of every timer the tracker schedules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Next warning for a tracked actor.
    Warn(ActorId),
    /// Removal deadline of a tracked actor.
    Kick(ActorId),
    /// End of the post-round grace window.
    GraceExpired,
    /// Periodic reconciliation.
    Sweep,
}

/// Tracks unassigned actors and escalates from warnings to removal.
///
/// The tracker owns all mutable state and is driven from outside: events
/// arrive through [`handle_event`](Self::handle_event) and time moves through
/// [`advance_to`](Self::advance_to). Due timers are dispatched one at a time,
/// so an actor untracked by one dispatch is already gone for the next.
pub struct AfkTracker {
    pub(crate) config: AfkConfig,
    pub(crate) transport: Arc<dyn AdminTransport>,
    pub(crate) registry: TrackingRegistry,
    pub(crate) reconciler: Reconciler,
    pub(crate) gate: RoundPhaseGate,
    pub(crate) timers: TimerQueue<TimerEvent>,
    pub(crate) now: Duration,
}

impl AfkTracker {
    /// Creates a tracker at time zero with the periodic sweep armed.
    pub fn new(
        config: AfkConfig,
        roster: Arc<dyn Roster>,
        transport: Arc<dyn AdminTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut timers = TimerQueue::new();
        timers.schedule_repeating(Duration::ZERO, config.reconcile_interval(), TimerEvent::Sweep);

        Ok(Self {
            registry: TrackingRegistry::new(EscalationPolicy::from_config(&config)),
            reconciler: Reconciler::new(roster, &config),
            gate: RoundPhaseGate::new(),
            timers,
            transport,
            config,
            now: Duration::ZERO,
        })
    }

    /// Current tracker time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// The active configuration.
    pub fn config(&self) -> &AfkConfig {
        &self.config
    }

    /// Read access to the tracking registry.
    pub fn registry(&self) -> &TrackingRegistry {
        &self.registry
    }

    /// Returns true if `id` is tracked.
    pub fn is_tracked(&self, id: &ActorId) -> bool {
        self.registry.is_tracked(id)
    }

    /// Identifiers of every tracked actor.
    pub fn tracked_ids(&self) -> HashSet<ActorId> {
        self.registry.tracked_ids()
    }

    /// Returns true while the post-round grace window is open.
    pub fn between_rounds(&self) -> bool {
        self.gate.between_rounds()
    }

    /// Runs a reconciliation pass now.
    pub fn reconcile(&mut self) -> ReconcileReport {
        self.reconciler
            .run(&mut self.registry, &mut self.timers, &self.gate, self.now)
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Moves time forward by `elapsed`, firing every timer that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        self.advance_to(self.now + elapsed);
    }

    /// Moves time forward to `now`, firing due timers in deadline order.
    ///
    /// Each timer runs with the clock set to its own deadline. Times earlier
    /// than the current one are ignored.
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.now {
            return;
        }
        while let Some(fired) = self.timers.pop_due(now) {
            self.now = fired.deadline;
            self.dispatch(fired.payload);
        }
        self.now = now;
    }

    fn dispatch(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Warn(id) => self.on_warning(&id),
            TimerEvent::Kick(id) => self.on_removal(&id),
            TimerEvent::GraceExpired => self.gate.close(),
            TimerEvent::Sweep => {
                self.reconcile();
            }
        }
    }

    fn on_warning(&mut self, id: &ActorId) {
        let policy = *self.registry.policy();
        let Some(record) = self.registry.get_mut(id) else {
            log::trace!("Tracker: Dropping warning for untracked {}", id);
            return;
        };

        debug_assert!(record.warnings() < policy.max_warnings());
        let step = policy.warning_step(record.warnings());
        if step.is_last {
            self.timers.cancel(record.timers().warning);
        }

        let message = render_warning(&self.config.warning_message, step.remaining);
        self.transport.warn_actor(id, &message);
        log::info!(
            "Tracker: Warning {} ({})",
            record.snapshot().name,
            format_remaining(step.remaining)
        );
        record.record_warning();
    }

    fn on_removal(&mut self, id: &ActorId) {
        // A group join may have landed without its own event.
        self.reconcile();

        let Some(record) = self.registry.get(id) else {
            return;
        };
        let name = record.snapshot().name.clone();

        self.transport.remove_actor(id, &self.config.kick_reason);
        log::info!("Tracker: Removed {} ({})", name, id);
        self.registry
            .untrack(id, UntrackReason::Removed, &mut self.timers);
    }
}
