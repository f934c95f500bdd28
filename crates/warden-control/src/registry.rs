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

//! Registry of tracked actors and their escalation timers.

use crate::escalation::{EscalationPolicy, EscalationTimers};
use crate::timer::TimerQueue;
use crate::tracker::TimerEvent;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use warden_core::{Actor, ActorId};

/// Why an actor stopped being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntrackReason {
    /// The actor joined an assignment group.
    JoinedGroup,
    /// The actor left the server.
    Disconnected,
    /// Tracking was disabled by the round-phase or population gate.
    ListCleared,
    /// The actor was removed by its escalation.
    Removed,
}

impl fmt::Display for UntrackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UntrackReason::JoinedGroup => "joined a group",
            UntrackReason::Disconnected => "actor disconnected",
            UntrackReason::ListCleared => "list cleared",
            UntrackReason::Removed => "removed for inactivity",
        })
    }
}

/// Tracking state of one unassigned actor.
#[derive(Debug, Clone)]
pub struct TrackingRecord {
    snapshot: Actor,
    warnings: u32,
    started_at: Duration,
    timers: EscalationTimers,
}

impl TrackingRecord {
    /// The actor as it was when tracking started.
    pub fn snapshot(&self) -> &Actor {
        &self.snapshot
    }

    /// The tracked actor's identifier.
    pub fn actor_id(&self) -> &ActorId {
        &self.snapshot.id
    }

    /// Number of warnings delivered so far.
    pub fn warnings(&self) -> u32 {
        self.warnings
    }

    /// Tracker time at which tracking started.
    pub fn started_at(&self) -> Duration {
        self.started_at
    }

    /// The escalation timers owned by this record.
    pub fn timers(&self) -> EscalationTimers {
        self.timers
    }

    pub(crate) fn record_warning(&mut self) {
        self.warnings += 1;
    }
}

/// Authoritative map of tracked actors.
///
/// Each tracked actor has exactly one record and exactly one live pair of
/// escalation timers. Records leave the map before their timers are
/// cancelled, so any dispatch that checks membership afterwards sees the
/// actor as gone.
pub struct TrackingRegistry {
    records: HashMap<ActorId, TrackingRecord>,
    policy: EscalationPolicy,
}

impl TrackingRegistry {
    /// Creates an empty registry arming escalations with `policy`.
    pub fn new(policy: EscalationPolicy) -> Self {
        Self {
            records: HashMap::new(),
            policy,
        }
    }

    /// The escalation timings used for new records.
    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Starts tracking `actor`, arming its escalation timers.
    ///
    /// If the actor is already tracked, the existing record is returned and
    /// nothing is scheduled.
    pub fn track(
        &mut self,
        actor: &Actor,
        now: Duration,
        timers: &mut TimerQueue<TimerEvent>,
    ) -> &TrackingRecord {
        match self.records.entry(actor.id.clone()) {
            Entry::Occupied(existing) => existing.into_mut(),
            Entry::Vacant(slot) => {
                let armed = self.policy.arm(timers, now, &actor.id);
                log::info!("Tracker: Tracking {} ({})", actor.name, actor.id);
                slot.insert(TrackingRecord {
                    snapshot: actor.clone(),
                    warnings: 0,
                    started_at: now,
                    timers: armed,
                })
            }
        }
    }

    /// Stops tracking `id` and cancels its escalation timers.
    ///
    /// Returns the removed record, or `None` if the actor was not tracked.
    pub fn untrack(
        &mut self,
        id: &ActorId,
        reason: UntrackReason,
        timers: &mut TimerQueue<TimerEvent>,
    ) -> Option<TrackingRecord> {
        let record = self.records.remove(id)?;
        record.timers.cancel(timers);
        log::info!(
            "Tracker: Untracked {} ({}), reason: {}",
            record.snapshot.name,
            id,
            reason
        );
        Some(record)
    }

    /// Untracks every actor. Returns how many were removed.
    pub fn clear(&mut self, reason: UntrackReason, timers: &mut TimerQueue<TimerEvent>) -> usize {
        let ids: Vec<ActorId> = self.records.keys().cloned().collect();
        ids.iter()
            .filter(|id| self.untrack(id, reason, timers).is_some())
            .count()
    }

    /// Returns true if `id` is tracked.
    pub fn is_tracked(&self, id: &ActorId) -> bool {
        self.records.contains_key(id)
    }

    /// Returns the identifiers of every tracked actor.
    pub fn tracked_ids(&self) -> HashSet<ActorId> {
        self.records.keys().cloned().collect()
    }

    /// Returns the record of `id`, if tracked.
    pub fn get(&self, id: &ActorId) -> Option<&TrackingRecord> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &ActorId) -> Option<&mut TrackingRecord> {
        self.records.get_mut(id)
    }

    /// Number of tracked actors.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nobody is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TrackingRegistry {
        TrackingRegistry::new(EscalationPolicy {
            kick_timeout: Duration::from_secs(600),
            warning_interval: Duration::from_secs(120),
        })
    }

    #[test]
    fn test_track_creates_fresh_record() {
        let mut registry = registry();
        let mut timers = TimerQueue::new();
        let actor = Actor::new("a", "Alpha", "eos-a");

        let record = registry.track(&actor, Duration::from_secs(5), &mut timers);
        assert_eq!(record.warnings(), 0);
        assert_eq!(record.started_at(), Duration::from_secs(5));
        assert_eq!(record.snapshot().name, "Alpha");
        assert!(registry.is_tracked(&actor.id));
        assert_eq!(timers.len(), 2);
    }

    #[test]
    fn test_track_twice_keeps_single_record_and_timer_pair() {
        let mut registry = registry();
        let mut timers = TimerQueue::new();
        let actor = Actor::new("a", "Alpha", "eos-a");

        let first = registry.track(&actor, Duration::ZERO, &mut timers).timers();
        let second = registry
            .track(&actor, Duration::from_secs(30), &mut timers)
            .clone();

        assert_eq!(registry.len(), 1);
        assert_eq!(second.timers(), first);
        assert_eq!(second.started_at(), Duration::ZERO);
        assert_eq!(timers.len(), 2);
    }

    #[test]
    fn test_untrack_cancels_timers() {
        let mut registry = registry();
        let mut timers = TimerQueue::new();
        let actor = Actor::new("a", "Alpha", "eos-a");
        let armed = registry.track(&actor, Duration::ZERO, &mut timers).timers();

        let removed = registry.untrack(&actor.id, UntrackReason::JoinedGroup, &mut timers);
        assert!(removed.is_some());
        assert!(!registry.is_tracked(&actor.id));
        assert!(!timers.is_pending(armed.warning));
        assert!(!timers.is_pending(armed.removal));
    }

    #[test]
    fn test_untrack_unknown_is_noop() {
        let mut registry = registry();
        let mut timers = TimerQueue::new();
        assert!(registry
            .untrack(&"ghost".into(), UntrackReason::Disconnected, &mut timers)
            .is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear_untracks_everyone() {
        let mut registry = registry();
        let mut timers = TimerQueue::new();
        for id in ["a", "b", "c"] {
            registry.track(&Actor::new(id, id, id), Duration::ZERO, &mut timers);
        }

        assert_eq!(registry.clear(UntrackReason::ListCleared, &mut timers), 3);
        assert!(registry.tracked_ids().is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_reason_messages() {
        assert_eq!(UntrackReason::JoinedGroup.to_string(), "joined a group");
        assert_eq!(UntrackReason::Disconnected.to_string(), "actor disconnected");
        assert_eq!(UntrackReason::ListCleared.to_string(), "list cleared");
        assert_eq!(UntrackReason::Removed.to_string(), "removed for inactivity");
    }
}
