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

//! Translation of stream events into tracker operations.

use crate::registry::UntrackReason;
use crate::tracker::AfkTracker;
use warden_core::{ActorId, StreamEvent};

impl AfkTracker {
    /// Applies one stream event at the current tracker time.
    pub fn handle_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::NewRound => self.on_new_round(),
            StreamEvent::ActorDisconnected { secondary_id } => self.on_disconnect(&secondary_id),
            StreamEvent::AssignmentChanged {
                actor_id,
                new_group,
            } => self.on_assignment_changed(&actor_id, new_group.as_deref()),
        }
    }

    fn on_new_round(&mut self) {
        self.gate
            .open(&mut self.timers, self.now, self.config.grace_period());
        self.reconcile();
    }

    fn on_disconnect(&mut self, secondary_id: &str) {
        match self.reconciler.roster().lookup_by_secondary_id(secondary_id) {
            Some(actor) => {
                self.registry
                    .untrack(&actor.id, UntrackReason::Disconnected, &mut self.timers);
            }
            None => log::debug!("Tracker: Disconnect of unknown actor {}", secondary_id),
        }
        self.reconcile();
    }

    fn on_assignment_changed(&mut self, actor_id: &ActorId, new_group: Option<&str>) {
        if new_group.is_some() {
            self.registry
                .untrack(actor_id, UntrackReason::JoinedGroup, &mut self.timers);
        }
        // Leaving a group only shows up in the next population snapshot.
        self.reconcile();
    }
}
