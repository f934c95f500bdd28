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

//! In-memory game server driven by a JSON-lines feed.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use warden_core::{Actor, ActorId, AdminTransport, Roster, StreamEvent};

/// One line of the feed read from stdin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FeedLine {
    /// An actor connects.
    Join {
        /// The connecting actor.
        actor: Actor,
    },
    /// An actor disconnects.
    #[serde(rename_all = "camelCase")]
    Leave {
        /// Secondary identifier of the departing actor.
        secondary_id: String,
    },
    /// An actor joins or leaves a group.
    #[serde(rename_all = "camelCase")]
    SetGroup {
        /// The actor concerned.
        actor_id: ActorId,
        /// The new group, `null` to leave.
        #[serde(default)]
        group: Option<String>,
    },
    /// A new round starts.
    NewRound,
    /// Replaces the privileged set.
    Privileged {
        /// Identifiers holding the privileged scope.
        ids: Vec<ActorId>,
    },
    /// Pauses the feed.
    Wait {
        /// Pause length in milliseconds.
        ms: u64,
    },
}

impl FeedLine {
    /// Returns the pause requested by a `wait` line.
    pub fn pause(&self) -> Option<Duration> {
        match self {
            FeedLine::Wait { ms } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ServerState {
    actors: Vec<Actor>,
    // Disconnected actors, resolvable once for their disconnect event.
    departed: Vec<Actor>,
    privileged: HashSet<ActorId>,
}

/// A game server kept entirely in memory.
///
/// Removal commands drop the actor from the roster, warnings are only logged.
#[derive(Default)]
pub struct SimulatedServer {
    state: Mutex<ServerState>,
}

impl SimulatedServer {
    /// Creates an empty server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a feed line and returns the stream event it produces, if any.
    pub fn apply(&self, line: FeedLine) -> Option<StreamEvent> {
        let Ok(mut state) = self.state.lock() else {
            log::error!("SimulatedServer: State lock poisoned");
            return None;
        };

        match line {
            FeedLine::Join { actor } => {
                log::info!("SimulatedServer: {} joined", actor.name);
                state.actors.retain(|a| a.id != actor.id);
                state.departed.retain(|a| a.id != actor.id);
                state.actors.push(actor);
                None
            }
            FeedLine::Leave { secondary_id } => {
                let (left, stayed): (Vec<Actor>, Vec<Actor>) =
                    std::mem::take(&mut state.actors)
                        .into_iter()
                        .partition(|a| a.secondary_id == secondary_id);
                state.actors = stayed;
                state.departed.extend(left);
                Some(StreamEvent::ActorDisconnected { secondary_id })
            }
            FeedLine::SetGroup { actor_id, group } => {
                let actor = state.actors.iter_mut().find(|a| a.id == actor_id)?;
                actor.group = group.clone();
                Some(StreamEvent::AssignmentChanged {
                    actor_id,
                    new_group: group,
                })
            }
            FeedLine::NewRound => Some(StreamEvent::NewRound),
            FeedLine::Privileged { ids } => {
                state.privileged = ids.into_iter().collect();
                None
            }
            FeedLine::Wait { .. } => None,
        }
    }

    /// Number of connected actors.
    pub fn population(&self) -> usize {
        self.state.lock().map(|s| s.actors.len()).unwrap_or(0)
    }
}

impl Roster for SimulatedServer {
    fn all_actors(&self) -> Option<Vec<Actor>> {
        self.state.lock().ok().map(|s| s.actors.clone())
    }

    fn privileged_ids(&self, _scope: &str) -> Option<HashSet<ActorId>> {
        self.state.lock().ok().map(|s| s.privileged.clone())
    }

    fn lookup_by_secondary_id(&self, secondary_id: &str) -> Option<Actor> {
        let mut state = self.state.lock().ok()?;
        if let Some(actor) = state.actors.iter().find(|a| a.secondary_id == secondary_id) {
            return Some(actor.clone());
        }
        let index = state
            .departed
            .iter()
            .position(|a| a.secondary_id == secondary_id)?;
        Some(state.departed.swap_remove(index))
    }
}

impl AdminTransport for SimulatedServer {
    fn remove_actor(&self, id: &ActorId, reason: &str) {
        log::warn!("SimulatedServer: RemoveActor {} ({})", id, reason);
        if let Ok(mut state) = self.state.lock() {
            state.actors.retain(|a| &a.id != id);
        }
    }

    fn warn_actor(&self, id: &ActorId, message: &str) {
        log::info!("SimulatedServer: WarnActor {}: {}", id, message);
    }
}
