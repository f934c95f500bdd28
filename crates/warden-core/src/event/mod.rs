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

//! Inbound stream events and the channel that carries them.
//!
//! [`StreamEvent`] is the decoded form of the game server's log stream as far
//! as the tracker cares. The [`EventBus`] is a generic, thread-safe MPSC
//! channel that hosts use to hand those events to the tracking service.

mod bus;

pub use self::bus::EventBus;

use crate::actor::ActorId;
use serde::{Deserialize, Serialize};

/// An event observed on the server's real-time stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StreamEvent {
    /// A new round has started.
    NewRound,
    /// An actor left the server.
    #[serde(rename_all = "camelCase")]
    ActorDisconnected {
        /// Secondary identifier of the departing actor.
        secondary_id: String,
    },
    /// An actor joined or left an assignment group.
    #[serde(rename_all = "camelCase")]
    AssignmentChanged {
        /// The actor whose assignment changed.
        actor_id: ActorId,
        /// The new group, or `None` when the actor is now unassigned.
        #[serde(default)]
        new_group: Option<String>,
    },
}
