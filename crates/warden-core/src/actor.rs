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

//! Connected actors as reported by the roster.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stable primary key of an actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Creates an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A connected actor.
///
/// This is a read-only view: the roster owns the truth and every
/// reconciliation pass fetches a fresh copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Primary key.
    pub id: ActorId,
    /// Display name, used for messaging only.
    pub name: String,
    /// Secondary identifier carried by disconnect events.
    pub secondary_id: String,
    /// Team the actor plays on, if known.
    #[serde(default)]
    pub team_id: Option<u32>,
    /// In-game role, if known.
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the actor leads its assignment group.
    #[serde(default)]
    pub is_leader: bool,
    /// Assignment group. `None` means the actor is unassigned.
    #[serde(default)]
    pub group: Option<String>,
}

impl Actor {
    /// Creates an unassigned actor with no team, role or leadership.
    pub fn new(
        id: impl Into<ActorId>,
        name: impl Into<String>,
        secondary_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            secondary_id: secondary_id.into(),
            team_id: None,
            role: None,
            is_leader: false,
            group: None,
        }
    }

    /// Returns the same actor placed in `group`.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns true if the actor belongs to no assignment group.
    pub fn is_unassigned(&self) -> bool {
        self.group.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_actor_is_unassigned() {
        let actor = Actor::new("7656", "Rookie", "eos-1");
        assert!(actor.is_unassigned());
        assert!(!actor.with_group("1").is_unassigned());
    }

    #[test]
    fn actor_deserializes_from_roster_json() {
        let json = r#"{
            "id": "76561198000000001",
            "name": "Rookie",
            "secondaryId": "eos-1",
            "teamId": 2,
            "group": null
        }"#;

        let actor: Actor = serde_json::from_str(json).expect("valid actor json");
        assert_eq!(actor.id, ActorId::from("76561198000000001"));
        assert_eq!(actor.team_id, Some(2));
        assert!(!actor.is_leader);
        assert!(actor.is_unassigned());
    }

    #[test]
    fn actor_id_displays_raw_value() {
        assert_eq!(ActorId::new("abc").to_string(), "abc");
        assert_eq!(ActorId::new("abc").as_str(), "abc");
    }
}
