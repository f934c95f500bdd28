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

//! Population queries consumed by the reconciliation pass.

use crate::actor::{Actor, ActorId};
use std::collections::HashSet;

/// Read-only access to the current population.
///
/// Every method returns `None` when the underlying source cannot answer
/// right now. Callers treat that as "skip this cycle", never as an error.
pub trait Roster: Send + Sync {
    /// Returns a snapshot of every connected actor.
    fn all_actors(&self) -> Option<Vec<Actor>>;

    /// Returns the identifiers of actors holding privileges in `scope`.
    fn privileged_ids(&self, scope: &str) -> Option<HashSet<ActorId>>;

    /// Resolves an actor from the secondary identifier carried by disconnect events.
    fn lookup_by_secondary_id(&self, secondary_id: &str) -> Option<Actor>;
}
