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

//! Outbound admin commands.

use crate::actor::ActorId;

/// The transport executing admin commands against the game server.
///
/// Both calls are fire-and-forget: implementations must not block the
/// caller, and no result is consumed.
pub trait AdminTransport: Send + Sync {
    /// Removes the actor from the server.
    fn remove_actor(&self, id: &ActorId, reason: &str);

    /// Sends a private warning message to the actor.
    fn warn_actor(&self, id: &ActorId, message: &str);
}
