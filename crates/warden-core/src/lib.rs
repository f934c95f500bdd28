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

//! # Warden Core
//!
//! Foundational crate containing the actor model, the collaborator contracts
//! (roster queries and admin transport) and the event primitives shared by
//! the tracking service and its hosts.

#![warn(missing_docs)]

pub mod actor;
pub mod admin;
pub mod event;
pub mod roster;

pub use actor::{Actor, ActorId};
pub use admin::AdminTransport;
pub use event::{EventBus, StreamEvent};
pub use roster::Roster;
