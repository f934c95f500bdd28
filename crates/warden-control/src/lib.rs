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

//! # Warden Control
//!
//! Detects actors that stay unassigned for too long and escalates from
//! tracking to periodic warnings to removal.
//!
//! - [`registry`]: tracked actors and their timer pairs.
//! - [`reconciler`]: population-driven tracking decisions.
//! - [`escalation`]: warning countdown and removal timing.
//! - [`gate`]: post-round grace window.
//! - [`tracker`]: the single synchronization domain tying them together.
//! - [`service`]: a background thread hosting the tracker.

#![warn(missing_docs)]

mod adapter;
pub mod config;
pub mod escalation;
pub mod gate;
pub mod reconciler;
pub mod registry;
pub mod service;
pub mod timer;
pub mod tracker;

pub use config::{AfkConfig, ConfigError};
pub use reconciler::ReconcileReport;
pub use registry::{TrackingRecord, TrackingRegistry, UntrackReason};
pub use service::AfkService;
pub use tracker::{AfkTracker, TimerEvent};
