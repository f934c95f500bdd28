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

//! Round-phase gate suppressing tracking right after a round change.

use crate::timer::{TimerHandle, TimerQueue};
use crate::tracker::TimerEvent;
use std::time::Duration;

/// Tracks whether the server is inside the post-round grace window.
#[derive(Debug, Default)]
pub struct RoundPhaseGate {
    between_rounds: bool,
    grace_timer: Option<TimerHandle>,
}

impl RoundPhaseGate {
    /// Creates a gate outside any grace window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while tracking is suppressed.
    pub fn between_rounds(&self) -> bool {
        self.between_rounds
    }

    /// Opens a grace window of `grace_period` starting at `now`.
    ///
    /// A window that is already open is restarted.
    pub fn open(
        &mut self,
        timers: &mut TimerQueue<TimerEvent>,
        now: Duration,
        grace_period: Duration,
    ) {
        if let Some(previous) = self.grace_timer.take() {
            timers.cancel(previous);
        }
        self.between_rounds = true;
        self.grace_timer = Some(timers.schedule_once(now, grace_period, TimerEvent::GraceExpired));
        log::info!("RoundPhaseGate: Grace window open for {:?}", grace_period);
    }

    /// Closes the grace window. Tracking resumes on the next reconciliation.
    pub fn close(&mut self) {
        self.between_rounds = false;
        self.grace_timer = None;
        log::info!("RoundPhaseGate: Grace window closed");
    }
}
