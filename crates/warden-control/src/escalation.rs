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

//! Per-actor escalation: repeated warnings followed by removal.
//!
//! Every tracked actor owns two timers armed together at track time:
//!
//! | Timer | Kind | Fires | Effect |
//! |---|---|---|---|
//! | warning | repeating | every `warningInterval` | countdown message, stops itself before removal |
//! | removal | one-shot | after `kickTimeout` | reconcile, re-check membership, remove |

use crate::config::{AfkConfig, TIME_LEFT_PLACEHOLDER};
use crate::timer::{TimerHandle, TimerQueue};
use crate::tracker::TimerEvent;
use std::time::Duration;
use warden_core::ActorId;

/// Slack added to the interval when deciding whether a warning is the last one.
const LAST_WARNING_SLACK: Duration = Duration::from_millis(1);

/// The pair of timers driving one actor's escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationTimers {
    /// Repeating warning timer.
    pub warning: TimerHandle,
    /// One-shot removal timer.
    pub removal: TimerHandle,
}

impl EscalationTimers {
    /// Cancels both timers. Safe to call on timers that already fired.
    pub fn cancel(&self, timers: &mut TimerQueue<TimerEvent>) {
        timers.cancel(self.warning);
        timers.cancel(self.removal);
    }
}

/// Outcome of one warning firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningStep {
    /// Time left before removal, as announced to the actor.
    pub remaining: Duration,
    /// True if no further warning should follow.
    pub is_last: bool,
}

/// Timing rules shared by every escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Time from track start until removal.
    pub kick_timeout: Duration,
    /// Time between warnings.
    pub warning_interval: Duration,
}

impl EscalationPolicy {
    /// Extracts the escalation timings from the tracker configuration.
    pub fn from_config(config: &AfkConfig) -> Self {
        Self {
            kick_timeout: config.kick_timeout(),
            warning_interval: config.warning_interval(),
        }
    }

    /// Arms the warning and removal timers for `actor`.
    ///
    /// The warning timer is scheduled first so that, on a shared deadline,
    /// the final warning is delivered before the removal.
    pub fn arm(
        &self,
        timers: &mut TimerQueue<TimerEvent>,
        now: Duration,
        actor: &ActorId,
    ) -> EscalationTimers {
        let warning = timers.schedule_repeating(
            now,
            self.warning_interval,
            TimerEvent::Warn(actor.clone()),
        );
        let removal = timers.schedule_once(now, self.kick_timeout, TimerEvent::Kick(actor.clone()));
        EscalationTimers { warning, removal }
    }

    /// Computes the warning that follows `warnings_sent` earlier ones.
    pub fn warning_step(&self, warnings_sent: u32) -> WarningStep {
        let elapsed = self
            .warning_interval
            .checked_mul(warnings_sent.saturating_add(1));
        let remaining = elapsed.map_or(Duration::ZERO, |e| self.kick_timeout.saturating_sub(e));

        WarningStep {
            remaining,
            is_last: remaining < self.warning_interval + LAST_WARNING_SLACK,
        }
    }

    /// Upper bound on the number of warnings a single escalation can emit.
    pub fn max_warnings(&self) -> u32 {
        let interval = self.warning_interval.as_millis().max(1);
        let warnings = self.kick_timeout.as_millis().div_ceil(interval);
        u32::try_from(warnings).unwrap_or(u32::MAX)
    }
}

/// Formats a countdown as `MM:SS`, truncating sub-second remainders.
pub fn format_remaining(remaining: Duration) -> String {
    let total_ms = remaining.as_millis();
    let minutes = total_ms / 60_000;
    let seconds = (total_ms / 1000) % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Fills the countdown placeholder of a warning template.
pub fn render_warning(template: &str, remaining: Duration) -> String {
    template.replace(TIME_LEFT_PLACEHOLDER, &format_remaining(remaining))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(kick_ms: u64, interval_ms: u64) -> EscalationPolicy {
        EscalationPolicy {
            kick_timeout: Duration::from_millis(kick_ms),
            warning_interval: Duration::from_millis(interval_ms),
        }
    }

    #[test]
    fn test_format_remaining_pads_and_floors() {
        assert_eq!(format_remaining(Duration::from_millis(480_000)), "08:00");
        assert_eq!(format_remaining(Duration::from_millis(61_999)), "01:01");
        assert_eq!(format_remaining(Duration::from_millis(999)), "00:00");
        assert_eq!(format_remaining(Duration::ZERO), "00:00");
        assert_eq!(format_remaining(Duration::from_secs(100 * 60 + 5)), "100:05");
    }

    #[test]
    fn test_ten_minute_escalation_announces_four_countdowns() {
        let policy = policy(600_000, 120_000);
        let steps: Vec<_> = (0..4).map(|n| policy.warning_step(n)).collect();

        let shown: Vec<_> = steps.iter().map(|s| format_remaining(s.remaining)).collect();
        assert_eq!(shown, vec!["08:00", "06:00", "04:00", "02:00"]);
        assert_eq!(
            steps.iter().map(|s| s.is_last).collect::<Vec<_>>(),
            vec![false, false, false, true]
        );
    }

    #[test]
    fn test_remaining_saturates_at_zero() {
        let step = policy(100, 120_000).warning_step(0);
        assert_eq!(step.remaining, Duration::ZERO);
        assert!(step.is_last);
    }

    #[test]
    fn test_max_warnings_is_ceiling() {
        assert_eq!(policy(600_000, 120_000).max_warnings(), 5);
        assert_eq!(policy(600_001, 120_000).max_warnings(), 6);
        assert_eq!(policy(1_000, 5_000).max_warnings(), 1);
    }

    #[test]
    fn test_render_warning_substitutes_countdown() {
        let text = render_warning("Kick in {time_left}!", Duration::from_millis(125_000));
        assert_eq!(text, "Kick in 02:05!");
    }

    #[test]
    fn test_arm_schedules_both_timers() {
        let mut timers = TimerQueue::new();
        let armed = policy(600_000, 120_000).arm(&mut timers, Duration::ZERO, &"a".into());

        assert!(timers.is_pending(armed.warning));
        assert!(timers.is_pending(armed.removal));
        assert_eq!(timers.next_deadline(), Some(Duration::from_millis(120_000)));

        armed.cancel(&mut timers);
        armed.cancel(&mut timers);
        assert!(timers.is_empty());
    }
}
