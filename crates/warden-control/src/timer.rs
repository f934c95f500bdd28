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

//! Cancellable one-shot and repeating timers.
//!
//! Timers carry a payload instead of a callback: the owner pops due timers
//! one at a time and dispatches on the payload while holding its own state
//! mutably. Time is an offset from an arbitrary origin chosen by the owner,
//! so the queue can be driven by a wall clock or by a test.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Smallest period a repeating timer may have.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Opaque token identifying a scheduled timer.
///
/// Handles are never reused, so a stale handle can only ever refer to a
/// timer that is already gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A timer that reached its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    /// Handle of the timer that fired.
    pub handle: TimerHandle,
    /// The deadline the timer was due at.
    pub deadline: Duration,
    /// The payload given at scheduling time.
    pub payload: T,
}

struct Entry<T> {
    deadline: Duration,
    seq: u64,
    period: Option<Duration>,
    payload: T,
}

/// Deadline-ordered timer queue with lazy cancellation.
///
/// Cancelled timers are dropped from the entry table immediately; their heap
/// slots are discarded when they surface. Timers sharing a deadline fire in
/// scheduling order.
pub struct TimerQueue<T> {
    entries: HashMap<TimerHandle, Entry<T>>,
    heap: BinaryHeap<Reverse<(Duration, u64, TimerHandle)>>,
    next_handle: u64,
    next_seq: u64,
}

impl<T: Clone> TimerQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            heap: BinaryHeap::new(),
            next_handle: 0,
            next_seq: 0,
        }
    }

    /// Schedules `payload` to fire once, `delay` after `now`.
    pub fn schedule_once(&mut self, now: Duration, delay: Duration, payload: T) -> TimerHandle {
        self.insert(now + delay, None, payload)
    }

    /// Schedules `payload` to fire every `period`, first at `now + period`.
    pub fn schedule_repeating(
        &mut self,
        now: Duration,
        period: Duration,
        payload: T,
    ) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.insert(now + period, Some(period), payload)
    }

    /// Cancels a timer.
    ///
    /// Returns `false` if the timer already fired (one-shot) or was already
    /// cancelled, so calling this twice is harmless.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Returns true if the timer is still scheduled.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Number of scheduled timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no timer is scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the earliest pending deadline.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Pops the earliest timer due at or before `now`.
    ///
    /// A repeating timer is re-armed one period after the deadline it fired
    /// for, keeping its handle.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired<T>> {
        self.discard_stale();
        let Reverse((deadline, _, handle)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }
        self.heap.pop();

        let period = self.entries.get(&handle)?.period;
        let payload = match period {
            Some(period) => {
                let seq = self.bump_seq();
                let entry = self.entries.get_mut(&handle)?;
                entry.deadline = deadline + period;
                entry.seq = seq;
                self.heap.push(Reverse((entry.deadline, seq, handle)));
                entry.payload.clone()
            }
            None => self.entries.remove(&handle)?.payload,
        };

        Some(Fired {
            handle,
            deadline,
            payload,
        })
    }

    fn insert(&mut self, deadline: Duration, period: Option<Duration>, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.entries.insert(
            handle,
            Entry {
                deadline,
                seq,
                period,
                payload,
            },
        );
        self.heap.push(Reverse((deadline, seq, handle)));
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // Heap slots whose entry was cancelled or re-armed are stale.
    fn discard_stale(&mut self) {
        while let Some(&Reverse((_, seq, handle))) = self.heap.peek() {
            match self.entries.get(&handle) {
                Some(entry) if entry.seq == seq => break,
                _ => {
                    self.heap.pop();
                }
            }
        }
    }
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
