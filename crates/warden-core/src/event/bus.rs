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

/// A thread-safe, unbounded event channel.
///
/// The bus is generic over the event type so that stream adapters and tests
/// can share the same plumbing. The owner keeps the bus and drains
/// [`receiver`](Self::receiver); producers hold clones of [`sender`](Self::sender).
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a new bus backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus initialized.");
        Self { sender, receiver }
    }

    /// Sends an event, logging an error if every receiver is gone.
    pub fn publish(&self, event: T) {
        log::trace!("Publishing an event.");

        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a reference to the receiver end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::event::StreamEvent;
    use flume::TryRecvError;
    use std::{thread, time::Duration};

    fn joined(actor: &str) -> StreamEvent {
        StreamEvent::AssignmentChanged {
            actor_id: ActorId::from(actor),
            new_group: Some("1".to_string()),
        }
    }

    #[test]
    fn empty_bus_has_nothing_pending() {
        let bus = EventBus::<StreamEvent>::new();
        assert!(bus.receiver().is_empty());
        assert_eq!(bus.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let bus = EventBus::<StreamEvent>::new();
        let receiver = bus.receiver();

        bus.publish(StreamEvent::NewRound);
        bus.publish(joined("a"));
        bus.publish(StreamEvent::ActorDisconnected {
            secondary_id: "eos-a".to_string(),
        });

        let received: Vec<_> = (0..3)
            .map(|_| {
                receiver
                    .recv_timeout(Duration::from_millis(50))
                    .expect("event should be pending")
            })
            .collect();

        assert_eq!(received[0], StreamEvent::NewRound);
        assert_eq!(received[1], joined("a"));
        assert!(matches!(received[2], StreamEvent::ActorDisconnected { .. }));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn send_from_producer_thread() {
        let bus = EventBus::<StreamEvent>::new();
        let sender = bus.sender();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            sender.send(joined("b")).expect("Send from thread failed");
        });

        let received = bus
            .receiver()
            .recv_timeout(Duration::from_secs(1))
            .expect("event from thread");
        assert_eq!(received, joined("b"));

        handle.join().expect("Thread join failed");
    }

    #[test]
    fn send_fails_once_bus_is_dropped() {
        let bus = EventBus::<StreamEvent>::new();
        let sender = bus.sender();
        drop(bus);

        assert!(sender.send(StreamEvent::NewRound).is_err());
    }
}
