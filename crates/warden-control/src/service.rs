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

//! Background service hosting the AFK tracker.

use crate::config::{AfkConfig, ConfigError};
use crate::tracker::AfkTracker;
use flume::RecvTimeoutError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use warden_core::{ActorId, AdminTransport, EventBus, Roster, StreamEvent};

/// Longest the service thread waits before re-checking its stop flag.
const MAX_IDLE: Duration = Duration::from_millis(50);

/// The AFK tracking service.
///
/// Owns the tracker behind a single mutex and runs a thread that feeds it
/// stream events and wall-clock time. The lock is never held while waiting.
pub struct AfkService {
    tracker: Arc<Mutex<AfkTracker>>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    events: EventBus<StreamEvent>,
}

impl AfkService {
    /// Creates a stopped service.
    pub fn new(
        config: AfkConfig,
        roster: Arc<dyn Roster>,
        transport: Arc<dyn AdminTransport>,
    ) -> Result<Self, ConfigError> {
        let tracker = AfkTracker::new(config, roster, transport)?;
        Ok(Self {
            tracker: Arc::new(Mutex::new(tracker)),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            events: EventBus::new(),
        })
    }

    /// Starts the service thread.
    pub fn start(&mut self) {
        if self.running.load(Ordering::SeqCst) {
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let tracker = Arc::clone(&self.tracker);
        let receiver = self.events.receiver().clone();

        // Resume the tracker clock where a previous run left it.
        let resumed_at = self.tracker.lock().map(|t| t.now()).unwrap_or_default();
        let origin = Instant::now()
            .checked_sub(resumed_at)
            .unwrap_or_else(Instant::now);

        let handle = thread::spawn(move || {
            log::info!("AfkService thread started.");

            while running.load(Ordering::Relaxed) {
                // 1. Fire every timer that fell due
                let wait = match tracker.lock() {
                    Ok(mut tracker) => {
                        tracker.advance_to(origin.elapsed());
                        tracker
                            .next_deadline()
                            .map(|deadline| deadline.saturating_sub(tracker.now()))
                    }
                    Err(_) => {
                        log::error!("AfkService: Tracker lock poisoned, stopping.");
                        break;
                    }
                };

                // 2. Sleep until the next deadline or the next event
                match receiver.recv_timeout(wait.unwrap_or(MAX_IDLE).min(MAX_IDLE)) {
                    Ok(event) => {
                        log::debug!("AfkService: Event {:?}", event);
                        if let Ok(mut tracker) = tracker.lock() {
                            tracker.advance_to(origin.elapsed());
                            tracker.handle_event(event);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::info!("AfkService thread stopped.");
        });

        self.handle = Some(handle);
    }

    /// Stops the service thread. Tracked state is kept.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Returns true while the service thread runs.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns a sender handle to submit stream events.
    pub fn event_sender(&self) -> flume::Sender<StreamEvent> {
        self.events.sender()
    }

    /// Identifiers of every tracked actor.
    pub fn tracked_ids(&self) -> HashSet<ActorId> {
        self.tracker
            .lock()
            .map(|t| t.tracked_ids())
            .unwrap_or_default()
    }

    /// Returns true if `id` is tracked.
    pub fn is_tracked(&self, id: &ActorId) -> bool {
        self.tracker
            .lock()
            .map(|t| t.is_tracked(id))
            .unwrap_or(false)
    }
}

impl Drop for AfkService {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::Actor;

    #[derive(Default)]
    struct StubServer {
        actors: Mutex<Vec<Actor>>,
        removed: Mutex<Vec<ActorId>>,
        warned: Mutex<Vec<(ActorId, String)>>,
    }

    impl StubServer {
        fn with_actors(actors: Vec<Actor>) -> Arc<Self> {
            Arc::new(Self {
                actors: Mutex::new(actors),
                ..Default::default()
            })
        }
    }

    impl Roster for StubServer {
        fn all_actors(&self) -> Option<Vec<Actor>> {
            Some(self.actors.lock().unwrap().clone())
        }
        fn privileged_ids(&self, _: &str) -> Option<HashSet<ActorId>> {
            Some(HashSet::new())
        }
        fn lookup_by_secondary_id(&self, secondary_id: &str) -> Option<Actor> {
            self.actors
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.secondary_id == secondary_id)
                .cloned()
        }
    }

    impl AdminTransport for StubServer {
        fn remove_actor(&self, id: &ActorId, _: &str) {
            self.removed.lock().unwrap().push(id.clone());
        }
        fn warn_actor(&self, id: &ActorId, message: &str) {
            self.warned
                .lock()
                .unwrap()
                .push((id.clone(), message.to_string()));
        }
    }

    fn fast_config() -> AfkConfig {
        AfkConfig {
            min_players_for_afk_kick: 1,
            kick_timeout: 60,
            warning_interval: 20,
            grace_period: 0,
            reconcile_interval: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_service_lifecycle() {
        let server = StubServer::with_actors(Vec::new());
        let mut service = AfkService::new(fast_config(), server.clone(), server).unwrap();
        service.start();
        assert!(service.is_running());
        service.stop();
        assert!(!service.is_running());
    }

    #[test]
    fn test_service_rejects_invalid_config() {
        let server = StubServer::with_actors(Vec::new());
        let config = AfkConfig {
            warning_interval: 0,
            ..fast_config()
        };
        assert!(AfkService::new(config, server.clone(), server).is_err());
    }

    #[test]
    fn test_service_removes_idle_actor() {
        let server = StubServer::with_actors(vec![Actor::new("idle", "Idle", "eos-idle")]);
        let mut service = AfkService::new(fast_config(), server.clone(), server.clone()).unwrap();
        service.start();

        thread::sleep(Duration::from_millis(400));
        service.stop();

        assert!(server.removed.lock().unwrap().contains(&ActorId::from("idle")));
        assert!(!server.warned.lock().unwrap().is_empty());
    }

    #[test]
    fn test_service_releases_actor_on_group_join() {
        let server = StubServer::with_actors(vec![Actor::new("a", "Alpha", "eos-a")]);
        let config = AfkConfig {
            kick_timeout: 60_000,
            warning_interval: 20_000,
            ..fast_config()
        };
        let mut service = AfkService::new(config, server.clone(), server.clone()).unwrap();
        service.start();

        thread::sleep(Duration::from_millis(100));
        assert!(service.is_tracked(&"a".into()));

        server.actors.lock().unwrap()[0].group = Some("1".to_string());
        service
            .event_sender()
            .send(StreamEvent::AssignmentChanged {
                actor_id: "a".into(),
                new_group: Some("1".to_string()),
            })
            .unwrap();
        thread::sleep(Duration::from_millis(100));

        assert!(service.tracked_ids().is_empty());
        service.stop();
        assert!(server.removed.lock().unwrap().is_empty());
    }
}
