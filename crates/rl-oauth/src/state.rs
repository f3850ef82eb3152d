//! Reactive session container

use parking_lot::RwLock;
use rl_types::SessionState;
use std::sync::Arc;
use uuid::Uuid;

/// Handle for a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Subscriber = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Shared reactive mirror of the backend session state.
///
/// Single writer (the flow controller), many readers. Subscribers receive the
/// current snapshot immediately on registration and every update afterwards,
/// matching store semantics of reactive UI frameworks.
pub struct SessionCell {
    current: RwLock<SessionState>,
    subscribers: RwLock<Vec<(SubscriberId, Subscriber)>>,
}

impl SessionCell {
    /// Create a cell holding `initial`.
    pub fn new(initial: SessionState) -> Self {
        Self {
            current: RwLock::new(initial),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> SessionState {
        self.current.read().clone()
    }

    /// Replace the state and notify every subscriber in registration order.
    pub fn set(&self, next: SessionState) {
        *self.current.write() = next.clone();

        // Snapshot under the lock, invoke outside it; a subscriber may
        // subscribe or unsubscribe re-entrantly.
        let snapshot: Vec<Subscriber> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in snapshot {
            subscriber(&next);
        }
    }

    /// Register `subscriber` and immediately invoke it with the current
    /// snapshot.
    pub fn subscribe(
        &self,
        subscriber: impl Fn(&SessionState) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = SubscriberId::new();
        let subscriber: Subscriber = Arc::new(subscriber);
        self.subscribers
            .write()
            .push((id, Arc::clone(&subscriber)));
        subscriber(&self.get());
        id
    }

    /// Remove the subscriber registered under `id`. Returns whether one was
    /// removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(entry_id, _)| *entry_id != id);
        subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[test]
    fn test_subscribe_replays_current_snapshot() {
        let cell = SessionCell::new(SessionState::authenticated(
            "t1".to_string(),
            json!({"id": "abc"}),
        ));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        cell.subscribe(move |state| seen_clone.lock().push(state.clone()));

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].token, "t1");
        assert!(seen[0].is_valid);
    }

    #[test]
    fn test_set_notifies_subscribers() {
        let cell = SessionCell::new(SessionState::cleared());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        cell.subscribe(move |state| seen_clone.lock().push(state.token.clone()));

        cell.set(SessionState::authenticated("t1".to_string(), json!({})));
        cell.set(SessionState::cleared());

        assert_eq!(*seen.lock(), vec!["", "t1", ""]);
        assert!(!cell.get().is_valid);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let cell = SessionCell::new(SessionState::cleared());
        let calls = Arc::new(Mutex::new(0u32));

        let calls_clone = Arc::clone(&calls);
        let id = cell.subscribe(move |_| *calls_clone.lock() += 1);

        assert!(cell.unsubscribe(id));
        cell.set(SessionState::cleared());

        // Only the registration snapshot was delivered
        assert_eq!(*calls.lock(), 1);
        assert!(!cell.unsubscribe(id));
    }
}
