//! Typed event dispatch for flow observers
//!
//! Listeners are registered per event kind and invoked synchronously in
//! registration order. A panicking listener is caught and logged so later
//! listeners in the same dispatch still run.

use parking_lot::RwLock;
use rl_types::{AuthError, Provider, SessionData, SessionState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Handle for a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event payloads delivered to listeners.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// The code exchange completed; carries the consumed provider and the
    /// resulting session
    Success {
        provider: Provider,
        session: SessionData,
    },

    /// A resolution attempt failed terminally
    Error { cause: AuthError },

    /// The underlying session changed (login, logout, external refresh)
    Change { state: SessionState },
}

impl AuthEvent {
    /// The kind this event is dispatched under.
    pub fn kind(&self) -> AuthEventKind {
        match self {
            AuthEvent::Success { .. } => AuthEventKind::Success,
            AuthEvent::Error { .. } => AuthEventKind::Error,
            AuthEvent::Change { .. } => AuthEventKind::Change,
        }
    }
}

/// Event kinds listeners can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthEventKind {
    Success,
    Error,
    Change,
}

type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Ordered listener registry keyed by event kind.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<AuthEventKind, Vec<(ListenerId, Listener)>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`; returns a handle for removal.
    pub fn add(
        &self,
        kind: AuthEventKind,
        listener: impl Fn(&AuthEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove the listener registered under `id`. Returns whether a listener
    /// was actually removed.
    pub fn remove(&self, kind: AuthEventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(entries) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Dispatch `event` to every listener of its kind, in registration order.
    ///
    /// The listener list is snapshotted before dispatch, so listeners may
    /// register or remove listeners without deadlocking; such changes take
    /// effect from the next dispatch.
    pub fn emit(&self, event: &AuthEvent) {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .listeners
            .read()
            .get(&event.kind())
            .map(|entries| entries.to_vec())
            .unwrap_or_default();

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!("Event listener {} panicked during {:?} dispatch", id, event.kind());
            }
        }
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: AuthEventKind) -> usize {
        self.listeners
            .read()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn change_event() -> AuthEvent {
        AuthEvent::Change {
            state: SessionState::cleared(),
        }
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.add(AuthEventKind::Change, move |_| order.lock().push(label));
        }

        bus.emit(&change_event());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_removed_listener_no_longer_fires() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(0u32));

        let calls_clone = Arc::clone(&calls);
        let id = bus.add(AuthEventKind::Change, move |_| *calls_clone.lock() += 1);

        bus.emit(&change_event());
        assert!(bus.remove(AuthEventKind::Change, id));
        bus.emit(&change_event());

        assert_eq!(*calls.lock(), 1);
        assert!(!bus.remove(AuthEventKind::Change, id));
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus = EventBus::new();
        let reached = Arc::new(Mutex::new(false));

        bus.add(AuthEventKind::Error, |_| panic!("listener failure"));
        let reached_clone = Arc::clone(&reached);
        bus.add(AuthEventKind::Error, move |_| *reached_clone.lock() = true);

        bus.emit(&AuthEvent::Error {
            cause: AuthError::StateMismatch,
        });

        assert!(*reached.lock());
    }

    #[test]
    fn test_kinds_are_independent() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(0u32));

        let calls_clone = Arc::clone(&calls);
        bus.add(AuthEventKind::Success, move |_| *calls_clone.lock() += 1);

        bus.emit(&change_event());
        assert_eq!(*calls.lock(), 0);
        assert_eq!(bus.listener_count(AuthEventKind::Success), 1);
        assert_eq!(bus.listener_count(AuthEventKind::Change), 0);
    }

    #[test]
    fn test_listener_may_register_during_dispatch() {
        let bus = Arc::new(EventBus::new());

        let bus_clone = Arc::clone(&bus);
        bus.add(AuthEventKind::Change, move |_| {
            bus_clone.add(AuthEventKind::Change, |_| {});
        });

        bus.emit(&change_event());
        assert_eq!(bus.listener_count(AuthEventKind::Change), 2);
    }
}
