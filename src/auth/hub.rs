use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::util::{Listener, Subscription};

/// Event published by the identity provider on its `auth` channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HubEvent {
    /// Provider event name, e.g. `signIn`, `signOut`, `signIn_failure`.
    pub name: String,
    pub data: Value,
    pub at: DateTime<Utc>,
}

impl HubEvent {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            at: Utc::now(),
        }
    }
}

#[derive(Default)]
struct HubState {
    listeners: Vec<(usize, Listener<HubEvent>)>,
}

/// Provider-level event bus. The session layer only listens to it for diagnostics.
#[derive(Clone)]
pub struct AuthHub {
    state: Arc<Mutex<HubState>>,
    next_id: Arc<AtomicUsize>,
}

impl Default for AuthHub {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState::default())),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }
}

impl AuthHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&HubEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .listeners
            .push((id, Arc::new(listener)));

        let state = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                if let Ok(mut guard) = state.lock() {
                    guard
                        .listeners
                        .retain(|(listener_id, _)| *listener_id != id);
                }
            }
        })
    }

    pub fn publish(&self, event: HubEvent) {
        let listeners = {
            let guard = self.state.lock().unwrap();
            guard
                .listeners
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect::<Vec<_>>()
        };

        for listener in listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().unwrap().listeners.len()
    }
}
