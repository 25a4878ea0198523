use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::model::{AuthEvent, SessionState, User};
use crate::auth::reducer::{reduce, reduce_tagged};
use crate::util::{Listener, Subscription};

/// What observers receive for every applied event.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionChange {
    /// `None` when the dispatched tag was not recognized.
    pub event: Option<AuthEvent>,
    pub previous: SessionState,
    pub current: SessionState,
}

type Delivery = (SessionChange, Vec<Listener<SessionChange>>);

#[derive(Default)]
struct StoreInner {
    state: SessionState,
    observers: Vec<(usize, Listener<SessionChange>)>,
    /// Applied changes not yet handed to observers, in dispatch order.
    pending: VecDeque<Delivery>,
    /// Set while some caller is draining `pending`.
    delivering: bool,
}

/// Owns the live [`SessionState`] and serializes every transition through it.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<StoreInner>>,
    next_id: Arc<AtomicUsize>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner::default())),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state.clone()
    }

    /// Applies `event` and returns the resulting state.
    pub fn dispatch(&self, event: AuthEvent) -> SessionState {
        self.apply(|prev| (reduce(prev, &event), Some(event.clone())))
    }

    /// Applies a host-named event; unknown tags are logged and otherwise ignored.
    pub fn dispatch_tagged(&self, tag: &str, user: Option<Arc<User>>) -> SessionState {
        let event = AuthEvent::from_tag(tag, user.clone());
        self.apply(|prev| (reduce_tagged(prev, tag, user), event))
    }

    /// Reduces under the lock, then delivers queued changes in dispatch order.
    ///
    /// Only one caller drains the queue at a time. A dispatch made while another
    /// caller (or an observer on this thread) is delivering returns as soon as
    /// its change is queued; the active drainer delivers it next.
    fn apply<F>(&self, transition: F) -> SessionState
    where
        F: FnOnce(&SessionState) -> (SessionState, Option<AuthEvent>),
    {
        let (current, drain) = {
            let mut guard = self.inner.lock().unwrap();
            let previous = guard.state.clone();
            let (current, event) = transition(&previous);
            guard.state = current.clone();
            let change = SessionChange {
                event,
                previous,
                current: current.clone(),
            };
            log_change(&change);

            let observers = guard
                .observers
                .iter()
                .map(|(_, observer)| observer.clone())
                .collect::<Vec<_>>();
            guard.pending.push_back((change, observers));

            let drain = !guard.delivering;
            guard.delivering = true;
            (current, drain)
        };

        if drain {
            self.drain_pending();
        }
        current
    }

    fn drain_pending(&self) {
        let _reset = DeliveryReset { inner: &self.inner };
        loop {
            let next = {
                let mut guard = self.inner.lock().unwrap();
                let next = guard.pending.pop_front();
                if next.is_none() {
                    guard.delivering = false;
                }
                next
            };
            let Some((change, observers)) = next else {
                return;
            };
            // Observers run outside the lock so they may dispatch or read state themselves.
            for observer in observers {
                observer(&change);
            }
        }
    }

    /// Registers an observer called after every dispatch.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .lock()
            .unwrap()
            .observers
            .push((id, Arc::new(observer)));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                if let Ok(mut guard) = inner.lock() {
                    guard.observers.retain(|(observer_id, _)| *observer_id != id);
                }
            }
        })
    }

    /// Synchronous read-only view for code outside the reactive flow.
    pub fn context(&self) -> AuthContextHandle {
        AuthContextHandle {
            store: self.clone(),
        }
    }
}

/// Releases the drain role if an observer panics mid-delivery.
struct DeliveryReset<'a> {
    inner: &'a Mutex<StoreInner>,
}

impl Drop for DeliveryReset<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut guard) = self.inner.lock() {
                guard.pending.clear();
                guard.delivering = false;
            }
        }
    }
}

/// Answers "who is logged in right now" without subscribing.
///
/// Reads go through the store, so the answer always matches the latest
/// applied transition.
#[derive(Clone)]
pub struct AuthContextHandle {
    store: SessionStore,
}

impl AuthContextHandle {
    pub fn user(&self) -> Option<Arc<User>> {
        self.store.inner.lock().unwrap().state.user.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.store.state()
    }
}

fn log_change(change: &SessionChange) {
    log::debug!(
        "dispatch {}: {:?} -> {:?}",
        change.event.as_ref().map_or("<unrecognized>", AuthEvent::tag),
        change.previous,
        change.current
    );
    if change.event.as_ref().is_some_and(AuthEvent::changes_identity)
        && change.previous.user != change.current.user
    {
        log::info!(
            "session user is now {}",
            change
                .current
                .user
                .as_deref()
                .map_or("<none>", User::username)
        );
    }
}

impl std::fmt::Debug for AuthContextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContextHandle")
            .field("user", &self.user())
            .finish()
    }
}
