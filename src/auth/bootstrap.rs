use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::gateway::AuthSessionGateway;
use crate::auth::model::{AuthEvent, SessionState, User};
use crate::auth::store::SessionStore;
use crate::platform::runtime::spawn_detached;
use crate::platform::{PermissionOutcome, PermissionRequester};

/// How the cold-start session check ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RestoreOutcome {
    Restored(Arc<User>),
    /// Every failure collapses here: absent, expired, unreachable or a panicking gateway.
    Missing(AuthError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BootstrapReport {
    pub restore: RestoreOutcome,
    /// State right after `APP_READY` was applied.
    pub state: SessionState,
}

/// Dispatches `APP_READY` when dropped, whichever way the bootstrap scope is left.
struct ReadyGuard {
    store: SessionStore,
}

impl Drop for ReadyGuard {
    fn drop(&mut self) {
        self.store.dispatch(AuthEvent::AppReady);
    }
}

/// One-shot startup routine: restore the session, fire off permission
/// prompts, then mark the app ready.
pub struct BootstrapSequencer {
    gateway: Arc<dyn AuthSessionGateway>,
    store: SessionStore,
    permissions: Vec<Arc<dyn PermissionRequester>>,
    started: AtomicBool,
}

impl BootstrapSequencer {
    pub fn new(gateway: Arc<dyn AuthSessionGateway>, store: SessionStore) -> Self {
        Self {
            gateway,
            store,
            permissions: Vec::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn with_permission(mut self, requester: Arc<dyn PermissionRequester>) -> Self {
        self.permissions.push(requester);
        self
    }

    pub fn with_permissions<I>(mut self, requesters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn PermissionRequester>>,
    {
        self.permissions.extend(requesters);
        self
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Runs the sequence. Only the first call does anything; later calls fail
    /// with [`AuthError::AlreadyBootstrapped`] without dispatching.
    ///
    /// `APP_READY` is always the last event this dispatches, including when the
    /// returned future is dropped before completion.
    pub async fn run(&self) -> AuthResult<BootstrapReport> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AuthError::AlreadyBootstrapped);
        }

        let ready = ReadyGuard {
            store: self.store.clone(),
        };
        let restore = self.restore_session().await;
        self.spawn_permission_requests();
        drop(ready);

        Ok(BootstrapReport {
            restore,
            state: self.store.state(),
        })
    }

    /// Starts [`run`](Self::run) in the background so the UI can mount meanwhile.
    pub fn start(self: &Arc<Self>) {
        let sequencer = Arc::clone(self);
        spawn_detached(async move {
            if let Err(err) = sequencer.run().await {
                log::warn!("bootstrap skipped: {err}");
            }
        });
    }

    async fn restore_session(&self) -> RestoreOutcome {
        let attempt = AssertUnwindSafe(self.gateway.current_session())
            .catch_unwind()
            .await;

        match attempt {
            Ok(Ok(user)) => {
                self.store.dispatch(AuthEvent::RestoreToken(user.clone()));
                RestoreOutcome::Restored(user)
            }
            Ok(Err(err)) => {
                log::info!("no session to restore: {err}");
                self.store.dispatch(AuthEvent::MissingToken);
                RestoreOutcome::Missing(err)
            }
            Err(_) => {
                log::warn!("session restore panicked; continuing signed out");
                self.store.dispatch(AuthEvent::MissingToken);
                RestoreOutcome::Missing(AuthError::NoSession("session check panicked".into()))
            }
        }
    }

    fn spawn_permission_requests(&self) {
        if self.permissions.is_empty() {
            return;
        }
        let requesters = self.permissions.clone();
        spawn_detached(async move {
            request_permissions(&requesters).await;
        });
    }
}

/// Prompts for every permission concurrently and logs each outcome.
///
/// Failures are reported in the returned outcomes and never propagated.
pub async fn request_permissions(
    requesters: &[Arc<dyn PermissionRequester>],
) -> Vec<PermissionOutcome> {
    let outcomes = join_all(requesters.iter().map(|requester| async move {
        let kind = requester.kind();
        let result = match AssertUnwindSafe(requester.request()).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(AuthError::PermissionRequest(format!(
                "{kind} request panicked"
            ))),
        };
        PermissionOutcome { kind, result }
    }))
    .await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(status) => log::info!("bootstrap: {} permission {:?}", outcome.kind, status),
            Err(err) => log::warn!("bootstrap: {} permission failed: {err}", outcome.kind),
        }
    }
    outcomes
}
