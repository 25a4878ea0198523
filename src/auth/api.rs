use std::sync::{Arc, Mutex};

use async_lock::Mutex as AsyncMutex;

use crate::auth::bootstrap::{BootstrapReport, BootstrapSequencer};
use crate::auth::config::AuthConfig;
use crate::auth::error::{AuthError, AuthResult};
use crate::auth::gateway::AuthSessionGateway;
use crate::auth::hub::AuthHub;
use crate::auth::model::{AuthEvent, SessionState, User};
use crate::auth::oauth::RedirectUri;
use crate::auth::store::{AuthContextHandle, SessionChange, SessionStore};
use crate::platform::PermissionRequester;
use crate::util::Subscription;

/// Handle to the configured auth layer, created once by the process bootstrap.
pub struct Auth {
    config: AuthConfig,
    gateway: Arc<dyn AuthSessionGateway>,
    store: SessionStore,
    bootstrap: Arc<BootstrapSequencer>,
    sign_in_lock: AsyncMutex<()>,
    hub_subscription: Mutex<Option<Subscription>>,
}

/// Validates `config` and wires it to `gateway` with default settings.
pub fn initialize(config: AuthConfig, gateway: Arc<dyn AuthSessionGateway>) -> AuthResult<Auth> {
    AuthBuilder::new(config, gateway).build()
}

impl Auth {
    pub fn builder(config: AuthConfig, gateway: Arc<dyn AuthSessionGateway>) -> AuthBuilder {
        AuthBuilder::new(config, gateway)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn redirect_uri(&self) -> &RedirectUri {
        &self.config.redirect_sign_in
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    pub fn context(&self) -> AuthContextHandle {
        self.store.context()
    }

    pub fn current_user(&self) -> Option<Arc<User>> {
        self.store.state().user
    }

    pub fn on_session_changed<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        self.store.subscribe(observer)
    }

    /// Forwards an event raised by UI code.
    pub fn dispatch(&self, event: AuthEvent) -> SessionState {
        self.store.dispatch(event)
    }

    /// Runs the one-shot startup sequence and waits for it.
    pub async fn bootstrap(&self) -> AuthResult<BootstrapReport> {
        self.bootstrap.run().await
    }

    /// Runs the startup sequence in the background.
    pub fn start_bootstrap(&self) {
        self.bootstrap.start();
    }

    /// Runs the interactive browser sign-in.
    ///
    /// At most one sign-in may be outstanding; a second call fails with
    /// [`AuthError::SignInInProgress`]. On any failure the session is left as it was.
    pub async fn sign_in(&self) -> AuthResult<Arc<User>> {
        let _busy = self
            .sign_in_lock
            .try_lock()
            .ok_or(AuthError::SignInInProgress)?;

        match self.gateway.sign_in().await {
            Ok(user) => {
                self.store.dispatch(AuthEvent::SignIn(user.clone()));
                Ok(user)
            }
            Err(err) => {
                log::warn!("sign-in did not complete: {err}");
                Err(err)
            }
        }
    }

    /// Signs out at the provider, then clears the local session.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.gateway.sign_out().await?;
        self.store.dispatch(AuthEvent::SignOut);
        Ok(())
    }

    pub fn is_listening_to_hub(&self) -> bool {
        self.hub_subscription.lock().unwrap().is_some()
    }

    /// Detaches the diagnostic hub listener. Also happens on drop.
    pub fn shutdown(&self) {
        if let Some(subscription) = self.hub_subscription.lock().unwrap().take() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for Auth {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct AuthBuilder {
    config: AuthConfig,
    gateway: Arc<dyn AuthSessionGateway>,
    store: Option<SessionStore>,
    hub: Option<AuthHub>,
    permissions: Vec<Arc<dyn PermissionRequester>>,
}

impl AuthBuilder {
    fn new(config: AuthConfig, gateway: Arc<dyn AuthSessionGateway>) -> Self {
        Self {
            config,
            gateway,
            store: None,
            hub: None,
            permissions: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Provider event bus to log auth events from.
    pub fn with_hub(mut self, hub: AuthHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Permission prompted for during bootstrap.
    pub fn with_permission(mut self, requester: Arc<dyn PermissionRequester>) -> Self {
        self.permissions.push(requester);
        self
    }

    pub fn build(self) -> AuthResult<Auth> {
        self.config.validate()?;
        self.gateway.configure(&self.config)?;

        let store = self.store.unwrap_or_default();
        let bootstrap = BootstrapSequencer::new(self.gateway.clone(), store.clone())
            .with_permissions(self.permissions);

        let hub_subscription = self.hub.map(|hub| {
            hub.listen(|event| {
                log::info!("hub:auth {} {}", event.name, event.data);
            })
        });

        log::debug!(
            "auth configured: redirect {} (opener: {})",
            self.config.redirect_sign_in,
            self.config.url_opener.is_some()
        );

        Ok(Auth {
            config: self.config,
            gateway: self.gateway,
            store,
            bootstrap: Arc::new(bootstrap),
            sign_in_lock: AsyncMutex::new(()),
            hub_subscription: Mutex::new(hub_subscription),
        })
    }
}
