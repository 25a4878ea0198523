use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::auth::{
    AuthBrowser, AuthConfig, AuthError, AuthResult, AuthSessionGateway, AuthSessionResult,
    DeepLinkHandler, RedirectUri, User,
};
use crate::platform::{PermissionKind, PermissionRequester, PermissionStatus};

/// Scriptable identity provider.
///
/// When the configuration it receives carries a url opener, `sign_in` runs the
/// hosted UI first and only accepts callbacks of the form `{redirect}?...`.
pub struct FakeGateway {
    session: Mutex<Option<Arc<User>>>,
    sign_in_result: Mutex<AuthResult<Arc<User>>>,
    sign_out_result: Mutex<AuthResult<()>>,
    configure_result: Mutex<AuthResult<()>>,
    sign_in_gate: Mutex<Option<Arc<Notify>>>,
    config: Mutex<Option<AuthConfig>>,
    callbacks: Mutex<Vec<String>>,
    sign_in_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn signed_out() -> Self {
        Self {
            session: Mutex::new(None),
            sign_in_result: Mutex::new(Err(AuthError::SignInFailed("not scripted".into()))),
            sign_out_result: Mutex::new(Ok(())),
            configure_result: Mutex::new(Ok(())),
            sign_in_gate: Mutex::new(None),
            config: Mutex::new(None),
            callbacks: Mutex::new(Vec::new()),
            sign_in_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn signed_in(user: Arc<User>) -> Self {
        let gateway = Self::signed_out();
        *gateway.session.lock().unwrap() = Some(user);
        gateway
    }

    pub fn with_sign_in_result(self, result: AuthResult<Arc<User>>) -> Self {
        *self.sign_in_result.lock().unwrap() = result;
        self
    }

    pub fn with_sign_out_result(self, result: AuthResult<()>) -> Self {
        *self.sign_out_result.lock().unwrap() = result;
        self
    }

    pub fn with_configure_result(self, result: AuthResult<()>) -> Self {
        *self.configure_result.lock().unwrap() = result;
        self
    }

    /// Makes `sign_in` wait until the returned notifier fires.
    pub fn gate_sign_in(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.sign_in_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn configured_redirect(&self) -> Option<RedirectUri> {
        self.config
            .lock()
            .unwrap()
            .as_ref()
            .map(|config| config.redirect_sign_in.clone())
    }

    /// Callbacks accepted from the hosted UI, in order.
    pub fn callbacks(&self) -> Vec<String> {
        self.callbacks.lock().unwrap().clone()
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    async fn complete_hosted_ui(&self) -> AuthResult<()> {
        let config = self.config.lock().unwrap().clone();
        let Some(config) = config.filter(|config| config.url_opener.is_some()) else {
            return Ok(());
        };
        let callback = config.open_hosted_ui().await?;
        let query = callback
            .as_str()
            .strip_prefix(config.redirect_sign_in.as_str())
            .filter(|rest| rest.starts_with('?'));
        if query.is_none() {
            return Err(AuthError::MalformedRedirectUnhandled(
                callback.into_string(),
            ));
        }
        self.callbacks.lock().unwrap().push(callback.into_string());
        Ok(())
    }
}

#[async_trait]
impl AuthSessionGateway for FakeGateway {
    fn configure(&self, config: &AuthConfig) -> AuthResult<()> {
        self.configure_result.lock().unwrap().clone()?;
        *self.config.lock().unwrap() = Some(config.clone());
        Ok(())
    }

    async fn current_session(&self) -> AuthResult<Arc<User>> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AuthError::NoSession("The user is not authenticated".into()))
    }

    async fn sign_in(&self) -> AuthResult<Arc<User>> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.sign_in_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.complete_hosted_ui().await?;
        let result = self.sign_in_result.lock().unwrap().clone();
        if let Ok(user) = &result {
            *self.session.lock().unwrap() = Some(user.clone());
        }
        result
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.sign_out_result.lock().unwrap().clone();
        if result.is_ok() {
            self.session.lock().unwrap().take();
        }
        result
    }
}

/// Gateway whose session check never completes.
pub struct PendingGateway;

#[async_trait]
impl AuthSessionGateway for PendingGateway {
    async fn current_session(&self) -> AuthResult<Arc<User>> {
        futures::future::pending().await
    }

    async fn sign_in(&self) -> AuthResult<Arc<User>> {
        futures::future::pending().await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        Ok(())
    }
}

/// Gateway that panics on the session check.
pub struct PanickingGateway;

#[async_trait]
impl AuthSessionGateway for PanickingGateway {
    async fn current_session(&self) -> AuthResult<Arc<User>> {
        panic!("keychain unavailable")
    }

    async fn sign_in(&self) -> AuthResult<Arc<User>> {
        Err(AuthError::SignInFailed("unavailable".into()))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        Ok(())
    }
}

pub struct FakePermission {
    kind: PermissionKind,
    result: AuthResult<PermissionStatus>,
    calls: AtomicUsize,
}

impl FakePermission {
    pub fn granting(kind: PermissionKind) -> Self {
        Self {
            kind,
            result: Ok(PermissionStatus::Granted),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(kind: PermissionKind) -> Self {
        Self {
            kind,
            result: Err(AuthError::PermissionRequest(format!("{kind} unavailable"))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionRequester for FakePermission {
    fn kind(&self) -> PermissionKind {
        self.kind
    }

    async fn request(&self) -> AuthResult<PermissionStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Browser that returns a fixed session result.
pub struct ScriptedBrowser {
    result: AuthSessionResult,
    dismissed: AtomicUsize,
}

impl ScriptedBrowser {
    pub fn new(result: AuthSessionResult) -> Self {
        Self {
            result,
            dismissed: AtomicUsize::new(0),
        }
    }

    pub fn dismiss_count(&self) -> usize {
        self.dismissed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBrowser for ScriptedBrowser {
    async fn open_auth_session(
        &self,
        _auth_url: &str,
        _redirect: &RedirectUri,
    ) -> AuthResult<AuthSessionResult> {
        Ok(self.result.clone())
    }

    async fn dismiss(&self) -> AuthResult<()> {
        self.dismissed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDeepLinks {
    opened: Mutex<Vec<String>>,
}

impl RecordingDeepLinks {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeepLinkHandler for RecordingDeepLinks {
    async fn open_url(&self, url: &RedirectUri) -> AuthResult<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
