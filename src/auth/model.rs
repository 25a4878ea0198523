use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity record handed out by the identity provider.
///
/// The session layer never looks inside; it only stores, clones and compares users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    username: String,
    #[serde(default)]
    attributes: Value,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            attributes: Value::Null,
        }
    }

    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Provider-specific claims, untouched by this crate.
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }
}

/// The single source of truth for "is there a user, and are we still loading".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionState {
    pub is_loading: bool,
    pub is_signout: bool,
    pub user: Option<Arc<User>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_loading: true,
            is_signout: false,
            user: None,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Which screen subtree the navigation shell should mount for this state.
    pub fn screen(&self) -> Screen {
        if self.is_loading {
            Screen::Splash
        } else if self.user.is_some() {
            Screen::Home
        } else {
            Screen::SignIn
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Screen {
    /// Nothing is rendered; the native splash stays up.
    Splash,
    SignIn,
    Home,
}

/// Lifecycle and auth events consumed by the session reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEvent {
    AppReady,
    MissingToken,
    RestoreToken(Arc<User>),
    SignIn(Arc<User>),
    SignOut,
}

impl AuthEvent {
    pub const APP_READY: &'static str = "APP_READY";
    pub const MISSING_TOKEN: &'static str = "MISSING_TOKEN";
    pub const RESTORE_TOKEN: &'static str = "RESTORE_TOKEN";
    pub const SIGN_IN: &'static str = "SIGN_IN";
    pub const SIGN_OUT: &'static str = "SIGN_OUT";

    pub fn tag(&self) -> &'static str {
        match self {
            AuthEvent::AppReady => Self::APP_READY,
            AuthEvent::MissingToken => Self::MISSING_TOKEN,
            AuthEvent::RestoreToken(_) => Self::RESTORE_TOKEN,
            AuthEvent::SignIn(_) => Self::SIGN_IN,
            AuthEvent::SignOut => Self::SIGN_OUT,
        }
    }

    /// Builds an event from a host-supplied action tag.
    ///
    /// Returns `None` for unknown tags, and for user-carrying tags without a user.
    pub fn from_tag(tag: &str, user: Option<Arc<User>>) -> Option<Self> {
        match tag {
            Self::APP_READY => Some(AuthEvent::AppReady),
            Self::MISSING_TOKEN => Some(AuthEvent::MissingToken),
            Self::RESTORE_TOKEN => user.map(AuthEvent::RestoreToken),
            Self::SIGN_IN => user.map(AuthEvent::SignIn),
            Self::SIGN_OUT => Some(AuthEvent::SignOut),
            _ => None,
        }
    }

    /// Events that change who is signed in, and so must be visible to
    /// synchronous readers in the same step as the state change.
    pub fn changes_identity(&self) -> bool {
        !matches!(self, AuthEvent::AppReady)
    }
}
