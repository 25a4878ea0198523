//! Session bootstrap and OAuth redirect handling.
//!
//! [`initialize`] validates an [`AuthConfig`] and returns the [`Auth`] handle.
//! The handle owns the [`SessionStore`], runs the one-shot
//! [`BootstrapSequencer`] and drives interactive sign-in and sign-out through
//! an [`AuthSessionGateway`]. Navigation code only needs
//! [`SessionState::screen`] or the raw `user`/`is_loading` fields.
mod api;
mod bootstrap;
mod config;
mod error;
mod gateway;
mod hub;
mod model;
mod oauth;
mod reducer;
mod store;

#[doc(inline)]
pub use api::{initialize, Auth, AuthBuilder};

#[doc(inline)]
pub use bootstrap::{request_permissions, BootstrapReport, BootstrapSequencer, RestoreOutcome};

#[doc(inline)]
pub use config::{AppEnvironment, AuthConfig, OAuthSettings, ProviderSettings};

#[doc(inline)]
pub use error::{AuthError, AuthResult};

#[doc(inline)]
pub use gateway::AuthSessionGateway;

#[doc(inline)]
pub use hub::{AuthHub, HubEvent};

#[doc(inline)]
pub use model::{AuthEvent, Screen, SessionState, User};

#[doc(inline)]
pub use oauth::{
    normalize_redirect, resolve_redirect_uri, AuthBrowser, AuthSessionResult, DeepLinkHandler,
    RedirectNormalizer, RedirectTarget, RedirectUri, UrlOpener, DEV_DEEP_LINK_SUFFIX,
    DEV_TUNNEL_SCHEME,
};

#[doc(inline)]
pub use reducer::{reduce, reduce_tagged};

#[doc(inline)]
pub use store::{AuthContextHandle, SessionChange, SessionStore};
