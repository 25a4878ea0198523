mod redirect;

pub use redirect::{
    normalize_redirect, resolve_redirect_uri, RedirectNormalizer, RedirectTarget, RedirectUri,
    DEV_DEEP_LINK_SUFFIX, DEV_TUNNEL_SCHEME,
};

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::auth::error::{AuthError, AuthResult};

/// Outcome of an interactive browser auth session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthSessionResult {
    /// The provider redirected back to the app with this URL.
    Success { url: String },
    /// The user closed the browser.
    Cancel,
    /// The browser was dismissed programmatically before a redirect arrived.
    Dismiss,
}

/// Platform primitive that opens the system auth browser and waits for the redirect.
#[async_trait]
pub trait AuthBrowser: Send + Sync {
    async fn open_auth_session(
        &self,
        auth_url: &str,
        redirect: &RedirectUri,
    ) -> AuthResult<AuthSessionResult>;

    async fn dismiss(&self) -> AuthResult<()>;
}

/// Hands a callback URL to the app's own deep-link routing.
#[async_trait]
pub trait DeepLinkHandler: Send + Sync {
    async fn open_url(&self, url: &RedirectUri) -> AuthResult<()>;
}

/// The `urlOpener` hook given to the identity provider.
///
/// Opens the auth browser, repairs the returned callback where the platform
/// needs it and, on those platforms, closes the browser and re-delivers the
/// repaired URL to the deep-link handler.
#[derive(Clone)]
pub struct UrlOpener {
    browser: Arc<dyn AuthBrowser>,
    deep_links: Arc<dyn DeepLinkHandler>,
    normalizer: RedirectNormalizer,
}

impl UrlOpener {
    pub fn new(
        browser: Arc<dyn AuthBrowser>,
        deep_links: Arc<dyn DeepLinkHandler>,
        normalizer: RedirectNormalizer,
    ) -> Self {
        Self {
            browser,
            deep_links,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> RedirectNormalizer {
        self.normalizer
    }

    /// Runs one browser round trip and returns the callback the app should consume.
    pub async fn open(&self, auth_url: &str, redirect: &RedirectUri) -> AuthResult<RedirectUri> {
        log::debug!("url opener: {auth_url} (redirect {redirect})");
        let result = self.browser.open_auth_session(auth_url, redirect).await?;
        log::debug!("url opener result: {result:?}");

        let raw = match result {
            AuthSessionResult::Success { url } => url,
            AuthSessionResult::Cancel | AuthSessionResult::Dismiss => {
                return Err(AuthError::SignInCancelled)
            }
        };

        let callback = self.normalizer.normalize(&raw);
        if callback.as_str() != raw {
            log::info!("url opener repaired callback: {raw} -> {callback}");
        }
        ensure_matches_redirect(&callback, redirect)?;

        if self.normalizer.repairs_callbacks() {
            if let Err(err) = self.browser.dismiss().await {
                log::warn!("failed to dismiss auth browser: {err}");
            }
            self.deep_links.open_url(&callback).await?;
        }
        Ok(callback)
    }
}

impl std::fmt::Debug for UrlOpener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlOpener")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

/// The callback must come back on the scheme that was registered with the provider.
fn ensure_matches_redirect(callback: &RedirectUri, redirect: &RedirectUri) -> AuthResult<()> {
    let expected = Url::parse(redirect.as_str())?;
    match Url::parse(callback.as_str()) {
        Ok(actual) if actual.scheme() == expected.scheme() => Ok(()),
        _ => Err(AuthError::MalformedRedirectUnhandled(
            callback.as_str().to_string(),
        )),
    }
}
