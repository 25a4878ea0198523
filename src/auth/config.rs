use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::auth::error::{AuthError, AuthResult};
use crate::auth::oauth::{resolve_redirect_uri, RedirectNormalizer, RedirectUri, UrlOpener};
use crate::platform::{environment, Platform};

/// Hosted UI settings of the identity provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSettings {
    pub domain: String,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default = "default_response_type")]
    pub response_type: String,
}

fn default_response_type() -> String {
    "code".to_string()
}

/// Provider settings as exported by the backend tooling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub user_pool_id: Option<String>,
    pub user_pool_web_client_id: String,
    pub oauth: OAuthSettings,
}

impl ProviderSettings {
    pub fn from_json(raw: &str) -> AuthResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: Value) -> AuthResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Loads settings from `SQUIRTLE_AUTH_CONFIG` (inline JSON or a file path).
    pub fn from_env() -> AuthResult<Self> {
        let value = environment::auth_config_from_env().ok_or_else(|| {
            AuthError::InvalidConfig(format!(
                "{} is not set or does not hold a JSON object",
                environment::AUTH_CONFIG_ENV
            ))
        })?;
        Self::from_value(value)
    }
}

/// What the host shell knows about the running app before anything is configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppEnvironment {
    /// The app's own URL scheme, e.g. `squirtle`.
    pub app_scheme: String,
    /// Callback URI as reported by the runtime's linking module.
    pub callback_uri: String,
    pub platform: Platform,
}

impl AppEnvironment {
    pub fn new(
        app_scheme: impl Into<String>,
        callback_uri: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            app_scheme: app_scheme.into(),
            callback_uri: callback_uri.into(),
            platform,
        }
    }

    pub fn redirect_uri(&self) -> AuthResult<RedirectUri> {
        resolve_redirect_uri(&self.callback_uri, &self.app_scheme)
    }

    pub fn normalizer(&self) -> RedirectNormalizer {
        RedirectNormalizer::new(self.platform)
    }
}

/// Complete provider configuration handed over once at startup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub provider: ProviderSettings,
    pub redirect_sign_in: RedirectUri,
    pub redirect_sign_out: RedirectUri,
    pub analytics_disabled: bool,
    pub url_opener: Option<UrlOpener>,
}

impl AuthConfig {
    pub fn new(provider: ProviderSettings, redirect: RedirectUri) -> Self {
        Self {
            provider,
            redirect_sign_in: redirect.clone(),
            redirect_sign_out: redirect,
            analytics_disabled: true,
            url_opener: None,
        }
    }

    /// Resolves the redirect URI for `environment` and builds the configuration from it.
    pub fn for_environment(
        provider: ProviderSettings,
        environment: &AppEnvironment,
    ) -> AuthResult<Self> {
        Ok(Self::new(provider, environment.redirect_uri()?))
    }

    pub fn with_url_opener(mut self, opener: UrlOpener) -> Self {
        self.url_opener = Some(opener);
        self
    }

    /// Hosted UI authorization endpoint for this client and redirect.
    pub fn authorize_url(&self) -> AuthResult<Url> {
        let oauth = &self.provider.oauth;
        let endpoint = format!("https://{}/oauth2/authorize", oauth.domain.trim());
        let scope = oauth.scope.join(" ");
        let mut params = vec![
            ("redirect_uri", self.redirect_sign_in.as_str()),
            ("response_type", oauth.response_type.as_str()),
            ("client_id", self.provider.user_pool_web_client_id.as_str()),
        ];
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }
        Ok(Url::parse_with_params(&endpoint, &params)?)
    }

    /// Runs the configured [`UrlOpener`] against the hosted UI and returns the
    /// callback the provider should finish the sign-in with.
    pub async fn open_hosted_ui(&self) -> AuthResult<RedirectUri> {
        let opener = self
            .url_opener
            .as_ref()
            .ok_or_else(|| AuthError::InvalidConfig("no url opener configured".into()))?;
        let url = self.authorize_url()?;
        opener.open(url.as_str(), &self.redirect_sign_in).await
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.provider.oauth.domain.trim().is_empty() {
            return Err(AuthError::InvalidConfig("oauth.domain is empty".into()));
        }
        if self.provider.user_pool_web_client_id.trim().is_empty() {
            return Err(AuthError::InvalidConfig(
                "userPoolWebClientId is empty".into(),
            ));
        }
        if self.redirect_sign_in != self.redirect_sign_out {
            return Err(AuthError::InvalidConfig(format!(
                "redirectSignIn `{}` differs from redirectSignOut `{}`",
                self.redirect_sign_in, self.redirect_sign_out
            )));
        }
        Ok(())
    }
}
