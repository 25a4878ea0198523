use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::error::{AuthError, AuthResult};
use crate::platform::Platform;

/// Scheme used by the development client when serving over a local network.
pub const DEV_TUNNEL_SCHEME: &str = "exp://";
/// Deep-link route the development proxy needs appended to local callbacks.
pub const DEV_DEEP_LINK_SUFFIX: &str = "/--/";

const MALFORMED_SEPARATOR: &str = ":///?";
const REPAIRED_SEPARATOR: &str = "://?";

/// Callback address registered with the identity provider and expected back
/// from the browser. Both sides must use the same bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectUri(String);

impl RedirectUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this URI uses `scheme` as its scheme (exact, case-sensitive).
    pub fn has_scheme(&self, scheme: &str) -> bool {
        has_scheme(&self.0, scheme)
    }
}

impl fmt::Display for RedirectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RedirectUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Runtime the callback URI was reported from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Development client on localhost or the LAN.
    LocalTunnel,
    /// Production build with its own URL scheme.
    NativeApp,
    /// Development client reached through a hosted tunnel.
    WideAreaTunnel,
}

impl RedirectTarget {
    pub fn detect(raw_callback_uri: &str, app_scheme: &str) -> Self {
        if is_local_tunnel(raw_callback_uri) {
            RedirectTarget::LocalTunnel
        } else if has_scheme(raw_callback_uri, app_scheme) {
            RedirectTarget::NativeApp
        } else {
            RedirectTarget::WideAreaTunnel
        }
    }
}

/// Computes the redirect URI to register with the provider for the current runtime.
///
/// Local tunnels get the development deep-link route, native builds are used
/// as-is and hosted tunnels get a trailing slash. The raw URI is never trimmed
/// or otherwise rewritten.
///
/// Unlike a plain concatenation, a suffix the URI already ends with is not
/// appended again, and a trailing `/` is merged into the suffix's leading `/`.
/// `exp://127.0.0.1:19000/` therefore resolves to `exp://127.0.0.1:19000/--/`
/// rather than `exp://127.0.0.1:19000//--/`, and resolving a resolved URI
/// returns it unchanged.
///
/// `app_scheme` may be given bare (`squirtle`) or with its separator
/// (`squirtle:` or `squirtle://`).
pub fn resolve_redirect_uri(raw_callback_uri: &str, app_scheme: &str) -> AuthResult<RedirectUri> {
    let raw = raw_callback_uri;
    if raw.is_empty() {
        return Err(AuthError::InvalidRedirectUri(
            "runtime reported an empty callback URI".into(),
        ));
    }

    let target = RedirectTarget::detect(raw, app_scheme);
    let resolved = match target {
        RedirectTarget::LocalTunnel => append_suffix(raw, DEV_DEEP_LINK_SUFFIX),
        RedirectTarget::NativeApp => raw.to_string(),
        RedirectTarget::WideAreaTunnel => append_suffix(raw, "/"),
    };

    Url::parse(&resolved)?;
    log::debug!("resolved redirect uri ({target:?}): {raw} -> {resolved}");
    Ok(RedirectUri(resolved))
}

fn is_local_tunnel(uri: &str) -> bool {
    uri.strip_prefix(DEV_TUNNEL_SCHEME)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|first| first.is_ascii_digit())
}

fn has_scheme(uri: &str, scheme: &str) -> bool {
    let scheme = bare_scheme(scheme);
    !scheme.is_empty()
        && uri
            .strip_prefix(scheme)
            .is_some_and(|rest| rest.starts_with(':'))
}

fn bare_scheme(scheme: &str) -> &str {
    scheme
        .strip_suffix("://")
        .or_else(|| scheme.strip_suffix(':'))
        .unwrap_or(scheme)
}

fn append_suffix(uri: &str, suffix: &str) -> String {
    if uri.ends_with(suffix) {
        return uri.to_string();
    }
    // Avoid `//--/` when the runtime already ended the URI with a slash.
    match (uri.ends_with('/'), suffix.strip_prefix('/')) {
        (true, Some(rest)) => format!("{uri}{rest}"),
        _ => format!("{uri}{suffix}"),
    }
}

/// Repairs callback URLs mangled by the in-app browser on affected platforms.
///
/// The iOS auth session sometimes hands back `scheme:///?...` instead of
/// `scheme://?...` after the app resumes from the background. Only that
/// scheme separator is touched; query and fragment are left alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedirectNormalizer {
    platform: Platform,
}

impl RedirectNormalizer {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether callbacks on this platform need repairing and re-delivery.
    pub fn repairs_callbacks(&self) -> bool {
        matches!(self.platform, Platform::Ios)
    }

    pub fn normalize(&self, result_url: &str) -> RedirectUri {
        if !self.repairs_callbacks() {
            return RedirectUri(result_url.to_string());
        }
        RedirectUri(repair_separator(result_url))
    }
}

/// Free-function form of [`RedirectNormalizer::normalize`].
pub fn normalize_redirect(result_url: &str, platform: Platform) -> RedirectUri {
    RedirectNormalizer::new(platform).normalize(result_url)
}

fn repair_separator(url: &str) -> String {
    match url.find(':') {
        Some(idx) if url[idx..].starts_with(MALFORMED_SEPARATOR) => {
            let mut repaired = String::with_capacity(url.len() - 1);
            repaired.push_str(&url[..idx]);
            repaired.push_str(REPAIRED_SEPARATOR);
            repaired.push_str(&url[idx + MALFORMED_SEPARATOR.len()..]);
            repaired
        }
        _ => url.to_string(),
    }
}
