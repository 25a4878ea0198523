use std::fmt;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable session could be restored (absent, expired or unreachable provider).
    NoSession(String),
    /// The user closed the browser before the provider redirected back.
    SignInCancelled,
    SignInFailed(String),
    /// Another interactive sign-in is still outstanding.
    SignInInProgress,
    PermissionRequest(String),
    /// The browser handed back a callback the provider refused, even after normalization.
    MalformedRedirectUnhandled(String),
    InvalidRedirectUri(String),
    InvalidConfig(String),
    AlreadyBootstrapped,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NoSession(message) => write!(f, "No session: {message}"),
            AuthError::SignInCancelled => write!(f, "Sign-in was cancelled"),
            AuthError::SignInFailed(message) => write!(f, "Sign-in failed: {message}"),
            AuthError::SignInInProgress => write!(f, "A sign-in is already in progress"),
            AuthError::PermissionRequest(message) => {
                write!(f, "Permission request failed: {message}")
            }
            AuthError::MalformedRedirectUnhandled(url) => {
                write!(f, "Sign-in failed: provider rejected redirect `{url}`")
            }
            AuthError::InvalidRedirectUri(message) => {
                write!(f, "Invalid redirect URI: {message}")
            }
            AuthError::InvalidConfig(message) => write!(f, "Invalid auth configuration: {message}"),
            AuthError::AlreadyBootstrapped => write!(f, "Bootstrap sequence already ran"),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Whether the error belongs to the interactive sign-in family surfaced to the UI.
    pub fn is_sign_in_failure(&self) -> bool {
        matches!(
            self,
            AuthError::SignInCancelled
                | AuthError::SignInFailed(_)
                | AuthError::MalformedRedirectUnhandled(_)
        )
    }
}

impl From<url::ParseError> for AuthError {
    fn from(error: url::ParseError) -> Self {
        AuthError::InvalidRedirectUri(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        AuthError::InvalidConfig(error.to_string())
    }
}
