use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::config::AuthConfig;
use crate::auth::error::AuthResult;
use crate::auth::model::User;

/// Narrow adapter over the external identity provider.
///
/// Token storage and refresh stay with the provider; this crate only asks
/// who is signed in and asks it to sign users in and out.
#[async_trait]
pub trait AuthSessionGateway: Send + Sync {
    /// Receives the validated configuration once, when the [`crate::auth::Auth`]
    /// handle is built. Gateways that drive the hosted UI keep it to reach
    /// [`AuthConfig::open_hosted_ui`] from `sign_in`.
    ///
    /// An error aborts [`crate::auth::AuthBuilder::build`].
    fn configure(&self, config: &AuthConfig) -> AuthResult<()> {
        let _ = config;
        Ok(())
    }

    /// Returns the user of a previously persisted, still valid session.
    ///
    /// Fails with [`crate::auth::AuthError::NoSession`] when there is none,
    /// it expired, or the provider could not be reached.
    async fn current_session(&self) -> AuthResult<Arc<User>>;

    /// Runs the interactive browser flow and resolves with the signed-in user.
    async fn sign_in(&self) -> AuthResult<Arc<User>>;

    async fn sign_out(&self) -> AuthResult<()>;
}
