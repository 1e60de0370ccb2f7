//! Identity provider port.
//!
//! Implementations may front a hosted identity service or an in-memory
//! credential list. The converter only ever consumes `current_user()`.

use crate::domain::UserId;
use crate::error::AuthError;

/// Port trait for identity providers.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Authenticates with email and password and starts a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// The user of the active session, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Ends the active session. Signing out without a session is a no-op.
    fn sign_out(&self);
}
