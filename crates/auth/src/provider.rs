//! The authentication collaborator.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::types::{AuthEvent, AuthSession, AuthUser};

/// Account registration and the single active session of this process.
///
/// Implementations broadcast an [`AuthEvent`] on every sign-in and sign-out
/// so that front ends can react without polling.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account. Does not sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Check credentials and make the account the active session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// End the active session, if any.
    async fn sign_out(&self) -> Result<()>;

    async fn get_session(&self) -> Result<Option<AuthSession>>;

    async fn get_user(&self) -> Result<Option<AuthUser>>;

    /// Stream of session changes from now on.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
