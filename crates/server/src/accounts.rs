//! Sign-up, sign-in and profile management on top of an auth provider.

use std::sync::Arc;

use tracing::{info, warn};

use auth::{AuthEvent, AuthProvider, AuthUser};
use records::{Profile, ProfilePatch, RecordStore};
use tokio::sync::broadcast;

use crate::error::{AdvisorError, Result};
use crate::session::Session;

#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RecordStore>,
}

impl AccountService {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self { auth, store }
    }

    /// Register an account and create its profile holding the email.
    ///
    /// Registration does not sign the user in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let user = self.auth.sign_up(email, password).await?;
        self.store
            .insert_profile(Profile::new(user.id).with_email(user.email.clone()))
            .await
            .map_err(AdvisorError::persistence("profile"))?;
        info!("Created profile for account {}", user.id);
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let auth_session = self.auth.sign_in(email, password).await?;
        let profile = self.load_profile(&auth_session.user).await;
        Ok(Session::new(auth_session.user, profile))
    }

    /// End the session. Consumes it so it cannot be used afterwards.
    pub async fn sign_out(&self, session: Session) -> Result<()> {
        self.auth.sign_out().await?;
        info!("Session for {} ended", session.owner_id());
        Ok(())
    }

    /// Rebuild the session for whoever is signed in with the provider.
    pub async fn current_session(&self) -> Result<Session> {
        if self.auth.get_session().await?.is_none() {
            return Err(AdvisorError::Unauthenticated);
        }
        let user = self.auth.get_user().await?.ok_or(AdvisorError::Unauthenticated)?;
        let profile = self.load_profile(&user).await;
        Ok(Session::new(user, profile))
    }

    /// Auth state changes, for front ends that react to sign-in and sign-out.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }

    pub async fn get_profile(&self, session: &Session) -> Result<Profile> {
        let owner = session.owner_id();
        self.store
            .select_profile(owner)
            .await
            .map_err(AdvisorError::store("profile"))?
            .ok_or(AdvisorError::NotFound {
                entity: "profile",
                id: owner,
            })
    }

    /// Apply a profile edit and refresh the session's copy.
    pub async fn update_profile(&self, session: &mut Session, patch: ProfilePatch) -> Result<Profile> {
        let owner = session.owner_id();
        let profile = self
            .store
            .update_profile(owner, patch)
            .await
            .map_err(|e| match e {
                records::StoreError::NotFound { .. } => AdvisorError::NotFound {
                    entity: "profile",
                    id: owner,
                },
                other => AdvisorError::PersistenceFailed {
                    what: "profile",
                    source: other,
                },
            })?;
        session.profile = Some(profile.clone());
        info!("Updated profile for {}", owner);
        Ok(profile)
    }

    /// A missing or unreadable profile leaves the session without one;
    /// prompts fall back to defaults.
    async fn load_profile(&self, user: &AuthUser) -> Option<Profile> {
        match self.store.select_profile(user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Failed to load profile for {}: {}", user.id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::{AuthError, LocalAuthProvider};
    use records::InMemoryRecordStore;

    fn service() -> AccountService {
        AccountService::new(
            Arc::new(LocalAuthProvider::new().with_iterations(1_000)),
            Arc::new(InMemoryRecordStore::new()),
        )
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile_with_email() {
        let accounts = service();
        accounts.sign_up("Lee@Example.com", "hunter22").await.unwrap();

        let session = accounts.sign_in("lee@example.com", "hunter22").await.unwrap();
        let profile = session.profile.clone().unwrap();
        assert_eq!(profile.email.as_deref(), Some("lee@example.com"));
        assert_eq!(accounts.get_profile(&session).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_current_session_requires_sign_in() {
        let accounts = service();
        assert!(matches!(
            accounts.current_session().await,
            Err(AdvisorError::Unauthenticated)
        ));

        let user = accounts.sign_up("kim@example.com", "hunter22").await.unwrap();
        assert!(matches!(
            accounts.current_session().await,
            Err(AdvisorError::Unauthenticated)
        ));

        let session = accounts.sign_in("kim@example.com", "hunter22").await.unwrap();
        let restored = accounts.current_session().await.unwrap();
        assert_eq!(restored.owner_id(), user.id);
        assert_eq!(restored, session);

        accounts.sign_out(session).await.unwrap();
        assert!(matches!(
            accounts.current_session().await,
            Err(AdvisorError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_auth_errors_pass_through() {
        let accounts = service();
        accounts.sign_up("dup@example.com", "hunter22").await.unwrap();

        assert!(matches!(
            accounts.sign_up("dup@example.com", "another1").await,
            Err(AdvisorError::Auth(AuthError::EmailTaken(_)))
        ));
        assert!(matches!(
            accounts.sign_in("dup@example.com", "wrong-one").await,
            Err(AdvisorError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_session() {
        let accounts = service();
        accounts.sign_up("ray@example.com", "hunter22").await.unwrap();
        let mut session = accounts.sign_in("ray@example.com", "hunter22").await.unwrap();

        let updated = accounts
            .update_profile(
                &mut session,
                ProfilePatch {
                    full_name: Some("Ray Park".to_string()),
                    age: Some(47),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name.as_deref(), Some("Ray Park"));
        assert_eq!(session.profile.as_ref(), Some(&updated));
        assert!(updated.updated_at >= updated.created_at);
    }
}
