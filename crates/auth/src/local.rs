//! In-process auth provider.
//!
//! Accounts live in memory and can be exported to and imported from a JSON
//! file. Only one session is active per provider, matching a single signed-in
//! user per running front end.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::password::{self, MIN_PASSWORD_LEN, PBKDF2_ITERATIONS};
use crate::provider::AuthProvider;
use crate::types::{AuthEvent, AuthSession, AuthUser};

const EVENT_CAPACITY: usize = 16;

/// A stored account with its credential. The iteration count is kept per
/// account so hashes stay verifiable when the default changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user: AuthUser,
    pub salt: String,
    pub password_hash: String,
    pub iterations: u32,
}

/// On-disk form of the account table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsFile {
    pub accounts: Vec<Account>,
}

impl AccountsFile {
    /// Load accounts. A missing file holds no accounts.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

pub struct LocalAuthProvider {
    /// Keyed by normalized email
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
    /// PBKDF2 rounds applied to new accounts
    iterations: u32,
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self::from_accounts(AccountsFile::default())
    }

    pub fn from_accounts(file: AccountsFile) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let accounts = file
            .accounts
            .into_iter()
            .map(|a| (normalize_email(&a.user.email), a))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
            session: RwLock::new(None),
            events,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    /// Hash new passwords with `iterations` rounds instead of the default.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Export every account, sorted by creation time.
    pub async fn export_accounts(&self) -> AccountsFile {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by_key(|a| (a.user.created_at, a.user.id));
        AccountsFile { accounts }
    }

    fn notify(&self, event: AuthEvent) {
        // No subscribers is fine
        if self.events.send(event).is_err() {
            debug!("No auth event subscribers");
        }
    }
}

impl Default for LocalAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let key = normalize_email(email);
        if !looks_like_email(&key) {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailTaken(key));
        }

        let salt = password::generate_salt();
        let password_hash = password::hash_password(&salt, password, self.iterations)
            .ok_or_else(|| AuthError::CorruptAccount("generated salt is not hex".to_string()))?;
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: key.clone(),
            created_at: Utc::now(),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                salt,
                password_hash,
                iterations: self.iterations,
            },
        );
        info!("Registered account {}", user.id);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let key = normalize_email(email);
        let user = {
            let accounts = self.accounts.read().await;
            let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
            if !password::verify_password(
                &account.salt,
                password,
                &account.password_hash,
                account.iterations,
            ) {
                warn!("Rejected sign-in for account {}", account.user.id);
                return Err(AuthError::InvalidCredentials);
            }
            account.user.clone()
        };

        let session = AuthSession {
            access_token: password::generate_token(),
            user: user.clone(),
            created_at: Utc::now(),
        };
        *self.session.write().await = Some(session.clone());
        info!("Signed in account {}", user.id);
        self.notify(AuthEvent::SignedIn(user));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = self.session.write().await.take();
        if let Some(session) = previous {
            info!("Signed out account {}", session.user.id);
            self.notify(AuthEvent::SignedOut);
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<AuthSession>> {
        Ok(self.session.read().await.clone())
    }

    async fn get_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.session.read().await.as_ref().map(|s| s.user.clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
