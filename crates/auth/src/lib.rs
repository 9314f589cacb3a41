//! # Auth Crate
//!
//! The authentication collaborator of the blood-pressure tracker.
//!
//! ## Components
//!
//! - **provider**: the `AuthProvider` trait (sign-up, sign-in, sign-out,
//!   session lookup and a stream of session-change events)
//! - **local**: `LocalAuthProvider`, an in-process implementation whose
//!   account table can be saved to a JSON file
//! - **password**: salted PBKDF2-HMAC-SHA256 hashing used by the local provider
//!
//! ## Example Usage
//!
//! ```ignore
//! use auth::{AuthProvider, LocalAuthProvider, AuthEvent};
//!
//! let provider = LocalAuthProvider::new();
//! let mut events = provider.subscribe();
//!
//! provider.sign_up("sam@example.com", "hunter22").await?;
//! let session = provider.sign_in("sam@example.com", "hunter22").await?;
//! assert_eq!(events.recv().await?, AuthEvent::SignedIn(session.user));
//! ```

pub mod error;
pub mod local;
pub mod password;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use error::{AuthError, Result};
pub use local::{Account, AccountsFile, LocalAuthProvider};
pub use provider::AuthProvider;
pub use types::{AuthEvent, AuthSession, AuthUser};
