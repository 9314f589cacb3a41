//! Error types for the auth crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("An account already exists for {0}")]
    EmailTaken(String),

    /// Unknown email or wrong password; the two are not distinguished
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Stored account is malformed: {0}")]
    CorruptAccount(String),

    #[error("Account file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Account file format error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
