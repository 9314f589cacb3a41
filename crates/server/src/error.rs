//! Errors returned by the orchestrator and account service.

use auth::AuthError;
use records::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// The reading or profile does not exist for the current owner
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// No active user context
    #[error("Not signed in")]
    Unauthenticated,

    /// The text-generation call failed or its answer could not be parsed.
    /// `raw_response` holds the service's text when there was one.
    #[error("Failed to generate recommendations: {reason}")]
    GenerationFailed {
        reason: String,
        raw_response: Option<String>,
    },

    /// A record-store write failed
    #[error("Failed to persist {what}: {source}")]
    PersistenceFailed {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    /// A record-store read failed
    #[error("Failed to load {what}: {source}")]
    Store {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AdvisorError {
    pub(crate) fn generation_failed(reason: impl Into<String>, raw_response: Option<&str>) -> Self {
        AdvisorError::GenerationFailed {
            reason: reason.into(),
            raw_response: raw_response.map(str::to_string),
        }
    }

    pub(crate) fn persistence(what: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AdvisorError::PersistenceFailed { what, source }
    }

    pub(crate) fn store(what: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AdvisorError::Store { what, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AdvisorError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
