//! Application services for the blood-pressure tracker.
//!
//! [`RecommendationOrchestrator`] owns readings and their lifestyle advice;
//! [`AccountService`] handles sign-up, sign-in and profiles. Both take an
//! explicit [`Session`] instead of reading a global signed-in user.

pub mod accounts;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod prompt;
pub mod session;

pub use accounts::AccountService;
pub use error::{AdvisorError, Result};
pub use extract::{ExtractError, extract_json_block, parse_advice};
pub use orchestrator::{ReadingUpdate, RecommendationOrchestrator};
pub use prompt::{PatientSummary, build_prompt};
pub use session::Session;
