//! Core domain types held by the record store.
//!
//! Three collections exist: `profiles`, `bp_readings` and
//! `recommendations`. Every row carries the id of the account that owns it
//! and every store query is scoped by that id.

use chrono::{DateTime, Utc};
use diagnosis::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advice::LifestyleAdvice;

// =============================================================================
// Identifiers
// =============================================================================

/// Account that owns a row (the auth provider's user id)
pub type OwnerId = Uuid;

/// Primary key of a blood-pressure reading
pub type ReadingId = Uuid;

/// Primary key of a stored recommendation
pub type RecommendationId = Uuid;

// =============================================================================
// Profile
// =============================================================================

/// Personal details of an account holder. Everything but the owner is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
}

impl Profile {
    /// An empty profile, as created at sign-up.
    pub fn new(owner_id: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            owner_id,
            created_at: now,
            updated_at: now,
            full_name: None,
            age: None,
            gender: None,
            email: None,
            phone: None,
            emergency_contact: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Apply a patch and bump `updated_at`.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(full_name) = &patch.full_name {
            self.full_name = non_empty(full_name);
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(gender) = &patch.gender {
            self.gender = non_empty(gender);
        }
        if let Some(phone) = &patch.phone {
            self.phone = non_empty(phone);
        }
        if let Some(contact) = &patch.emergency_contact {
            self.emergency_contact = non_empty(contact);
        }
        self.updated_at = Utc::now();
    }
}

/// Fields a user may change on their profile. `None` leaves a field alone;
/// an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
}

// =============================================================================
// Reading
// =============================================================================

/// One recorded measurement with its derived diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    pub created_at: DateTime<Utc>,
    pub owner_id: OwnerId,
    pub systolic: i32,
    pub diastolic: i32,
    pub diagnosis: Category,
    pub notes: Option<String>,
}

impl Reading {
    /// Apply a patch exactly as given. The caller is responsible for
    /// supplying a recomputed diagnosis when the measurement changes.
    pub fn apply(&mut self, patch: &ReadingPatch) {
        if let Some(systolic) = patch.systolic {
            self.systolic = systolic;
        }
        if let Some(diastolic) = patch.diastolic {
            self.diastolic = diastolic;
        }
        if let Some(diagnosis) = patch.diagnosis {
            self.diagnosis = diagnosis;
        }
        if let Some(notes) = &patch.notes {
            self.notes = non_empty(notes);
        }
    }
}

/// Row to insert into `bp_readings`. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    pub owner_id: OwnerId,
    pub systolic: i32,
    pub diastolic: i32,
    pub diagnosis: Category,
    pub notes: Option<String>,
}

/// Partial update of a reading. An empty `notes` string clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingPatch {
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub diagnosis: Option<Category>,
    pub notes: Option<String>,
}

impl ReadingPatch {
    /// True when the patch changes either blood-pressure value.
    pub fn touches_measurement(&self) -> bool {
        self.systolic.is_some() || self.diastolic.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == ReadingPatch::default()
    }
}

// =============================================================================
// Recommendation
// =============================================================================

/// Generated lifestyle guidance for one reading. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub created_at: DateTime<Utc>,
    pub owner_id: OwnerId,
    pub reading_id: ReadingId,
    pub content: LifestyleAdvice,
}

/// Row to insert into `recommendations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecommendation {
    pub owner_id: OwnerId,
    pub reading_id: ReadingId,
    pub content: LifestyleAdvice,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
