//! # Records Crate
//!
//! Data model and record store for the blood-pressure tracker.
//!
//! ## Main Components
//!
//! - **types**: `Profile`, `Reading`, `Recommendation` and their patches
//! - **advice**: the structured content of a recommendation
//! - **store**: the `RecordStore` collaborator trait and `InMemoryRecordStore`
//! - **snapshot**: JSON files the in-memory store is loaded from and saved to
//! - **stats**: aggregate statistics over a reading history
//! - **error**: error types for store operations
//!
//! ## Example Usage
//!
//! ```ignore
//! use records::{InMemoryRecordStore, RecordStore, Snapshot};
//!
//! let store = InMemoryRecordStore::from_snapshot(Snapshot::load(path)?);
//! let readings = store.select_readings(owner_id).await?;
//! let stats = records::ReadingStats::from_readings(&readings);
//! store.snapshot().await.save(path)?;
//! ```

// Public modules
pub mod advice;
pub mod error;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use advice::{
    DietAdvice, ExerciseAdvice, LifestyleAdvice, MedicalAdvice, SleepHydrationAdvice, StressAdvice,
};
pub use error::{Result, StoreError};
pub use snapshot::Snapshot;
pub use stats::ReadingStats;
pub use store::{InMemoryRecordStore, RecordStore};
pub use types::{
    // Type aliases
    OwnerId,
    ReadingId,
    RecommendationId,
    // Core types
    NewReading,
    NewRecommendation,
    Profile,
    ProfilePatch,
    Reading,
    ReadingPatch,
    Recommendation,
};
