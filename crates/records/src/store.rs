//! The record store collaborator and its in-process implementation.
//!
//! `RecordStore` mirrors the hosted backend's per-collection
//! select/insert/update/delete surface. Every method takes the owner id and
//! filters on it, so a caller can never read or touch another account's rows.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::snapshot::Snapshot;
use crate::types::*;

#[async_trait]
pub trait RecordStore: Send + Sync {
    // profiles
    async fn select_profile(&self, owner: OwnerId) -> Result<Option<Profile>>;
    async fn insert_profile(&self, profile: Profile) -> Result<Profile>;
    async fn update_profile(&self, owner: OwnerId, patch: ProfilePatch) -> Result<Profile>;

    // bp_readings
    /// All readings of an owner, newest first.
    async fn select_readings(&self, owner: OwnerId) -> Result<Vec<Reading>>;
    async fn select_reading(&self, owner: OwnerId, id: ReadingId) -> Result<Option<Reading>>;
    async fn insert_reading(&self, reading: NewReading) -> Result<Reading>;
    async fn update_reading(&self, owner: OwnerId, id: ReadingId, patch: ReadingPatch) -> Result<()>;
    async fn delete_reading(&self, owner: OwnerId, id: ReadingId) -> Result<()>;

    // recommendations
    /// The recommendation stored for a reading. When more than one row exists
    /// the most recently created one is returned.
    async fn select_recommendation(
        &self,
        owner: OwnerId,
        reading_id: ReadingId,
    ) -> Result<Option<Recommendation>>;
    async fn insert_recommendation(&self, recommendation: NewRecommendation) -> Result<Recommendation>;
    /// Remove every recommendation row of a reading, returning how many went.
    async fn delete_recommendations(&self, owner: OwnerId, reading_id: ReadingId) -> Result<usize>;
}

/// Table contents of the in-memory store.
#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<OwnerId, Profile>,
    readings: HashMap<ReadingId, Reading>,
    recommendations: HashMap<RecommendationId, Recommendation>,
}

/// Record store backed by hash maps, optionally seeded from and saved to a
/// JSON snapshot.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the rows of a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let tables = Tables {
            profiles: snapshot
                .profiles
                .into_iter()
                .map(|p| (p.owner_id, p))
                .collect(),
            readings: snapshot.readings.into_iter().map(|r| (r.id, r)).collect(),
            recommendations: snapshot
                .recommendations
                .into_iter()
                .map(|r| (r.id, r))
                .collect(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy every row out, in a stable order.
    pub async fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read().await;

        let mut profiles: Vec<Profile> = tables.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| (p.created_at, p.owner_id));

        let mut readings: Vec<Reading> = tables.readings.values().cloned().collect();
        readings.sort_by_key(|r| (r.created_at, r.id));

        let mut recommendations: Vec<Recommendation> =
            tables.recommendations.values().cloned().collect();
        recommendations.sort_by_key(|r| (r.created_at, r.id));

        Snapshot {
            profiles,
            readings,
            recommendations,
        }
    }

    /// Row counts as (profiles, readings, recommendations).
    pub async fn counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().await;
        (
            tables.profiles.len(),
            tables.readings.len(),
            tables.recommendations.len(),
        )
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select_profile(&self, owner: OwnerId) -> Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&owner).cloned())
    }

    async fn insert_profile(&self, profile: Profile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.owner_id) {
            return Err(StoreError::Duplicate {
                collection: "profiles",
                id: profile.owner_id,
            });
        }
        tables.profiles.insert(profile.owner_id, profile.clone());
        debug!("Inserted profile for owner {}", profile.owner_id);
        Ok(profile)
    }

    async fn update_profile(&self, owner: OwnerId, patch: ProfilePatch) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(&owner)
            .ok_or(StoreError::NotFound {
                collection: "profiles",
                id: owner,
            })?;
        profile.apply(&patch);
        Ok(profile.clone())
    }

    async fn select_readings(&self, owner: OwnerId) -> Result<Vec<Reading>> {
        let tables = self.tables.read().await;
        let mut readings: Vec<Reading> = tables
            .readings
            .values()
            .filter(|r| r.owner_id == owner)
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(readings)
    }

    async fn select_reading(&self, owner: OwnerId, id: ReadingId) -> Result<Option<Reading>> {
        let tables = self.tables.read().await;
        Ok(tables
            .readings
            .get(&id)
            .filter(|r| r.owner_id == owner)
            .cloned())
    }

    async fn insert_reading(&self, reading: NewReading) -> Result<Reading> {
        let row = Reading {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            owner_id: reading.owner_id,
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            diagnosis: reading.diagnosis,
            notes: reading.notes,
        };
        self.tables.write().await.readings.insert(row.id, row.clone());
        debug!("Inserted reading {} for owner {}", row.id, row.owner_id);
        Ok(row)
    }

    async fn update_reading(&self, owner: OwnerId, id: ReadingId, patch: ReadingPatch) -> Result<()> {
        let mut tables = self.tables.write().await;
        let reading = tables
            .readings
            .get_mut(&id)
            .filter(|r| r.owner_id == owner)
            .ok_or(StoreError::NotFound {
                collection: "bp_readings",
                id,
            })?;
        reading.apply(&patch);
        Ok(())
    }

    async fn delete_reading(&self, owner: OwnerId, id: ReadingId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .readings
            .get(&id)
            .is_some_and(|r| r.owner_id == owner);
        if !owned {
            return Err(StoreError::NotFound {
                collection: "bp_readings",
                id,
            });
        }
        tables.readings.remove(&id);
        Ok(())
    }

    async fn select_recommendation(
        &self,
        owner: OwnerId,
        reading_id: ReadingId,
    ) -> Result<Option<Recommendation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .recommendations
            .values()
            .filter(|r| r.owner_id == owner && r.reading_id == reading_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert_recommendation(&self, recommendation: NewRecommendation) -> Result<Recommendation> {
        let row = Recommendation {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            owner_id: recommendation.owner_id,
            reading_id: recommendation.reading_id,
            content: recommendation.content,
        };
        self.tables
            .write()
            .await
            .recommendations
            .insert(row.id, row.clone());
        debug!("Inserted recommendation for reading {}", row.reading_id);
        Ok(row)
    }

    async fn delete_recommendations(&self, owner: OwnerId, reading_id: ReadingId) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.recommendations.len();
        tables
            .recommendations
            .retain(|_, r| !(r.owner_id == owner && r.reading_id == reading_id));
        Ok(before - tables.recommendations.len())
    }
}
