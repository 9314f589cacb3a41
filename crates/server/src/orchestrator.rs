//! # Recommendation Orchestrator
//!
//! Coordinates readings and their lifestyle advice:
//! 1. Classify and store readings for the signed-in owner
//! 2. Serve advice from the process cache when present
//! 3. Fall back to a stored recommendation
//! 4. Otherwise build a prompt, call the text generator and parse the answer
//! 5. Persist the new recommendation and cache it
//!
//! The cache lock is only held for a lookup or an insert, never across a
//! store or generator call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use diagnosis::classify;
use genai_client::TextGenerator;
use records::{
    LifestyleAdvice, NewReading, NewRecommendation, OwnerId, Reading, ReadingId, ReadingPatch,
    ReadingStats, RecordStore,
};

use crate::error::{AdvisorError, Result};
use crate::extract;
use crate::prompt::{self, PatientSummary};
use crate::session::Session;

/// Cached advice, tagged with the owner it was generated for.
#[derive(Debug, Clone)]
struct CachedAdvice {
    owner_id: OwnerId,
    advice: LifestyleAdvice,
}

/// Fields a user may change on a reading. The diagnosis is never set
/// directly; it follows the measurement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingUpdate {
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<dyn RecordStore>,
    generator: Arc<dyn TextGenerator>,
    cache: Arc<RwLock<HashMap<ReadingId, CachedAdvice>>>,
}

impl RecommendationOrchestrator {
    pub fn new(store: Arc<dyn RecordStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            generator,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Advice for one of the owner's readings.
    ///
    /// Served from the cache, then from the store, and generated only when
    /// neither has it.
    pub async fn get_recommendations(&self, session: &Session, reading_id: ReadingId) -> Result<LifestyleAdvice> {
        let owner = session.owner_id();

        if let Some(advice) = self.cached(owner, reading_id).await {
            debug!("Cache hit for reading {}", reading_id);
            return Ok(advice);
        }

        match self.store.select_recommendation(owner, reading_id).await {
            Ok(Some(stored)) => {
                info!("Loaded stored recommendation {} for reading {}", stored.id, reading_id);
                self.remember(owner, reading_id, stored.content.clone()).await;
                return Ok(stored.content);
            }
            Ok(None) => debug!("No stored recommendation for reading {}", reading_id),
            Err(e) => warn!("Failed to look up recommendation for reading {}: {}", reading_id, e),
        }

        let reading = self.load_reading(owner, reading_id).await?;
        self.generate_and_persist(session, &reading).await
    }

    /// Classify and store a new reading, then generate its advice eagerly.
    ///
    /// Generation problems are logged; the stored reading is returned either way.
    pub async fn add_reading(
        &self,
        session: &Session,
        systolic: i32,
        diastolic: i32,
        notes: Option<String>,
    ) -> Result<Reading> {
        let diagnosis = classify(systolic, diastolic);
        let reading = self
            .store
            .insert_reading(NewReading {
                owner_id: session.owner_id(),
                systolic,
                diastolic,
                diagnosis,
                notes: notes.filter(|n| !n.trim().is_empty()),
            })
            .await
            .map_err(AdvisorError::persistence("reading"))?;
        info!(
            "Stored reading {} ({}/{} mmHg, {})",
            reading.id, systolic, diastolic, diagnosis
        );

        if let Err(e) = self.generate_and_persist(session, &reading).await {
            warn!("Advice for new reading {} was not generated: {}", reading.id, e);
        }

        Ok(reading)
    }

    /// The owner's readings, newest first.
    pub async fn list_readings(&self, session: &Session) -> Result<Vec<Reading>> {
        self.store
            .select_readings(session.owner_id())
            .await
            .map_err(AdvisorError::store("readings"))
    }

    pub async fn get_reading(&self, session: &Session, reading_id: ReadingId) -> Result<Reading> {
        self.load_reading(session.owner_id(), reading_id).await
    }

    /// Apply an edit to a reading.
    ///
    /// The diagnosis is recomputed from the merged values whenever either
    /// value changes. Any existing recommendation is kept as is.
    pub async fn update_reading(
        &self,
        session: &Session,
        reading_id: ReadingId,
        update: ReadingUpdate,
    ) -> Result<Reading> {
        let owner = session.owner_id();
        let mut reading = self.load_reading(owner, reading_id).await?;

        let mut patch = ReadingPatch {
            systolic: update.systolic,
            diastolic: update.diastolic,
            diagnosis: None,
            notes: update.notes,
        };
        if patch.is_empty() {
            return Ok(reading);
        }
        if patch.touches_measurement() {
            let systolic = patch.systolic.unwrap_or(reading.systolic);
            let diastolic = patch.diastolic.unwrap_or(reading.diastolic);
            patch.diagnosis = Some(classify(systolic, diastolic));
        }

        self.store
            .update_reading(owner, reading_id, patch.clone())
            .await
            .map_err(|e| not_found_or(e, "reading", reading_id, AdvisorError::persistence("reading")))?;
        reading.apply(&patch);
        info!("Updated reading {} ({})", reading_id, reading.diagnosis);
        Ok(reading)
    }

    /// Delete a reading along with its recommendations and cached advice.
    ///
    /// Recommendations go first. If they cannot be removed the reading is
    /// kept, so no advice outlives its reading.
    pub async fn delete_reading(&self, session: &Session, reading_id: ReadingId) -> Result<()> {
        let owner = session.owner_id();
        self.load_reading(owner, reading_id).await?;

        let removed = self
            .store
            .delete_recommendations(owner, reading_id)
            .await
            .map_err(AdvisorError::persistence("recommendations"))?;
        debug!("Removed {} recommendation(s) for reading {}", removed, reading_id);
        self.cache.write().await.remove(&reading_id);

        self.store
            .delete_reading(owner, reading_id)
            .await
            .map_err(|e| not_found_or(e, "reading", reading_id, AdvisorError::persistence("reading")))?;

        info!("Deleted reading {}", reading_id);
        Ok(())
    }

    pub async fn reading_stats(&self, session: &Session) -> Result<ReadingStats> {
        let readings = self.list_readings(session).await?;
        Ok(ReadingStats::from_readings(&readings))
    }

    /// Number of readings with advice held in the process cache.
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Whether advice for this reading is held in the cache for the session owner.
    pub async fn has_cached(&self, session: &Session, reading_id: ReadingId) -> bool {
        self.cached(session.owner_id(), reading_id).await.is_some()
    }

    async fn cached(&self, owner: OwnerId, reading_id: ReadingId) -> Option<LifestyleAdvice> {
        let cache = self.cache.read().await;
        cache
            .get(&reading_id)
            .filter(|entry| entry.owner_id == owner)
            .map(|entry| entry.advice.clone())
    }

    async fn remember(&self, owner_id: OwnerId, reading_id: ReadingId, advice: LifestyleAdvice) {
        self.cache
            .write()
            .await
            .insert(reading_id, CachedAdvice { owner_id, advice });
    }

    async fn load_reading(&self, owner: OwnerId, reading_id: ReadingId) -> Result<Reading> {
        self.store
            .select_reading(owner, reading_id)
            .await
            .map_err(AdvisorError::store("reading"))?
            .ok_or(AdvisorError::NotFound {
                entity: "reading",
                id: reading_id,
            })
    }

    /// Prompt, generate, parse, then store and cache.
    ///
    /// A failed store write after a good generation is logged and the advice
    /// is still returned, uncached, so a later call tries again.
    async fn generate_and_persist(&self, session: &Session, reading: &Reading) -> Result<LifestyleAdvice> {
        let start_time = Instant::now();
        let patient = PatientSummary::from_profile(session.profile.as_ref());
        let prompt = prompt::prompt_for_reading(reading, &patient);

        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| AdvisorError::generation_failed(e.to_string(), None))?;

        let advice = extract::parse_advice(&raw).map_err(|e| {
            error!("Unusable advice for reading {}: {}", reading.id, e);
            AdvisorError::generation_failed(e.to_string(), Some(&raw))
        })?;
        info!(
            "Generated {} advice items for reading {} in {:.2?}",
            advice.item_count(),
            reading.id,
            start_time.elapsed()
        );

        let owner = session.owner_id();
        let saved = self
            .store
            .insert_recommendation(NewRecommendation {
                owner_id: owner,
                reading_id: reading.id,
                content: advice.clone(),
            })
            .await;
        match saved {
            Ok(recommendation) => {
                debug!("Stored recommendation {}", recommendation.id);
                self.remember(owner, reading.id, advice.clone()).await;
            }
            Err(e) => {
                let err = AdvisorError::persistence("recommendation")(e);
                error!("Returning unsaved advice for reading {}: {}", reading.id, err);
            }
        }

        Ok(advice)
    }
}

fn not_found_or(
    err: records::StoreError,
    entity: &'static str,
    id: ReadingId,
    otherwise: impl FnOnce(records::StoreError) -> AdvisorError,
) -> AdvisorError {
    match err {
        records::StoreError::NotFound { .. } => AdvisorError::NotFound { entity, id },
        other => otherwise(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use auth::AuthUser;
    use genai_client::GenAiError;
    use records::InMemoryRecordStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct FixedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, GenAiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn session() -> Session {
        Session::new(
            AuthUser {
                id: Uuid::new_v4(),
                email: "pat@example.com".to_string(),
                created_at: chrono::Utc::now(),
            },
            None,
        )
    }

    fn setup(reply: &str) -> (RecommendationOrchestrator, Arc<FixedGenerator>) {
        let generator = Arc::new(FixedGenerator {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        });
        let orchestrator = RecommendationOrchestrator::new(Arc::new(InMemoryRecordStore::new()), generator.clone());
        (orchestrator, generator)
    }

    #[tokio::test]
    async fn test_cache_is_scoped_to_owner() {
        let (orchestrator, _) = setup(r#"{"diet": {"recommendations": ["Less salt"]}}"#);
        let alice = session();
        let bob = session();

        let reading = orchestrator.add_reading(&alice, 135, 85, None).await.unwrap();
        assert_eq!(orchestrator.cached_len().await, 1);

        let err = orchestrator.get_recommendations(&bob, reading.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_has_cached_tracks_each_reading() {
        let (orchestrator, generator) = setup(r#"{"diet": {"recommendations": ["Less salt"]}}"#);
        let s = session();
        let first = orchestrator.add_reading(&s, 118, 70, None).await.unwrap();
        assert!(orchestrator.has_cached(&s, first.id).await);

        // Second reading's generation comes back empty and is not cached,
        // even though the cache as a whole is not
        let empty = Arc::new(FixedGenerator {
            reply: "{}".to_string(),
            calls: AtomicUsize::new(0),
        });
        let other = RecommendationOrchestrator {
            generator: empty,
            ..orchestrator.clone()
        };
        let second = other.add_reading(&s, 150, 95, None).await.unwrap();
        assert!(!orchestrator.has_cached(&s, second.id).await);
        assert_eq!(orchestrator.cached_len().await, 1);
        assert!(!orchestrator.has_cached(&session(), first.id).await);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_without_changes_is_a_no_op() {
        let (orchestrator, _) = setup("{}");
        let s = session();
        let reading = orchestrator.add_reading(&s, 118, 70, Some("  ".to_string())).await.unwrap();
        assert_eq!(reading.notes, None);

        let same = orchestrator
            .update_reading(&s, reading.id, ReadingUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, reading);
    }

    #[tokio::test]
    async fn test_notes_only_edit_keeps_diagnosis() {
        let (orchestrator, _) = setup("{}");
        let s = session();
        let reading = orchestrator.add_reading(&s, 150, 95, None).await.unwrap();

        let edited = orchestrator
            .update_reading(
                &s,
                reading.id,
                ReadingUpdate {
                    notes: Some("after coffee".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.diagnosis, reading.diagnosis);
        assert_eq!(edited.notes.as_deref(), Some("after coffee"));
    }

    #[tokio::test]
    async fn test_empty_advice_is_not_cached() {
        let (orchestrator, generator) = setup("{}");
        let s = session();
        let reading = orchestrator.add_reading(&s, 120, 70, None).await.unwrap();
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.cached_len().await, 0);

        let err = orchestrator.get_recommendations(&s, reading.id).await.unwrap_err();
        match err {
            AdvisorError::GenerationFailed { raw_response, .. } => {
                assert_eq!(raw_response.as_deref(), Some("{}"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
