//! Integration tests for the record store.
//!
//! These walk a reading through its lifecycle and persist the store to disk
//! between steps, the way the command-line front end uses it.

use records::{
    InMemoryRecordStore, LifestyleAdvice, NewReading, NewRecommendation, Profile, ReadingPatch,
    ReadingStats, RecordStore, Snapshot,
};
use uuid::Uuid;

#[tokio::test]
async fn test_lifecycle_survives_snapshot_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let owner = Uuid::new_v4();

    // First session: profile, reading and recommendation
    let store = InMemoryRecordStore::from_snapshot(Snapshot::load(&path).unwrap());
    store
        .insert_profile(Profile::new(owner).with_email("lee@example.com"))
        .await
        .unwrap();
    let reading = store
        .insert_reading(NewReading {
            owner_id: owner,
            systolic: 138,
            diastolic: 86,
            diagnosis: diagnosis::classify(138, 86),
            notes: Some("evening".to_string()),
        })
        .await
        .unwrap();
    let mut content = LifestyleAdvice::default();
    content.diet.foods_to_avoid.push("processed meats".to_string());
    store
        .insert_recommendation(NewRecommendation {
            owner_id: owner,
            reading_id: reading.id,
            content: content.clone(),
        })
        .await
        .unwrap();
    store.snapshot().await.save(&path).unwrap();

    // Second session: everything is still there
    let store = InMemoryRecordStore::from_snapshot(Snapshot::load(&path).unwrap());
    assert_eq!(store.counts().await, (1, 1, 1));
    let stored = store
        .select_recommendation(owner, reading.id)
        .await
        .unwrap()
        .expect("recommendation should survive reload");
    assert_eq!(stored.content, content);

    // Edit, then delete with cascade
    store
        .update_reading(
            owner,
            reading.id,
            ReadingPatch {
                notes: Some("evening, after walk".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store.delete_reading(owner, reading.id).await.unwrap();
    store.delete_recommendations(owner, reading.id).await.unwrap();
    store.snapshot().await.save(&path).unwrap();

    let store = InMemoryRecordStore::from_snapshot(Snapshot::load(&path).unwrap());
    assert_eq!(store.counts().await, (1, 0, 0));
    let stats = ReadingStats::from_readings(&store.select_readings(owner).await.unwrap());
    assert_eq!(stats.count, 0);
}
