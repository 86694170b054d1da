//! PostgreSQL store tests
//!
//! These run only when `DATABASE_URL` points at a disposable database.

use auth_identity::Role;
use database_layer::{
    BloodGroup, Clock, DatabaseError, DatabasePool, HealthStore, ManualClock, NewUser, NewVitalSample, PoolSettings,
    PostgresStore, SystemClock,
};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

async fn store() -> Option<PostgresStore> {
    store_with_clock(Arc::new(SystemClock)).await
}

async fn store_with_clock(clock: Arc<dyn Clock>) -> Option<PostgresStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = DatabasePool::connect(&url, &PoolSettings::default()).await.ok()?;
    let store = PostgresStore::new(pool, clock);
    store.migrate().await.ok()?;
    Some(store)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        phone: "9876543210".to_string(),
        password_hash: "$2b$04$hash".to_string(),
        name: None,
        blood_group: BloodGroup::Others,
        custom_blood_group: Some("Bombay".to_string()),
        gender: "male".to_string(),
        role: Role::Patient,
    }
}

#[tokio::test]
async fn unique_constraint_rejects_duplicate_email() {
    let Some(store) = store().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let email = format!("{}@example.com", Uuid::new_v4());
    let created = store.create_user(new_user(&email)).await.unwrap();
    assert_eq!(created.custom_blood_group.as_deref(), Some("Bombay"));

    let err = store.create_user(new_user(&email)).await.unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateEmail(_)));
}

#[tokio::test]
async fn samples_round_trip_newest_first() {
    let Some(store) = store().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let user = store
        .create_user(new_user(&format!("{}@example.com", Uuid::new_v4())))
        .await
        .unwrap();

    for hr in [61, 62, 63] {
        store
            .create_vital_sample(NewVitalSample {
                user_id: user.id,
                heart_rate: hr,
                spo2: 98,
                systolic: 118,
                diastolic: 77,
                temperature: 36.8,
                ecg_waveform: Some("[0.1,0.2]".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let listed = store.list_vital_samples_by_user(user.id, None).await.unwrap();
    assert_eq!(listed.iter().map(|s| s.heart_rate).collect::<Vec<_>>(), vec![63, 62, 61]);
    assert_eq!(listed[0].ecg_waveform.as_deref(), Some("[0.1,0.2]"));

    let orphan = store
        .create_vital_sample(NewVitalSample {
            user_id: Uuid::new_v4(),
            ..Default::default()
        })
        .await;
    assert!(matches!(orphan, Err(DatabaseError::MissingReference(_))));

    assert!(store.ping().await.is_ok());
}

#[tokio::test]
async fn latest_sample_across_users_breaks_ties_by_insert_order() {
    // Far-future clock so rows left by other tests never compete
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2249, 1, 1, 0, 0, 0).unwrap()));
    let Some(store) = store_with_clock(clock).await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let a = store
        .create_user(new_user(&format!("{}@example.com", Uuid::new_v4())))
        .await
        .unwrap();
    let b = store
        .create_user(new_user(&format!("{}@example.com", Uuid::new_v4())))
        .await
        .unwrap();

    let mut inserted = Vec::new();
    for user in [a.id, b.id] {
        let sample = store
            .create_vital_sample(NewVitalSample {
                user_id: user,
                heart_rate: 72,
                spo2: 98,
                systolic: 120,
                diastolic: 80,
                temperature: 36.6,
                ..Default::default()
            })
            .await
            .unwrap();
        inserted.push(sample.id);
    }

    let latest = store.get_latest_vital_sample_any().await.unwrap().unwrap();
    assert_eq!(latest.id, inserted[1]);
    assert_eq!(latest.user_id, b.id);
}
