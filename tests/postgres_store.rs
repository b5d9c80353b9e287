//! Store behavior against a real Postgres.
//!
//! Needs `DATABASE_URL` pointing at a server where the test user may create
//! databases. Run with `cargo test --test postgres_store -- --ignored`.

use chrono::NaiveDate;
use neohealth_backend::models::NewUser;
use neohealth_backend::sanitize::{FieldValue, RecordChanges};
use neohealth_backend::store::{PgRecordStore, PgUserStore, RecordStore, StoreError, UserStore};
use sqlx::PgPool;
use uuid::Uuid;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn changes(fields: &[(&'static str, FieldValue)]) -> RecordChanges {
    let mut c = RecordChanges::default();
    for (name, value) in fields {
        c.insert(*name, value.clone());
    }
    c
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn upsert_merges_same_day(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let user = Uuid::new_v4();

    let first = changes(&[("moodswing", FieldValue::Integer(1)), ("lh", FieldValue::Float(4.5))]);
    let created = store.upsert(user, date(1), &first).await.unwrap();
    let second = changes(&[("moodswing", FieldValue::Integer(3))]);
    let merged = store.upsert(user, date(1), &second).await.unwrap();

    assert_eq!(created.id, merged.id);
    assert_eq!(merged.moodswing, Some(3));
    assert_eq!(merged.lh, Some(4.5));
    assert_eq!(store.list(user).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn update_clears_moves_and_detects_collisions(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let user = Uuid::new_v4();
    store.upsert(user, date(1), &RecordChanges::default()).await.unwrap();
    let second = changes(&[("pdg", FieldValue::Float(2.0))]);
    let record = store.upsert(user, date(2), &second).await.unwrap();

    let err = store
        .update(user, record.id, Some(date(1)), &RecordChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(d) if d == date(1)));

    let cleared = changes(&[("pdg", FieldValue::Null)]);
    let moved = store.update(user, record.id, Some(date(5)), &cleared).await.unwrap();
    assert_eq!(moved.date, date(5));
    assert_eq!(moved.pdg, None);

    let err = store
        .update(Uuid::new_v4(), record.id, Some(date(1)), &RecordChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn between_bounds_both_ends(pool: PgPool) {
    let store = PgRecordStore::new(pool);
    let user = Uuid::new_v4();
    for d in [1, 3, 5, 9] {
        store.upsert(user, date(d), &RecordChanges::default()).await.unwrap();
    }

    let rows = store.between(user, date(3), date(5)).await.unwrap();
    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(3), date(5)]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn duplicate_account_fields_are_named(pool: PgPool) {
    let users = PgUserStore::new(pool);
    let account = |username: &str, email: &str, mobile: Option<&str>| NewUser {
        username: username.into(),
        email: email.into(),
        mobile: mobile.map(String::from),
        password_hash: "$argon2id$placeholder".into(),
    };

    let asha = users
        .create(account("asha", "asha@example.com", Some("9876500000")))
        .await
        .unwrap();
    let err = users
        .create(account("asha", "x@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Taken("username")));
    let err = users
        .create(account("meera", "meera@example.com", Some("9876500000")))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Taken("mobile")));

    users.create(account("riya", "riya@example.com", None)).await.unwrap();
    users.create(account("neha", "neha@example.com", None)).await.unwrap();

    let found = users.by_mobile("9876500000").await.unwrap().unwrap();
    assert_eq!(found.id, asha.id);
    assert_eq!(users.by_id(asha.id).await.unwrap().unwrap().username, "asha");
}
