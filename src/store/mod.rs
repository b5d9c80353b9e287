//! Persistence of accounts and of health records, one per (user, date).

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{HealthRecord, NewUser, User};
use crate::sanitize::RecordChanges;

mod memory;
mod postgres;

pub use memory::{MemoryRecordStore, MemoryUserStore};
pub use postgres::{PgRecordStore, PgUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a record for {0} already exists")]
    Conflict(NaiveDate),

    /// An account already uses this value of the named field.
    #[error("{0} already exists")]
    Taken(&'static str),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates the record for `(user_id, date)` or merges `changes` into the
    /// existing one. Fields absent from `changes` keep their stored value.
    async fn upsert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        changes: &RecordChanges,
    ) -> Result<HealthRecord, StoreError>;

    /// Updates a record owned by `user_id`, optionally moving it to `new_date`.
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        new_date: Option<NaiveDate>,
        changes: &RecordChanges,
    ) -> Result<HealthRecord, StoreError>;

    /// All records of a user, oldest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<HealthRecord>, StoreError>;

    /// Records dated within `from..=until`, oldest first.
    async fn between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<HealthRecord>, StoreError>;
}

/// Accounts. Username, email and mobile are each unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Taken`] naming the first duplicated field.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn by_mobile(&self, mobile: &str) -> Result<Option<User>, StoreError>;
}
