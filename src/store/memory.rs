use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RecordStore, StoreError, UserStore};
use crate::models::{HealthRecord, NewUser, User};
use crate::sanitize::RecordChanges;

/// In-process store with the same semantics as the Postgres one.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<HealthRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HealthRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        changes: &RecordChanges,
    ) -> Result<HealthRecord, StoreError> {
        let mut records = self.records.lock().await;
        let existing = records.iter_mut().find(|r| r.user_id == user_id && r.date == date);
        if let Some(existing) = existing {
            existing.apply(changes);
            return Ok(existing.clone());
        }
        let mut record = HealthRecord::new(user_id, date);
        record.apply(changes);
        records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        new_date: Option<NaiveDate>,
        changes: &RecordChanges,
    ) -> Result<HealthRecord, StoreError> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.id == id && r.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(date) = new_date {
            if records.iter().any(|r| r.user_id == user_id && r.date == date && r.id != id) {
                return Err(StoreError::Conflict(date));
            }
        }

        let record = &mut records[index];
        if let Some(date) = new_date {
            record.date = date;
        }
        record.apply(changes);
        Ok(record.clone())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<HealthRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut out: Vec<_> = records.iter().filter(|r| r.user_id == user_id).cloned().collect();
        out.sort_by_key(|r| r.date);
        Ok(out)
    }

    async fn between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<HealthRecord>, StoreError> {
        let mut out = self.list(user_id).await?;
        out.retain(|r| (from..=until).contains(&r.date));
        Ok(out)
    }
}

/// In-process account store enforcing the same uniqueness rules as the
/// `users` table.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Taken("username"));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Taken("email"));
        }
        if user.mobile.is_some() && users.iter().any(|u| u.mobile == user.mobile) {
            return Err(StoreError::Taken("mobile"));
        }

        let created = User::from_new(user);
        users.push(created.clone());
        Ok(created)
    }

    async fn by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.iter().find(|u| u.username == username).cloned())
    }

    async fn by_mobile(&self, mobile: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.mobile.as_deref() == Some(mobile)).cloned())
    }
}
