use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{RecordStore, StoreError, UserStore};
use crate::models::{HealthRecord, NewUser, User};
use crate::sanitize::{FieldValue, RecordChanges};

const RECORD_COLUMNS: &str = "id, user_id, date, lh, estrogen, pdg, overall_score, \
     deep_sleep_minutes, avg_resting_heart_rate, stress_score, daily_steps, cramps, fatigue, \
     moodswing, stress, bloating, sleepissue, daily_note, sentiment_score, last_period_date, \
     created_at, updated_at";

const USER_COLUMNS: &str = "id, username, email, mobile, password_hash, created_at";

#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Float(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Integer(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Date(d) => {
            qb.push_bind(*d);
        }
        FieldValue::Text(s) => {
            qb.push_bind(s.clone());
        }
        FieldValue::Null => {
            qb.push("NULL");
        }
    }
}

fn log_db_error(e: &sqlx::Error) {
    if let Some(db_err) = e.as_database_error() {
        tracing::error!("❌ DB write failed: {}", db_err.message());

        if let Some(code) = db_err.code() {
            tracing::info!("ℹ️ SQLSTATE code: {}", code);
        }

        if let Some(constraint) = db_err.constraint() {
            tracing::info!("🔒 Constraint violated: {}", constraint);
        }
    } else {
        tracing::error!("❌ Unknown DB error: {}", e);
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        changes: &RecordChanges,
    ) -> Result<HealthRecord, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO health_records (id, user_id, date");
        for (column, _) in changes.iter() {
            qb.push(", ").push(column);
        }
        qb.push(") VALUES (")
            .push_bind(Uuid::new_v4())
            .push(", ")
            .push_bind(user_id)
            .push(", ")
            .push_bind(date);
        for (_, value) in changes.iter() {
            qb.push(", ");
            push_value(&mut qb, value);
        }
        qb.push(") ON CONFLICT (user_id, date) DO UPDATE SET updated_at = now()");
        for (column, _) in changes.iter() {
            qb.push(", ").push(column).push(" = EXCLUDED.").push(column);
        }
        qb.push(" RETURNING ").push(RECORD_COLUMNS);

        qb.build_query_as::<HealthRecord>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                log_db_error(&e);
                StoreError::Database(e)
            })
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        new_date: Option<NaiveDate>,
        changes: &RecordChanges,
    ) -> Result<HealthRecord, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE health_records SET updated_at = now()");
        if let Some(date) = new_date {
            qb.push(", date = ").push_bind(date);
        }
        for (column, value) in changes.iter() {
            qb.push(", ").push(column).push(" = ");
            push_value(&mut qb, value);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(RECORD_COLUMNS);

        let updated = qb
            .build_query_as::<HealthRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                log_db_error(&e);
                match new_date {
                    Some(date) if is_unique_violation(&e) => StoreError::Conflict(date),
                    _ => StoreError::Database(e),
                }
            })?;

        updated.ok_or(StoreError::NotFound)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<HealthRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM health_records WHERE user_id = $1 ORDER BY date ASC"
        );
        let rows = sqlx::query_as::<_, HealthRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("❌ DB error: {:?}", e);
                StoreError::Database(e)
            })?;
        Ok(rows)
    }

    async fn between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<HealthRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM health_records \
             WHERE user_id = $1 AND date >= $2 AND date <= $3 ORDER BY date ASC"
        );
        let rows = sqlx::query_as::<_, HealthRecord>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("❌ DB error: {:?}", e);
                StoreError::Database(e)
            })?;
        Ok(rows)
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("❌ DB error: {:?}", e);
                StoreError::Database(e)
            })
    }
}

/// Names the account field behind a unique violation on `users`.
fn taken_field(e: &sqlx::Error) -> Option<&'static str> {
    let constraint = e.as_database_error()?.constraint()?;
    match constraint {
        "users_username_key" => Some("username"),
        "users_email_key" => Some("email"),
        "users_mobile_key" => Some("mobile"),
        _ => None,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, mobile, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.mobile)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match taken_field(&e) {
                Some(field) if is_unique_violation(&e) => StoreError::Taken(field),
                _ => {
                    log_db_error(&e);
                    StoreError::Database(e)
                }
            })
    }

    async fn by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("❌ DB error: {:?}", e);
                StoreError::Database(e)
            })
    }

    async fn by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find("username", username).await
    }

    async fn by_mobile(&self, mobile: &str) -> Result<Option<User>, StoreError> {
        self.find("mobile", mobile).await
    }
}
