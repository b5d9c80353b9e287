use serde::{ Serialize, Deserialize };
use uuid::Uuid;
use chrono::{NaiveDate, DateTime, Utc};

use crate::sanitize::{FieldValue, RecordChanges};

/// One user's daily health snapshot, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HealthRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub lh: Option<f64>,
    pub estrogen: Option<f64>,
    pub pdg: Option<f64>,
    pub overall_score: Option<f64>,
    pub deep_sleep_minutes: Option<f64>,
    pub avg_resting_heart_rate: Option<f64>,
    pub stress_score: Option<f64>,
    pub daily_steps: Option<f64>,
    pub cramps: Option<i32>,
    pub fatigue: Option<i32>,
    pub moodswing: Option<i32>,
    pub stress: Option<i32>,
    pub bloating: Option<i32>,
    pub sleepissue: Option<i32>,
    pub daily_note: Option<String>,
    pub sentiment_score: Option<f64>,
    pub last_period_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthRecord {
    pub fn new(user_id: Uuid, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            lh: None,
            estrogen: None,
            pdg: None,
            overall_score: None,
            deep_sleep_minutes: None,
            avg_resting_heart_rate: None,
            stress_score: None,
            daily_steps: None,
            cramps: None,
            fatigue: None,
            moodswing: None,
            stress: None,
            bloating: None,
            sleepissue: None,
            daily_note: None,
            sentiment_score: None,
            last_period_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Writes every field present in `changes` onto the record.
    pub fn apply(&mut self, changes: &RecordChanges) {
        for (name, value) in changes.iter() {
            match name {
                "lh" => self.lh = value.as_float(),
                "estrogen" => self.estrogen = value.as_float(),
                "pdg" => self.pdg = value.as_float(),
                "overall_score" => self.overall_score = value.as_float(),
                "deep_sleep_minutes" => self.deep_sleep_minutes = value.as_float(),
                "avg_resting_heart_rate" => self.avg_resting_heart_rate = value.as_float(),
                "stress_score" => self.stress_score = value.as_float(),
                "daily_steps" => self.daily_steps = value.as_float(),
                "cramps" => self.cramps = value.as_integer(),
                "fatigue" => self.fatigue = value.as_integer(),
                "moodswing" => self.moodswing = value.as_integer(),
                "stress" => self.stress = value.as_integer(),
                "bloating" => self.bloating = value.as_integer(),
                "sleepissue" => self.sleepissue = value.as_integer(),
                "daily_note" => self.daily_note = value.as_text(),
                "sentiment_score" => self.sentiment_score = value.as_float(),
                "last_period_date" => self.last_period_date = value.as_date(),
                other => tracing::debug!(field = other, "ignoring unknown record column"),
            }
        }
        self.updated_at = Utc::now();
    }

    /// Ordinal symptom ratings paired with their names, in display order.
    pub fn symptoms(&self) -> [(&'static str, Option<i32>); 6] {
        [
            ("cramps", self.cramps),
            ("fatigue", self.fatigue),
            ("moodswing", self.moodswing),
            ("stress", self.stress),
            ("bloating", self.bloating),
            ("sleepissue", self.sleepissue),
        ]
    }
}

impl FieldValue {
    fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i32> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// A row of the records listing. Stored, estimated and example rows all
/// share this shape; the two flags tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: String,
    pub date: NaiveDate,
    pub lh: Option<f64>,
    pub estrogen: Option<f64>,
    pub pdg: Option<f64>,
    pub cramps: Option<i32>,
    pub fatigue: Option<i32>,
    pub moodswing: Option<i32>,
    pub stress: Option<i32>,
    pub bloating: Option<i32>,
    pub sleepissue: Option<i32>,
    pub overall_score: Option<f64>,
    pub deep_sleep_minutes: Option<f64>,
    pub avg_resting_heart_rate: Option<f64>,
    pub stress_score: Option<f64>,
    pub daily_steps: Option<f64>,
    pub daily_note: Option<String>,
    pub sentiment_score: Option<f64>,
    pub last_period_date: Option<NaiveDate>,
    pub is_estimated: bool,
    pub is_example: bool,
}

impl From<&HealthRecord> for RecordView {
    fn from(r: &HealthRecord) -> Self {
        Self {
            id: r.id.to_string(),
            date: r.date,
            lh: r.lh,
            estrogen: r.estrogen,
            pdg: r.pdg,
            cramps: r.cramps,
            fatigue: r.fatigue,
            moodswing: r.moodswing,
            stress: r.stress,
            bloating: r.bloating,
            sleepissue: r.sleepissue,
            overall_score: r.overall_score,
            deep_sleep_minutes: r.deep_sleep_minutes,
            avg_resting_heart_rate: r.avg_resting_heart_rate,
            stress_score: r.stress_score,
            daily_steps: r.daily_steps,
            daily_note: r.daily_note.clone(),
            sentiment_score: r.sentiment_score,
            last_period_date: r.last_period_date,
            is_estimated: false,
            is_example: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SavedRecord {
    pub msg: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub msg: &'static str,
}

#[derive(Debug, Default, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub context: serde_json::Value,
    pub model: Option<String>,
}

impl ChatRequest {
    /// Reads a chat body of any shape; missing or mistyped parts fall back to empty.
    pub fn from_value(body: &serde_json::Value) -> Self {
        let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            message: text("message").unwrap_or_default(),
            context: body.get("context").cloned().unwrap_or_default(),
            model: text("model"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// An account as stored. Never serialized: it carries the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_new(user: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            mobile: user.mobile,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub mobile: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            mobile: u.mobile.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
}

/// Credentials by mobile number, or by username when no mobile is given.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub mobile: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MobileLookup {
    pub mobile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MobileCheck {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountReply {
    pub msg: &'static str,
    pub user: UserProfile,
}
