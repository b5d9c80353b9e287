//! Bundled reference rows shown to users who have not logged anything yet.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::RecordView;

const BUNDLED: &str = include_str!("../data/reference_dataset.json");

pub const DEFAULT_SAMPLE_SIZE: usize = 15;

#[derive(Debug, Clone, Deserialize)]
struct ReferenceRow {
    date: NaiveDate,
    lh: Option<f64>,
    estrogen: Option<f64>,
    pdg: Option<f64>,
    cramps: Option<i32>,
    fatigue: Option<i32>,
    moodswing: Option<i32>,
    stress: Option<i32>,
    bloating: Option<i32>,
    sleepissue: Option<i32>,
    overall_score: Option<f64>,
    #[serde(alias = "deep_sleep_in_minutes")]
    deep_sleep_minutes: Option<f64>,
    avg_resting_heart_rate: Option<f64>,
    stress_score: Option<f64>,
    daily_steps: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    rows: Vec<ReferenceRow>,
}

impl ReferenceDataset {
    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            rows: serde_json::from_str(raw)?,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `limit` rows as example entries. Missing values render as zero.
    pub fn sample(&self, limit: usize) -> Vec<RecordView> {
        self.rows
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, row)| RecordView {
                id: format!("sample-{i}"),
                date: row.date,
                lh: Some(row.lh.unwrap_or(0.0)),
                estrogen: Some(row.estrogen.unwrap_or(0.0)),
                pdg: Some(row.pdg.unwrap_or(0.0)),
                cramps: Some(row.cramps.unwrap_or(0)),
                fatigue: Some(row.fatigue.unwrap_or(0)),
                moodswing: Some(row.moodswing.unwrap_or(0)),
                stress: Some(row.stress.unwrap_or(0)),
                bloating: Some(row.bloating.unwrap_or(0)),
                sleepissue: Some(row.sleepissue.unwrap_or(0)),
                overall_score: Some(row.overall_score.unwrap_or(0.0)),
                deep_sleep_minutes: Some(row.deep_sleep_minutes.unwrap_or(0.0)),
                avg_resting_heart_rate: Some(row.avg_resting_heart_rate.unwrap_or(0.0)),
                stress_score: Some(row.stress_score.unwrap_or(0.0)),
                daily_steps: Some(row.daily_steps.unwrap_or(0.0)),
                daily_note: None,
                sentiment_score: None,
                last_period_date: None,
                is_estimated: false,
                is_example: true,
            })
            .collect()
    }
}
