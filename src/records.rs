//! Record workflows shared by the HTTP handlers.

use chrono::NaiveDate;
use rand::Rng;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{HealthRecord, RecordView};
use crate::reference::ReferenceDataset;
use crate::sanitize::{
    date_field, sanitize, BlankPolicy, FieldValue, RecordChanges, ValidationError,
};
use crate::sentiment;
use crate::store::RecordStore;
use crate::trend::extrapolate;

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object()
        .ok_or_else(|| ValidationError::new("body", "expected a JSON object"))
}

/// Derives `sentiment_score` from a note written in the same request.
fn annotate_note(changes: &mut RecordChanges) {
    let score = match changes.get("daily_note") {
        Some(FieldValue::Text(note)) => FieldValue::Float(sentiment::polarity(note)),
        Some(FieldValue::Null) => FieldValue::Null,
        _ => return,
    };
    changes.insert("sentiment_score", score);
}

/// Creates the record for the body's `date` (default `today`) or merges into it.
pub async fn save_record(
    store: &dyn RecordStore,
    user_id: Uuid,
    body: &Value,
    today: NaiveDate,
) -> Result<HealthRecord, ApiError> {
    let input = as_object(body)?;
    let date = date_field(input, "date")?.unwrap_or(today);
    let mut changes = sanitize(input, BlankPolicy::Skip)?;
    annotate_note(&mut changes);

    let record = store.upsert(user_id, date, &changes).await?;
    tracing::info!(
        %user_id,
        %date,
        record_id = %record.id,
        fields = changes.len(),
        "health record saved"
    );
    Ok(record)
}

/// Updates a record by id. Blank values clear fields; a new `date` must be free.
pub async fn update_record(
    store: &dyn RecordStore,
    user_id: Uuid,
    id: Uuid,
    body: &Value,
) -> Result<HealthRecord, ApiError> {
    let input = as_object(body)?;
    let new_date = date_field(input, "date")?;
    let mut changes = sanitize(input, BlankPolicy::Clear)?;
    annotate_note(&mut changes);

    let record = store.update(user_id, id, new_date, &changes).await?;
    tracing::info!(%user_id, record_id = %id, "health record updated");
    Ok(record)
}

/// Stored records followed by estimates up to `today`; examples when there is nothing stored.
pub async fn list_records<R: Rng>(
    store: &dyn RecordStore,
    reference: &ReferenceDataset,
    user_id: Uuid,
    today: NaiveDate,
    rng: R,
    sample_size: usize,
) -> Result<Vec<RecordView>, ApiError> {
    let records = store.list(user_id).await?;
    let Some(last) = records.last() else {
        return Ok(reference.sample(sample_size));
    };

    let mut rows: Vec<RecordView> = records.iter().map(RecordView::from).collect();
    rows.extend(extrapolate(last, today, rng));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn note_gets_sentiment() {
        let store = MemoryRecordStore::new();
        let user = Uuid::new_v4();
        let saved = save_record(&store, user, &json!({"daily_note": "feeling great"}), date(1))
            .await
            .unwrap();
        assert_eq!(saved.date, date(1));
        assert_eq!(saved.daily_note.as_deref(), Some("feeling great"));
        assert!(saved.sentiment_score.unwrap() > 0.0);

        let cleared = update_record(&store, user, saved.id, &json!({"daily_note": null}))
            .await
            .unwrap();
        assert_eq!(cleared.daily_note, None);
        assert_eq!(cleared.sentiment_score, None);
    }

    #[tokio::test]
    async fn sentiment_is_not_client_writable() {
        let store = MemoryRecordStore::new();
        let saved = save_record(&store, Uuid::new_v4(), &json!({"sentiment_score": 0.9}), date(1))
            .await
            .unwrap();
        assert_eq!(saved.sentiment_score, None);
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let store = MemoryRecordStore::new();
        let err = save_record(&store, Uuid::new_v4(), &json!([1, 2]), date(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref v) if v.field == "body"));
    }

    #[tokio::test]
    async fn listing_appends_estimates() {
        let store = MemoryRecordStore::new();
        let user = Uuid::new_v4();
        save_record(&store, user, &json!({"date": "2024-03-01", "daily_steps": 6000}), date(1))
            .await
            .unwrap();
        let reference = ReferenceDataset::bundled().unwrap();

        let rows = list_records(&store, &reference, user, date(4), StdRng::seed_from_u64(1), 15)
            .await
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert!(!rows[0].is_estimated);
        assert!(rows[1..].iter().all(|r| r.is_estimated));
        assert_eq!(rows.last().unwrap().date, date(4));
    }

    #[tokio::test]
    async fn empty_user_gets_examples_only() {
        let store = MemoryRecordStore::new();
        let reference = ReferenceDataset::bundled().unwrap();
        let rng = StdRng::seed_from_u64(1);
        let rows = list_records(&store, &reference, Uuid::new_v4(), date(4), rng, 15)
            .await
            .unwrap();
        assert!(!rows.is_empty() && rows.len() <= 15);
        assert!(rows.iter().all(|r| r.is_example && !r.is_estimated));
    }
}
