use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Message, RecordView, SavedRecord, UserQuery};
use crate::records;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health/record", post(add_record))
        .route("/api/health/record/:id", put(update_record_by_id))
        .route("/api/health/records", get(get_records))
        .with_state(state)
}

async fn add_record(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedRecord>), ApiError> {
    let Query(user) = query?;
    let Json(body) = payload?;
    let today = Utc::now().date_naive();
    let record = records::save_record(state.store.as_ref(), user.user_id, &body, today).await?;

    Ok((
        StatusCode::CREATED,
        Json(SavedRecord {
            msg: "Record saved",
            id: record.id,
        }),
    ))
}

async fn update_record_by_id(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UserQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Path(id) = path?;
    let Query(user) = query?;
    let Json(body) = payload?;
    records::update_record(state.store.as_ref(), user.user_id, id, &body).await?;

    Ok(Json(Message {
        msg: "Record updated successfully",
    }))
}

async fn get_records(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    let Query(user) = query?;
    let today = Utc::now().date_naive();
    let rows = records::list_records(
        state.store.as_ref(),
        &state.reference,
        user.user_id,
        today,
        StdRng::from_entropy(),
        state.sample_size,
    )
    .await?;

    Ok(Json(rows))
}
