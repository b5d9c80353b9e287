use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use crate::models::{ChatReply, ChatRequest, UserQuery};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/message", post(chat_message))
        .with_state(state)
}

/// Always 200: upstream failures come back as assistant text the client can render.
/// A body or user id that does not parse is read as empty rather than rejected.
async fn chat_message(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<ChatReply> {
    let user_id = query.ok().map(|Query(user)| user.user_id);
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "unreadable chat body");
            Value::Null
        }
    };

    let request = ChatRequest::from_value(&body);
    let today = Utc::now().date_naive();
    let response = state.assistant.reply(user_id, &request, today).await;
    Json(ChatReply { response })
}
