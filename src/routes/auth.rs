use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::accounts;
use crate::error::ApiError;
use crate::models::{
    AccountReply, LoginRequest, MobileCheck, MobileLookup, RegisterRequest, UserProfile, UserQuery,
};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/check-mobile", post(check_mobile))
        .with_state(state)
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountReply>), ApiError> {
    let Json(form) = payload?;
    let user = accounts::register(state.users.as_ref(), form).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountReply {
            msg: "User created successfully",
            user,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AccountReply>, ApiError> {
    let Json(form) = payload?;
    let user = accounts::login(state.users.as_ref(), form).await?;

    Ok(Json(AccountReply {
        msg: "Login successful",
        user,
    }))
}

async fn me(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let Query(user) = query?;
    Ok(Json(accounts::profile(state.users.as_ref(), user.user_id).await?))
}

async fn check_mobile(
    State(state): State<AppState>,
    payload: Result<Json<MobileLookup>, JsonRejection>,
) -> Result<Json<MobileCheck>, ApiError> {
    let Json(lookup) = payload?;
    Ok(Json(accounts::check_mobile(state.users.as_ref(), lookup).await?))
}
