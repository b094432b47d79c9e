use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extractors::Caller;
use crate::points;
use crate::reports;
use crate::routes::Envelope;
use crate::state::AppState;
use crate::users;

/// Identity resolution happens upstream; by the time a login request lands
/// here the identity is already on the request. Both login routes therefore
/// just register-if-absent and echo the identity back as the token.
async fn login(State(state): State<AppState>, Caller(identity): Caller) -> AppResult<Envelope> {
    users::ensure_user(&state.db, &identity)?;
    Ok(Envelope {
        token: Some(identity),
        ..Envelope::ok()
    })
}

async fn get_info(State(state): State<AppState>, Caller(identity): Caller) -> AppResult<Envelope> {
    let user = users::get_by_identity(&state.db, &identity)?.ok_or(AppError::Unauthorized)?;
    let report_count = reports::count_for_owner(&state.db, &identity)?;
    let rank = points::rank_of(&state.db, &identity)?;

    Ok(Envelope::with_data(&json!({
        "user": user,
        "reportCount": report_count,
        "rank": rank,
    }))?)
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    #[serde(rename = "nickName")]
    nickname: Option<String>,
    #[serde(rename = "avatarUrl")]
    avatar_url: Option<String>,
}

async fn update_profile(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Envelope> {
    users::update_profile(
        &state.db,
        &identity,
        request.nickname.as_deref(),
        request.avatar_url.as_deref(),
    )?;
    Ok(Envelope::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/wechat/login", post(login))
        .route("/getInfo", get(get_info))
        .route("/user/update", post(update_profile))
}
