use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{Caller, MaybeCaller};
use crate::reports::{self, likes, ListFilters};
use crate::routes::Envelope;
use crate::state::AppState;

async fn submit(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<Envelope> {
    let report = reports::submit(&state.db, &identity, payload)?;
    Ok(Envelope::with_data(&report)?)
}

#[derive(Deserialize)]
struct LikeRequest {
    id: String,
    #[serde(rename = "isLike")]
    is_like: bool,
}

async fn like(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<LikeRequest>,
) -> AppResult<Envelope> {
    likes::set_like(&state.db, &request.id, &identity, request.is_like)?;
    Ok(Envelope::ok())
}

async fn list(
    State(state): State<AppState>,
    MaybeCaller(identity): MaybeCaller,
    Query(filters): Query<ListFilters>,
) -> AppResult<Envelope> {
    let caller = identity.unwrap_or_default();
    let rows = reports::list(&state.db, &caller, &filters)?;
    Ok(Envelope::with_rows(&rows)?)
}

async fn detail(
    State(state): State<AppState>,
    MaybeCaller(identity): MaybeCaller,
    Path(id): Path<String>,
) -> AppResult<Envelope> {
    let caller = identity.unwrap_or_default();
    let detail = reports::detail(&state.db, &id, &caller)?;
    Ok(Envelope::with_data(&detail)?)
}

#[derive(Deserialize)]
struct DeleteRequest {
    id: String,
}

async fn delete(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<DeleteRequest>,
) -> AppResult<Envelope> {
    reports::delete(&state.db, &identity, &request.id)?;
    Ok(Envelope::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/system/report", post(submit))
        .route("/system/report/like", post(like))
        .route("/system/report/list", get(list))
        .route("/system/report/detail/{id}", get(detail))
        .route("/system/report/delete", post(delete))
}
