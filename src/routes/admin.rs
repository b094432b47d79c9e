use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::models::ReportStatus;
use crate::error::{AppError, AppResult};
use crate::extractors::Caller;
use crate::reports;
use crate::routes::Envelope;
use crate::state::AppState;

#[derive(Deserialize)]
struct AuditRequest {
    id: String,
    /// "approved" or "rejected".
    status: String,
    remark: Option<String>,
    #[serde(default)]
    points: i64,
}

async fn audit(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<AuditRequest>,
) -> AppResult<Envelope> {
    let decision = ReportStatus::parse(&request.status).ok_or_else(|| {
        AppError::InvalidArgument(format!("Unknown audit decision: {}", request.status))
    })?;
    reports::audit(
        &state.db,
        &identity,
        &request.id,
        decision,
        request.remark.as_deref(),
        request.points,
    )?;
    Ok(Envelope::ok())
}

async fn list(State(state): State<AppState>, Caller(identity): Caller) -> AppResult<Envelope> {
    let rows = reports::admin_list(&state.db, &identity)?;
    Ok(Envelope::with_rows(&rows)?)
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
        .route("/admin/report/audit", post(audit))
        .route("/admin/report/list", get(list))
        .route("/admin/report/delete", post(delete))
}
