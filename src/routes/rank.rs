use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::points::{self, Window};
use crate::routes::Envelope;
use crate::state::AppState;

const LEADERBOARD_SIZE: u32 = 10;

async fn leaderboard(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> AppResult<Envelope> {
    let window = Window::parse(&scope)
        .ok_or_else(|| AppError::InvalidArgument(format!("Unknown rank scope: {}", scope)))?;
    let rows = points::leaderboard(&state.db, window, LEADERBOARD_SIZE)?;
    Ok(Envelope::with_rows(&rows)?)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/system/user/rank/{scope}", get(leaderboard))
}
