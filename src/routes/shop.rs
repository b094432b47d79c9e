use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::Caller;
use crate::routes::Envelope;
use crate::shop::{self, catalog};
use crate::state::AppState;

async fn list() -> AppResult<Envelope> {
    Ok(Envelope::with_rows(catalog::PRODUCTS)?)
}

#[derive(Deserialize)]
struct RedeemRequest {
    #[serde(rename = "productId")]
    product_id: String,
}

async fn redeem(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<RedeemRequest>,
) -> AppResult<Envelope> {
    let redemption = shop::redeem(&state.db, &identity, &request.product_id)?;
    Ok(Envelope::with_data(&redemption)?)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shop/list", get(list))
        .route("/shop/redeem", post(redeem))
}
