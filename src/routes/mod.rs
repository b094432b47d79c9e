pub mod admin;
pub mod rank;
pub mod reports;
pub mod shop;
pub mod users;

use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Uniform response envelope: `{code, msg, data?, rows?, total?, token?}`.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Envelope {
    pub fn ok() -> Self {
        Envelope {
            code: 200,
            msg: "ok".to_string(),
            data: None,
            rows: None,
            total: None,
            token: None,
        }
    }

    pub fn with_data<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        Ok(Envelope {
            data: Some(serde_json::to_value(data)?),
            ..Envelope::ok()
        })
    }

    pub fn with_rows<T: Serialize>(rows: &[T]) -> Result<Self, serde_json::Error> {
        Ok(Envelope {
            rows: Some(serde_json::to_value(rows)?),
            total: Some(rows.len() as i64),
            ..Envelope::ok()
        })
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

async fn fallback(uri: Uri) -> Envelope {
    Envelope {
        code: 404,
        msg: format!("Not Found: {}", uri.path()),
        ..Envelope::ok()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(reports::router())
        .merge(admin::router())
        .merge(rank::router())
        .merge(shop::router())
        .fallback(fallback)
}
