pub mod catalog;

use rusqlite::{params, OptionalExtension, TransactionBehavior};

use crate::db::models::Redemption;
use crate::error::{AppError, AppResult, RedeemAbort};
use crate::state::DbPool;

/// Exchange points for a badge. The balance check, the deduction, the badge
/// grant and the log append all commit in one serializable transaction, so
/// two concurrent redemptions by the same user can never both pass the
/// balance check. On abort nothing is changed and the caller gets the
/// specific reason. A conflict is terminal here; the caller re-issues.
pub fn redeem(pool: &DbPool, user: &str, product_id: &str) -> AppResult<Redemption> {
    let product = catalog::find(product_id).ok_or(AppError::NotFound)?;

    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let row: Option<(i64, String)> = tx
        .query_row(
            "SELECT points, badges FROM users WHERE identity = ?1",
            params![user],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let (points, badges_json) =
        row.ok_or(AppError::TransactionAborted(RedeemAbort::UserNotFound))?;

    let mut badges: Vec<String> = serde_json::from_str(&badges_json).unwrap_or_default();
    if badges.iter().any(|b| b == product.id) {
        return Err(RedeemAbort::AlreadyOwned.into());
    }
    if points < product.price {
        return Err(RedeemAbort::InsufficientPoints.into());
    }

    badges.push(product.id.to_string());
    tx.execute(
        "UPDATE users SET points = points - ?1, badges = ?2 WHERE identity = ?3",
        params![product.price, serde_json::to_string(&badges)?, user],
    )?;

    let id = uuid::Uuid::now_v7().to_string();
    tx.execute(
        "INSERT INTO redemptions (id, user_identity, product_id, price) VALUES (?1, ?2, ?3, ?4)",
        params![id, user, product.id, product.price],
    )?;

    let redemption = tx.query_row(
        "SELECT * FROM redemptions WHERE id = ?1",
        params![id],
        |row| {
            Ok(Redemption {
                id: row.get("id")?,
                user_identity: row.get("user_identity")?,
                product_id: row.get("product_id")?,
                price: row.get("price")?,
                created_at: row.get("created_at")?,
            })
        },
    )?;

    tx.commit()?;
    tracing::info!(
        "{} redeemed {} for {} points",
        user,
        product.name,
        product.price
    );
    Ok(redemption)
}
