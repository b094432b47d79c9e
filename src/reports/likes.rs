use rusqlite::params;

use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// The likes table is provisioned by migrations; if it is missing that is an
/// infrastructure gap, not a logic error, and the caller should hear so.
fn map_missing_table(e: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(_, Some(msg)) = &e {
        if msg.contains("no such table: likes") {
            return AppError::StoreNotProvisioned(
                "likes table missing, run migrations".into(),
            );
        }
    }
    AppError::Database(e)
}

/// Idempotent like/unlike. The like row is the source of truth; the report's
/// `like_count` is a denormalized counter maintained by atomic increments.
///
/// On like, the row insert happens before the increment so a crash between
/// the two undercounts rather than inflating the counter. On unlike, the
/// decrement only runs when a row was actually removed, so racing unlikes
/// cannot decrement twice.
pub fn set_like(pool: &DbPool, report_id: &str, user: &str, want: bool) -> AppResult<()> {
    let conn = pool.get()?;

    if want {
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO likes (report_id, user_identity) VALUES (?1, ?2)",
                params![report_id, user],
            )
            .map_err(map_missing_table)?;
        if inserted > 0 {
            conn.execute(
                "UPDATE reports SET like_count = like_count + 1 WHERE id = ?1",
                params![report_id],
            )?;
        }
    } else {
        let removed = conn
            .execute(
                "DELETE FROM likes WHERE report_id = ?1 AND user_identity = ?2",
                params![report_id, user],
            )
            .map_err(map_missing_table)?;
        if removed > 0 {
            conn.execute(
                "UPDATE reports SET like_count = like_count - 1
                 WHERE id = ?1 AND like_count > 0",
                params![report_id],
            )?;
        }
    }

    Ok(())
}
