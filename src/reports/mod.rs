pub mod likes;

use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::db::models::{Report, ReportStatus};
use crate::error::{AppError, AppResult};
use crate::policy;
use crate::state::DbPool;

/// Display identity shown when the owner row is missing or unreadable.
const FALLBACK_NICKNAME: &str = "Anonymous";

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    let status: String = row.get("status")?;
    let payload: String = row.get("payload")?;
    Ok(Report {
        id: row.get("id")?,
        owner: row.get("owner")?,
        status: ReportStatus::parse(&status).unwrap_or(ReportStatus::Pending),
        payload: serde_json::from_str(&payload).unwrap_or(serde_json::Value::Null),
        like_count: row.get("like_count")?,
        awarded_points: row.get("awarded_points")?,
        remark: row.get("remark")?,
        auditor: row.get("auditor")?,
        audit_time: row.get("audit_time")?,
        created_at: row.get("created_at")?,
    })
}

/// A report plus the owner's display identity, as returned by listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(flatten)]
    pub report: Report,
    pub owner_nickname: String,
    pub owner_avatar: String,
}

/// Detail view: a listing row further enriched with the caller's like state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    #[serde(flatten)]
    pub row: ReportRow,
    pub is_liked: bool,
}

fn enriched_from_row(row: &Row<'_>) -> rusqlite::Result<ReportRow> {
    let nickname: Option<String> = row.get("owner_nickname")?;
    let avatar: Option<String> = row.get("owner_avatar")?;
    Ok(ReportRow {
        report: report_from_row(row)?,
        owner_nickname: nickname.unwrap_or_else(|| FALLBACK_NICKNAME.to_string()),
        owner_avatar: avatar.unwrap_or_default(),
    })
}

/// Create a new report. Status is forced to pending and both counters start
/// at zero regardless of what the payload claims. Content validation happens
/// upstream, before this call.
pub fn submit(pool: &DbPool, owner: &str, payload: serde_json::Value) -> AppResult<Report> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO reports (id, owner, payload) VALUES (?1, ?2, ?3)",
        params![id, owner, payload.to_string()],
    )?;

    let report = conn.query_row(
        "SELECT * FROM reports WHERE id = ?1",
        params![id],
        report_from_row,
    )?;
    tracing::info!("Report {} submitted by {}", report.id, owner);
    Ok(report)
}

/// Fetch one report. Visible to admins, the owner, or anyone once approved.
pub fn detail(pool: &DbPool, id: &str, caller: &str) -> AppResult<ReportDetail> {
    let row = {
        let conn = pool.get()?;
        conn.query_row(
            "SELECT r.*, u.nickname AS owner_nickname, u.avatar_url AS owner_avatar
             FROM reports r LEFT JOIN users u ON u.identity = r.owner
             WHERE r.id = ?1",
            params![id],
            enriched_from_row,
        )
        .optional()?
    };
    let row = row.ok_or(AppError::NotFound)?;

    if row.report.status != ReportStatus::Approved
        && row.report.owner != caller
        && !policy::is_admin(pool, caller)?
    {
        return Err(AppError::Forbidden);
    }

    // Like state is cosmetic enrichment; a missing likes table degrades to
    // "not liked" rather than failing the fetch.
    let conn = pool.get()?;
    let is_liked = match conn.query_row(
        "SELECT COUNT(*) > 0 FROM likes WHERE report_id = ?1 AND user_identity = ?2",
        params![id, caller],
        |r| r.get(0),
    ) {
        Ok(liked) => liked,
        Err(e) => {
            tracing::warn!("Like-state lookup failed for report {}: {}", id, e);
            false
        }
    };

    Ok(ReportDetail { row, is_liked })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilters {
    pub status: Option<ReportStatus>,
    /// Narrow the listing to one owner's reports.
    pub owner: Option<String>,
    pub order_by: Option<String>,
    pub direction: Option<String>,
}

fn order_clause(filters: &ListFilters) -> AppResult<String> {
    let column = match filters.order_by.as_deref() {
        None | Some("createTime") => "created_at",
        Some("likeCount") => "like_count",
        Some(other) => {
            return Err(AppError::InvalidArgument(format!(
                "Unknown sort field: {}",
                other
            )))
        }
    };
    let direction = match filters.direction.as_deref() {
        None | Some("desc") => "DESC",
        Some("asc") => "ASC",
        Some(other) => {
            return Err(AppError::InvalidArgument(format!(
                "Unknown sort direction: {}",
                other
            )))
        }
    };
    Ok(format!("r.{} {}", column, direction))
}

/// List reports under the visibility rules: approved listings are public,
/// anything else defaults to the caller's own reports unless the caller is
/// an admin (who may target any owner, or none for everything).
///
/// Owner display identities come from the join, one query for the whole
/// page rather than one lookup per row.
pub fn list(pool: &DbPool, caller: &str, filters: &ListFilters) -> AppResult<Vec<ReportRow>> {
    let target_owner = if filters.status == Some(ReportStatus::Approved) {
        filters.owner.clone()
    } else if policy::is_admin(pool, caller)? {
        filters.owner.clone()
    } else {
        Some(caller.to_string())
    };

    let sql = format!(
        "SELECT r.*, u.nickname AS owner_nickname, u.avatar_url AS owner_avatar
         FROM reports r LEFT JOIN users u ON u.identity = r.owner
         WHERE (?1 IS NULL OR r.status = ?1) AND (?2 IS NULL OR r.owner = ?2)
         ORDER BY {}",
        order_clause(filters)?
    );

    let conn = pool.get()?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![filters.status.map(|s| s.as_str()), target_owner],
            enriched_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_for_owner(pool: &DbPool, owner: &str) -> AppResult<i64> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE owner = ?1",
        params![owner],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Moderation queue: every report, pending first, newest first within each
/// status. Admin only.
pub fn admin_list(pool: &DbPool, caller: &str) -> AppResult<Vec<ReportRow>> {
    if !policy::is_admin(pool, caller)? {
        return Err(AppError::Forbidden);
    }

    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT r.*, u.nickname AS owner_nickname, u.avatar_url AS owner_avatar
         FROM reports r LEFT JOIN users u ON u.identity = r.owner
         ORDER BY CASE r.status WHEN 'pending' THEN 0 WHEN 'approved' THEN 1 ELSE 2 END,
                  r.created_at DESC",
    )?;
    let rows = stmt
        .query_map([], enriched_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Admin decision on a pending report. Idempotent by construction: a report
/// that already left `pending` is a no-op success — audit metadata is not
/// overwritten and points are never credited twice.
///
/// The status flip and the owner's point credit commit in one transaction,
/// so concurrent audits of the same report cannot double-credit and
/// concurrent audits of different reports for one owner cannot lose
/// increments (the credit is a SQL-level increment, not read-modify-write).
pub fn audit(
    pool: &DbPool,
    caller: &str,
    id: &str,
    decision: ReportStatus,
    remark: Option<&str>,
    points: i64,
) -> AppResult<()> {
    if !policy::is_admin(pool, caller)? {
        return Err(AppError::Forbidden);
    }
    if decision == ReportStatus::Pending {
        return Err(AppError::InvalidArgument(
            "Audit decision must be approved or rejected".into(),
        ));
    }
    if points < 0 {
        return Err(AppError::InvalidArgument(
            "Awarded points must be non-negative".into(),
        ));
    }

    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let report: Option<(String, String)> = tx
        .query_row(
            "SELECT owner, status FROM reports WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let (owner, status) = report.ok_or(AppError::NotFound)?;

    if status != "pending" {
        tracing::info!("Report {} already audited ({}), skipping", id, status);
        return Ok(());
    }

    let awarded = if decision == ReportStatus::Approved {
        points
    } else {
        0
    };
    tx.execute(
        "UPDATE reports SET status = ?1, remark = ?2, audit_time = datetime('now'),
                            auditor = ?3, awarded_points = ?4
         WHERE id = ?5 AND status = 'pending'",
        params![decision.as_str(), remark.unwrap_or(""), caller, awarded, id],
    )?;

    if awarded > 0 {
        tx.execute(
            "UPDATE users SET points = points + ?1 WHERE identity = ?2",
            params![awarded, owner],
        )?;
    }

    tx.commit()?;
    tracing::info!(
        "Report {} audited by {}: {} (+{} points to {})",
        id,
        caller,
        decision.as_str(),
        awarded,
        owner
    );
    Ok(())
}

/// Delete a report. Admins may delete anything; owners only while the report
/// is still pending. Associated like rows are cleaned up best-effort.
pub fn delete(pool: &DbPool, caller: &str, id: &str) -> AppResult<()> {
    let report: Option<(String, String)> = {
        let conn = pool.get()?;
        conn.query_row(
            "SELECT owner, status FROM reports WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
    };
    let (owner, status) = report.ok_or(AppError::NotFound)?;

    if !policy::is_admin(pool, caller)? {
        if owner != caller {
            return Err(AppError::Forbidden);
        }
        if status != "pending" {
            return Err(AppError::Forbidden);
        }
    }

    let conn = pool.get()?;
    conn.execute("DELETE FROM reports WHERE id = ?1", params![id])?;

    // Orphaned like rows are invisible once the report is gone, so cleanup
    // failure is logged but never surfaced.
    if let Err(e) = conn.execute("DELETE FROM likes WHERE report_id = ?1", params![id]) {
        tracing::warn!("Like cleanup for deleted report {} failed: {}", id, e);
    }

    tracing::info!("Report {} deleted by {}", id, caller);
    Ok(())
}
