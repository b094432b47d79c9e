use chrono::{Datelike, Duration, Local, NaiveTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Time range for a leaderboard query. `Total` ranks live balances; the
/// windowed variants rank points earned from approvals inside the window,
/// which stays correct even after balances are spent on redemptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Total,
    Week,
    Month,
}

impl Window {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "total" => Some(Window::Total),
            "week" => Some(Window::Week),
            "month" => Some(Window::Month),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub identity: String,
    pub nickname: String,
    pub avatar_url: String,
    pub points: i64,
}

/// Window start in the store's UTC text format. Week starts on the most
/// recent Monday 00:00 local time, month on the first of the month 00:00.
fn window_start_utc(window: Window) -> Option<String> {
    let today = Local::now().date_naive();
    let start_date = match window {
        Window::Total => return None,
        Window::Week => today - Duration::days(today.weekday().num_days_from_monday() as i64),
        Window::Month => today.with_day(1).unwrap_or(today),
    };

    let local_midnight = Local
        .from_local_datetime(&start_date.and_time(NaiveTime::MIN))
        .earliest()
        .unwrap_or_else(|| Local::now());
    Some(
        local_midnight
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    )
}

/// Top-N by live balance.
fn total_leaderboard(pool: &DbPool, limit: u32) -> AppResult<Vec<LeaderboardEntry>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT identity, nickname, avatar_url, points
         FROM users ORDER BY points DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok(LeaderboardEntry {
                identity: row.get(0)?,
                nickname: row.get(1)?,
                avatar_url: row.get(2)?,
                points: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Top-N earners since `since`: approved-report history grouped by owner,
/// summed, joined to the owner's display identity in the same query.
pub(crate) fn earned_since(
    pool: &DbPool,
    since: &str,
    limit: u32,
) -> AppResult<Vec<LeaderboardEntry>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT r.owner, COALESCE(u.nickname, 'Anonymous'), COALESCE(u.avatar_url, ''),
                SUM(r.awarded_points) AS earned
         FROM reports r LEFT JOIN users u ON u.identity = r.owner
         WHERE r.status = 'approved' AND r.audit_time >= ?1
         GROUP BY r.owner
         ORDER BY earned DESC
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![since, limit], |row| {
            Ok(LeaderboardEntry {
                identity: row.get(0)?,
                nickname: row.get(1)?,
                avatar_url: row.get(2)?,
                points: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn leaderboard(pool: &DbPool, window: Window, limit: u32) -> AppResult<Vec<LeaderboardEntry>> {
    match window_start_utc(window) {
        None => total_leaderboard(pool, limit),
        Some(since) => earned_since(pool, &since, limit),
    }
}

/// A caller's rank on the total leaderboard: the number of users with a
/// strictly greater balance, plus one. Ties share the same rank number.
pub fn rank_of(pool: &DbPool, identity: &str) -> AppResult<i64> {
    let conn = pool.get()?;
    let points: Option<i64> = conn
        .query_row(
            "SELECT points FROM users WHERE identity = ?1",
            params![identity],
            |row| row.get(0),
        )
        .optional()?;
    let points = points.ok_or(AppError::NotFound)?;

    let ahead: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE points > ?1",
        params![points],
        |row| row.get(0),
    )?;
    Ok(ahead + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, test_pool};
    use chrono::{NaiveDate, Weekday};

    fn insert_approved(pool: &DbPool, owner: &str, points: i64, audit_time: &str) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO reports (id, owner, status, awarded_points, audit_time)
             VALUES (?1, ?2, 'approved', ?3, ?4)",
            params![uuid::Uuid::now_v7().to_string(), owner, points, audit_time],
        )
        .unwrap();
    }

    #[test]
    fn week_window_starts_on_a_monday_at_midnight() {
        let since = window_start_utc(Window::Week).unwrap();
        // Only the shape is deterministic here; the boundary itself moves
        let parsed =
            chrono::NaiveDateTime::parse_from_str(&since, "%Y-%m-%d %H:%M:%S").unwrap();
        let local_day = {
            let today = Local::now().date_naive();
            today - Duration::days(today.weekday().num_days_from_monday() as i64)
        };
        assert_eq!(local_day.weekday(), Weekday::Mon);
        assert!(parsed <= Utc::now().naive_utc());
    }

    #[test]
    fn month_window_starts_on_the_first() {
        let today = Local::now().date_naive();
        let first = today.with_day(1).unwrap();
        assert_eq!(first.day(), 1);
        assert!(window_start_utc(Window::Month).is_some());
    }

    #[test]
    fn total_window_has_no_start() {
        assert!(window_start_utc(Window::Total).is_none());
    }

    #[test]
    fn total_leaderboard_orders_by_balance() {
        let pool = test_pool();
        insert_user(&pool, "alice", "user", 30);
        insert_user(&pool, "bob", "user", 70);
        insert_user(&pool, "carol", "user", 50);

        let board = leaderboard(&pool, Window::Total, 2).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].identity, "bob");
        assert_eq!(board[1].identity, "carol");
    }

    #[test]
    fn windowed_board_sums_only_inside_the_window() {
        let pool = test_pool();
        insert_user(&pool, "alice", "user", 0);
        insert_user(&pool, "bob", "user", 0);

        insert_approved(&pool, "alice", 30, "2024-06-03 08:00:00");
        insert_approved(&pool, "alice", 20, "2024-06-04 09:00:00");
        insert_approved(&pool, "bob", 40, "2024-06-05 10:00:00");
        // Before the boundary, must be excluded
        insert_approved(&pool, "bob", 500, "2024-05-20 10:00:00");

        let board = earned_since(&pool, "2024-06-03 00:00:00", 10).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].identity, "alice");
        assert_eq!(board[0].points, 50);
        assert_eq!(board[1].identity, "bob");
        assert_eq!(board[1].points, 40);
    }

    #[test]
    fn windowed_board_ignores_non_approved_reports() {
        let pool = test_pool();
        insert_user(&pool, "alice", "user", 0);
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO reports (id, owner, status, awarded_points, audit_time)
             VALUES ('r1', 'alice', 'rejected', 0, '2024-06-03 08:00:00')",
            [],
        )
        .unwrap();
        drop(conn);

        let board = earned_since(&pool, "2024-06-01 00:00:00", 10).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn rank_counts_strictly_greater_balances() {
        let pool = test_pool();
        insert_user(&pool, "alice", "user", 50);
        insert_user(&pool, "bob", "user", 70);
        insert_user(&pool, "carol", "user", 50);
        insert_user(&pool, "dave", "user", 10);

        assert_eq!(rank_of(&pool, "bob").unwrap(), 1);
        // Tied balances share the rank
        assert_eq!(rank_of(&pool, "alice").unwrap(), 2);
        assert_eq!(rank_of(&pool, "carol").unwrap(), 2);
        assert_eq!(rank_of(&pool, "dave").unwrap(), 4);
    }

    #[test]
    fn rank_of_missing_user_is_not_found() {
        let pool = test_pool();
        assert!(matches!(rank_of(&pool, "ghost"), Err(AppError::NotFound)));
    }

    #[test]
    fn first_of_june_2024_is_a_saturday_sanity() {
        // Guards the weekday arithmetic used for the week window
        let d = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(d.weekday(), Weekday::Mon);
    }
}
