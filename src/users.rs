use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let badges_json: String = row.get("badges")?;
    Ok(User {
        id: row.get("id")?,
        identity: row.get("identity")?,
        nickname: row.get("nickname")?,
        avatar_url: row.get("avatar_url")?,
        role: row.get("role")?,
        points: row.get("points")?,
        badges: serde_json::from_str(&badges_json).unwrap_or_default(),
        created_at: row.get("created_at")?,
    })
}

/// Registration: create-if-absent on first login, keyed on the externally
/// resolved identity. Returns the (possibly pre-existing) user row.
pub fn ensure_user(pool: &DbPool, identity: &str) -> AppResult<User> {
    if identity.is_empty() {
        return Err(AppError::InvalidArgument("Empty identity".into()));
    }

    let inserted = {
        let conn = pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (id, identity, nickname) VALUES (?1, ?2, 'New user')",
            params![uuid::Uuid::now_v7().to_string(), identity],
        )?
    };
    if inserted > 0 {
        tracing::info!("Registered new user: {}", identity);
    }

    get_by_identity(pool, identity)?.ok_or(AppError::NotFound)
}

pub fn get_by_identity(pool: &DbPool, identity: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            "SELECT * FROM users WHERE identity = ?1",
            params![identity],
            user_from_row,
        )
        .optional()?;
    Ok(user)
}

/// Owner-only profile update. Absent fields are left untouched.
pub fn update_profile(
    pool: &DbPool,
    identity: &str,
    nickname: Option<&str>,
    avatar_url: Option<&str>,
) -> AppResult<()> {
    if nickname.is_none() && avatar_url.is_none() {
        return Err(AppError::InvalidArgument("Nothing to update".into()));
    }

    let conn = pool.get()?;
    let updated = conn.execute(
        "UPDATE users SET nickname = COALESCE(?1, nickname),
                          avatar_url = COALESCE(?2, avatar_url)
         WHERE identity = ?3",
        params![nickname, avatar_url, identity],
    )?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[test]
    fn ensure_user_registers_once() {
        let pool = test_pool();
        let first = ensure_user(&pool, "wx-123").unwrap();
        assert_eq!(first.identity, "wx-123");
        assert_eq!(first.points, 0);
        assert!(first.badges.is_empty());
        assert_eq!(first.role, "user");

        // Second login keeps the same row
        let second = ensure_user(&pool, "wx-123").unwrap();
        assert_eq!(second.id, first.id);

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn ensure_user_rejects_empty_identity() {
        let pool = test_pool();
        assert!(matches!(
            ensure_user(&pool, ""),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_profile_touches_only_supplied_fields() {
        let pool = test_pool();
        ensure_user(&pool, "wx-123").unwrap();

        update_profile(&pool, "wx-123", Some("Alice"), None).unwrap();
        let user = get_by_identity(&pool, "wx-123").unwrap().unwrap();
        assert_eq!(user.nickname, "Alice");
        assert_eq!(user.avatar_url, "");

        update_profile(&pool, "wx-123", None, Some("http://a/b.png")).unwrap();
        let user = get_by_identity(&pool, "wx-123").unwrap().unwrap();
        assert_eq!(user.nickname, "Alice");
        assert_eq!(user.avatar_url, "http://a/b.png");
    }

    #[test]
    fn update_profile_requires_a_field() {
        let pool = test_pool();
        ensure_user(&pool, "wx-123").unwrap();
        assert!(matches!(
            update_profile(&pool, "wx-123", None, None),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn update_profile_unknown_user_is_not_found() {
        let pool = test_pool();
        assert!(matches!(
            update_profile(&pool, "ghost", Some("x"), None),
            Err(AppError::NotFound)
        ));
    }
}
