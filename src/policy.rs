use rusqlite::params;

use crate::error::AppResult;
use crate::state::DbPool;

/// True iff a user with this identity exists and currently holds the admin
/// role. A missing user is simply not an admin, never an error.
///
/// Reads the persisted role on every call. Admin privileges can be revoked
/// between requests, so the answer must never be cached across calls.
pub fn is_admin(pool: &DbPool, identity: &str) -> AppResult<bool> {
    let conn = pool.get()?;
    let admin: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE identity = ?1 AND role = 'admin'",
        params![identity],
        |row| row.get(0),
    )?;
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, test_pool};

    #[test]
    fn admin_role_is_recognized() {
        let pool = test_pool();
        insert_user(&pool, "boss", "admin", 0);
        assert!(is_admin(&pool, "boss").unwrap());
    }

    #[test]
    fn plain_user_is_not_admin() {
        let pool = test_pool();
        insert_user(&pool, "alice", "user", 0);
        assert!(!is_admin(&pool, "alice").unwrap());
    }

    #[test]
    fn missing_user_is_not_admin() {
        let pool = test_pool();
        assert!(!is_admin(&pool, "nobody").unwrap());
    }

    #[test]
    fn revoked_role_takes_effect_immediately() {
        let pool = test_pool();
        insert_user(&pool, "boss", "admin", 0);
        assert!(is_admin(&pool, "boss").unwrap());

        let conn = pool.get().unwrap();
        conn.execute(
            "UPDATE users SET role = 'user' WHERE identity = 'boss'",
            [],
        )
        .unwrap();
        drop(conn);

        assert!(!is_admin(&pool, "boss").unwrap());
    }
}
