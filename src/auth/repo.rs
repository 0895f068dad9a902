use sqlx::SqlitePool;

use crate::auth::errors::StoreError;
use crate::auth::repo_types::{User, UserId};

impl User {
    /// Find a user by exact username.
    pub async fn find_by_username(
        db: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The UNIQUE constraint on `username` makes the
    /// duplicate check and the insert a single atomic statement.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateUsername
            }
            other => StoreError::Database(other),
        })?;
        Ok(res.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn count(db: &SqlitePool, username: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(db)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn create_then_find() {
        let db = db::memory().await;
        let id = User::create(&db, "alice", "a@x.com", "hash").await.unwrap();
        let user = User::find_by_username(&db, "alice").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.password_hash, "hash");
    }

    #[tokio::test]
    async fn ids_increase() {
        let db = db::memory().await;
        let a = User::create(&db, "a", "a@x.com", "h").await.unwrap();
        let b = User::create(&db, "b", "b@x.com", "h").await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn duplicate_username_leaves_single_row() {
        let db = db::memory().await;
        User::create(&db, "alice", "a@x.com", "h1").await.unwrap();
        let err = User::create(&db, "alice", "other@x.com", "h2")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
        assert_eq!(count(&db, "alice").await, 1);

        let user = User::find_by_username(&db, "alice").await.unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let db = db::memory().await;
        User::create(&db, "alice", "a@x.com", "h").await.unwrap();
        assert!(User::find_by_username(&db, "Alice").await.unwrap().is_none());
        assert!(User::find_by_username(&db, "ali").await.unwrap().is_none());
    }
}
