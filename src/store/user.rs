use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::instrument;

use super::{StoreResult, UserStore};
use crate::models::user::{User, UserFields};

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(name = "Fetching users from database", skip(self))]
    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT id, first_name, last_name, email, created_at, updated_at
            FROM users
            ORDER BY id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    #[instrument(name = "Fetching user by id from database", skip(self))]
    async fn get_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, first_name, last_name, email, created_at, updated_at
            FROM users
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(name = "Saving new user to database", skip(self))]
    async fn insert(&self, fields: UserFields) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (first_name, last_name, email) VALUES ($1, $2, $3)
            RETURNING id, first_name, last_name, email, created_at, updated_at"#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.new_email())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;
        Ok(user)
    }

    #[instrument(name = "Updating user in database", skip(self))]
    async fn update(&self, id: i32, fields: UserFields) -> StoreResult<Option<User>> {
        // GREATEST keeps updated_at monotonic even if the server clock steps back.
        let user = sqlx::query_as::<_, User>(
            r#"UPDATE users
            SET first_name = $1,
                last_name = $2,
                email = CASE WHEN $5 THEN $3 ELSE email END,
                updated_at = GREATEST(CURRENT_TIMESTAMP, updated_at)
            WHERE id = $4
            RETURNING id, first_name, last_name, email, created_at, updated_at"#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.new_email())
        .bind(id)
        .bind(fields.email_given())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(name = "Deleting user from database", skip(self))]
    async fn delete_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"DELETE FROM users WHERE id = $1
            RETURNING id, first_name, last_name, email, created_at, updated_at"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
