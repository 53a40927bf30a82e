pub mod memory;
pub mod todo;
pub mod user;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use thiserror::Error;
use tracing::instrument;

use crate::models::{
    todo::{NewTodo, Todo, TodoId, TodoPatch},
    user::{User, UserFields},
};

pub use memory::{MemoryTodoStore, MemoryUserStore};
pub use todo::TodoRepository;
pub use user::UserRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint `{0}` violated")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_error) = e.as_database_error() {
            if db_error.is_unique_violation() {
                let constraint = db_error.constraint().unwrap_or("unique").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row storage for todos. `None` means no row matched the id.
#[async_trait]
pub trait TodoStore: Send + Sync + std::fmt::Debug {
    async fn list_all(&self) -> StoreResult<Vec<Todo>>;

    async fn get_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo>;

    /// Must apply the patch atomically, a toggle included.
    async fn update(&self, id: TodoId, patch: TodoPatch) -> StoreResult<Option<Todo>>;

    async fn delete_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>>;

    /// Removes every todo and returns how many were removed.
    async fn clear(&self) -> StoreResult<u64>;
}

/// Row storage for users. Listing is ordered by ascending id.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    async fn list_all(&self) -> StoreResult<Vec<User>>;

    async fn get_by_id(&self, id: i32) -> StoreResult<Option<User>>;

    async fn insert(&self, fields: UserFields) -> StoreResult<User>;

    async fn update(&self, id: i32, fields: UserFields) -> StoreResult<Option<User>>;

    async fn delete_by_id(&self, id: i32) -> StoreResult<Option<User>>;
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS todos (
        id SERIAL PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    // Older deployments created `todos` with only id and title.
    "ALTER TABLE todos ADD COLUMN IF NOT EXISTS completed BOOLEAN NOT NULL DEFAULT FALSE",
    "ALTER TABLE todos ADD COLUMN IF NOT EXISTS created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP",
    r#"CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    // Hand-made `users` tables may use plain TIMESTAMP columns, possibly
    // nullable and without defaults.
    r#"DO $$
    DECLARE
        col TEXT;
    BEGIN
        FOREACH col IN ARRAY ARRAY['created_at', 'updated_at'] LOOP
            IF EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema()
                  AND table_name = 'users'
                  AND column_name = col
                  AND data_type = 'timestamp without time zone'
            ) THEN
                EXECUTE format('ALTER TABLE users ALTER COLUMN %I TYPE TIMESTAMPTZ', col);
            END IF;
            EXECUTE format('UPDATE users SET %I = CURRENT_TIMESTAMP WHERE %I IS NULL', col, col);
            EXECUTE format(
                'ALTER TABLE users ALTER COLUMN %I SET DEFAULT CURRENT_TIMESTAMP, ALTER COLUMN %I SET NOT NULL',
                col, col
            );
        END LOOP;
    END
    $$"#,
];

/// Creates the tables if they are missing. Safe to run on every start.
#[instrument(name = "Ensuring database schema", skip(pool))]
pub async fn ensure_schema(pool: &Pool<Postgres>) -> StoreResult<()> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await.map_err(|e| {
            tracing::error!("Failed to apply schema statement: {:?}", e);
            e
        })?;
    }
    tracing::info!("Database schema ready");
    Ok(())
}
