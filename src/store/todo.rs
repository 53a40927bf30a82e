use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, prelude::FromRow};
use tracing::instrument;

use super::{StoreResult, TodoStore};
use crate::models::todo::{NewTodo, Todo, TodoId, TodoPatch};

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i32,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: TodoId::Serial(row.id),
            title: row.title,
            completed: row.completed,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TodoRepository {
    pool: Pool<Postgres>,
}

impl TodoRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// Ids minted by the in-memory store never exist in this table.
fn serial(id: TodoId) -> Option<i32> {
    match id {
        TodoId::Serial(id) => Some(id),
        TodoId::Random(_) => None,
    }
}

#[async_trait]
impl TodoStore for TodoRepository {
    #[instrument(name = "Fetching todos from database", skip(self))]
    async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, completed, created_at FROM todos ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    #[instrument(name = "Fetching todo by id from database", skip(self))]
    async fn get_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let Some(id) = serial(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, TodoRow>(
            "SELECT id, title, completed, created_at FROM todos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    #[instrument(name = "Saving new todo to database", skip(self))]
    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(
            "INSERT INTO todos (title) VALUES ($1) RETURNING id, title, completed, created_at",
        )
        .bind(&todo.title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;
        Ok(row.into())
    }

    #[instrument(name = "Updating todo in database", skip(self))]
    async fn update(&self, id: TodoId, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let Some(id) = serial(id) else {
            return Ok(None);
        };
        let (toggle, title, completed) = match patch {
            TodoPatch::Toggle => (true, None, None),
            TodoPatch::Fields { title, completed } => (false, title, completed),
        };

        // One statement, so concurrent toggles serialize on the row lock.
        let row = sqlx::query_as::<_, TodoRow>(
            r#"UPDATE todos
            SET title = COALESCE($2, title),
                completed = CASE WHEN $3 THEN NOT completed ELSE COALESCE($4, completed) END
            WHERE id = $1
            RETURNING id, title, completed, created_at"#,
        )
        .bind(id)
        .bind(title)
        .bind(toggle)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    #[instrument(name = "Deleting todo from database", skip(self))]
    async fn delete_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let Some(id) = serial(id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, TodoRow>(
            "DELETE FROM todos WHERE id = $1 RETURNING id, title, completed, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    #[instrument(name = "Deleting all todos from database", skip(self))]
    async fn clear(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
