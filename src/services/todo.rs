use std::sync::Arc;

use tracing::instrument;

use super::store_failure;
use crate::{
    errors::ApiError,
    models::todo::{NewTodo, Todo, TodoId, TodoPatch},
    store::TodoStore,
};

const NOT_FOUND: &str = "Todo not found";

#[derive(Clone, Debug)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        self.store
            .list_all()
            .await
            .map_err(store_failure("Failed to fetch todos"))
    }

    #[instrument(name = "TodoService: Get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Todo, ApiError> {
        let id = parse_id(id)?;
        self.store
            .get_by_id(id)
            .await
            .map_err(store_failure("Failed to fetch todo"))?
            .ok_or(ApiError::NotFound(NOT_FOUND))
    }

    #[instrument(name = "TodoService: Create", skip(self))]
    pub async fn create(&self, todo: NewTodo) -> Result<Todo, ApiError> {
        let todo = self
            .store
            .insert(todo)
            .await
            .map_err(store_failure("Failed to create todo"))?;
        tracing::info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    #[instrument(name = "TodoService: Update", skip(self))]
    pub async fn update(&self, id: &str, patch: TodoPatch) -> Result<Todo, ApiError> {
        let id = parse_id(id)?;
        self.store
            .update(id, patch)
            .await
            .map_err(store_failure("Failed to update todo"))?
            .ok_or(ApiError::NotFound(NOT_FOUND))
    }

    #[instrument(name = "TodoService: Delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Todo, ApiError> {
        let id = parse_id(id)?;
        let todo = self
            .store
            .delete_by_id(id)
            .await
            .map_err(store_failure("Failed to delete todo"))?
            .ok_or(ApiError::NotFound(NOT_FOUND))?;
        tracing::info!(todo_id = %todo.id, "Todo deleted");
        Ok(todo)
    }

    #[instrument(name = "TodoService: Clear", skip(self))]
    pub async fn clear(&self) -> Result<u64, ApiError> {
        let removed = self
            .store
            .clear()
            .await
            .map_err(store_failure("Failed to delete todos"))?;
        tracing::info!(removed, "All todos deleted");
        Ok(removed)
    }
}

// An id neither store could have produced cannot match a row.
fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|e| {
        tracing::warn!("Rejected todo id: {}", e);
        ApiError::NotFound(NOT_FOUND)
    })
}
