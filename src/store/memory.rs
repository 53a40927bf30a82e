//! Process-local stores. They start empty and live as long as the process;
//! every mutation happens under one write lock, so read-modify-write
//! operations such as the completion toggle are atomic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{NewTodo, Todo, TodoId, TodoPatch},
    user::{User, UserFields},
};

const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Clone, Debug, Default)]
pub struct MemoryTodoStore {
    todos: Arc<RwLock<Vec<Todo>>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        Ok(self.todos.read().await.clone())
    }

    async fn get_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        Ok(self.todos.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, todo: NewTodo) -> StoreResult<Todo> {
        let todo = Todo {
            id: TodoId::Random(Uuid::new_v4()),
            title: todo.title,
            completed: false,
            created_at: Utc::now(),
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        patch.apply(todo);
        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        Ok(todos
            .iter()
            .position(|t| t.id == id)
            .map(|index| todos.remove(index)))
    }

    async fn clear(&self) -> StoreResult<u64> {
        let mut todos = self.todos.write().await;
        let removed = todos.len() as u64;
        todos.clear();
        Ok(removed)
    }
}

#[derive(Debug, Default)]
struct UserTable {
    last_id: i32,
    rows: Vec<User>,
}

impl UserTable {
    fn email_taken(&self, email: Option<&str>, except: Option<i32>) -> bool {
        let Some(email) = email else {
            return false;
        };
        self.rows
            .iter()
            .any(|u| Some(u.id) != except && u.email.as_deref() == Some(email))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryUserStore {
    table: Arc<RwLock<UserTable>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_all(&self) -> StoreResult<Vec<User>> {
        // Ids are handed out in increasing order and rows are only appended.
        Ok(self.table.read().await.rows.clone())
    }

    async fn get_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, fields: UserFields) -> StoreResult<User> {
        let mut table = self.table.write().await;
        if table.email_taken(fields.new_email(), None) {
            return Err(StoreError::UniqueViolation(EMAIL_CONSTRAINT.into()));
        }

        table.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.last_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email.flatten(),
            created_at: now,
            updated_at: now,
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: i32, fields: UserFields) -> StoreResult<Option<User>> {
        let mut table = self.table.write().await;
        if !table.rows.iter().any(|u| u.id == id) {
            return Ok(None);
        }
        if table.email_taken(fields.new_email(), Some(id)) {
            return Err(StoreError::UniqueViolation(EMAIL_CONSTRAINT.into()));
        }

        let Some(user) = table.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.first_name = fields.first_name;
        user.last_name = fields.last_name;
        if let Some(email) = fields.email {
            user.email = email;
        }
        user.updated_at = user.updated_at.max(Utc::now());
        Ok(Some(user.clone()))
    }

    async fn delete_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let mut table = self.table.write().await;
        Ok(table
            .rows
            .iter()
            .position(|u| u.id == id)
            .map(|index| table.rows.remove(index)))
    }
}
