use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::{
    errors::ApiError,
    models::{todo::Todo, user::User},
    startup::AppState,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

struct TodoView {
    id: String,
    title: String,
    completed: bool,
    created_at: String,
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.to_string(),
            title: todo.title,
            completed: todo.completed,
            created_at: todo.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

struct UserView {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    updated_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.unwrap_or_default(),
            updated_at: user.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "todos.html")]
struct TodosTemplate {
    todos: Vec<TodoView>,
    remaining: usize,
}

#[derive(Template)]
#[template(path = "users.html")]
struct UsersTemplate {
    users: Vec<UserView>,
}

fn render(template: impl Template) -> Result<Html<String>, ApiError> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Failed to render page: {:?}", e);
        ApiError::Internal("Failed to render page")
    })
}

pub async fn todos_page(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let todos = state.todo_service.list().await?;
    let remaining = todos.iter().filter(|t| !t.completed).count();
    render(TodosTemplate {
        todos: todos.into_iter().map(TodoView::from).collect(),
        remaining,
    })
}

pub async fn users_page(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_service.list().await?;
    render(UsersTemplate {
        users: users.into_iter().map(UserView::from).collect(),
    })
}
