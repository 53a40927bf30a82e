use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use super::{json_body, required_json_body};
use crate::{
    errors::ApiError,
    models::todo::{NewTodo, TodoPatch},
    startup::AppState,
};

#[instrument(name = "HTTP: List todos", skip(state))]
pub async fn list_todos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let todos = state.todo_service.list().await?;
    Ok(Json(todos))
}

#[instrument(name = "HTTP: Create todo", skip(state, body))]
pub async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let todo = NewTodo::parse(&required_json_body(&body)?)?;
    let todo = state.todo_service.create(todo).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(name = "HTTP: Get todo", skip(state))]
pub async fn get_todo(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state.todo_service.get(&id).await?;
    Ok(Json(todo))
}

/// An empty body (or `{}`) flips `completed`.
#[instrument(name = "HTTP: Update todo", skip(state, body))]
pub async fn update_todo(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let patch = TodoPatch::parse(json_body(&body)?.as_ref())?;
    let todo = state.todo_service.update(&id, patch).await?;
    Ok(Json(todo))
}

#[instrument(name = "HTTP: Delete todo", skip(state))]
pub async fn delete_todo(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state.todo_service.delete(&id).await?;
    Ok(Json(json!({ "message": "Todo deleted", "todo": todo })))
}

#[instrument(name = "HTTP: Delete all todos", skip(state))]
pub async fn clear_todos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.todo_service.clear().await?;
    Ok(Json(json!({ "message": "All todos deleted", "deleted": deleted })))
}
