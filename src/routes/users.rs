use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use super::required_json_body;
use crate::{
    errors::ApiError,
    models::user::{UserFields, parse_user_id},
    startup::AppState,
};

#[instrument(name = "HTTP: Create user", skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let fields = UserFields::parse(&required_json_body(&body)?)?;
    let user = state.user_service.create(fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": user })),
    ))
}

#[instrument(name = "HTTP: List users", skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

#[instrument(name = "HTTP: Get user", skip(state))]
pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.get(parse_user_id(&id)?).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

#[instrument(name = "HTTP: Update user", skip(state, body))]
pub async fn update_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_user_id(&id)?;
    let fields = UserFields::parse(&required_json_body(&body)?)?;
    let user = state.user_service.update(id, fields).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

#[instrument(name = "HTTP: Delete user", skip(state))]
pub async fn delete_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.delete(parse_user_id(&id)?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "User deleted",
        "user": user,
    })))
}
