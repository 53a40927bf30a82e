use std::sync::Arc;

use tracing::instrument;

use super::store_failure;
use crate::{
    errors::ApiError,
    models::user::{User, UserFields},
    store::{StoreError, UserStore},
};

const NOT_FOUND: &str = "User not found";

#[derive(Clone, Debug)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

/// Duplicate emails are the caller's problem, everything else is ours.
fn write_failure(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |e| match e {
        StoreError::UniqueViolation(constraint) => {
            tracing::warn!(%constraint, "Rejected user write: email already in use");
            ApiError::Conflict("A user with this email already exists")
        }
        other => store_failure(message)(other),
    }
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.store
            .list_all()
            .await
            .map_err(store_failure("Failed to fetch users"))
    }

    #[instrument(name = "UserService: Get", skip(self))]
    pub async fn get(&self, id: i32) -> Result<User, ApiError> {
        self.store
            .get_by_id(id)
            .await
            .map_err(store_failure("Failed to fetch user"))?
            .ok_or(ApiError::NotFound(NOT_FOUND))
    }

    #[instrument(name = "UserService: Create", skip(self))]
    pub async fn create(&self, fields: UserFields) -> Result<User, ApiError> {
        let user = self
            .store
            .insert(fields)
            .await
            .map_err(write_failure("Failed to create user"))?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    #[instrument(name = "UserService: Update", skip(self))]
    pub async fn update(&self, id: i32, fields: UserFields) -> Result<User, ApiError> {
        self.store
            .update(id, fields)
            .await
            .map_err(write_failure("Failed to update user"))?
            .ok_or(ApiError::NotFound(NOT_FOUND))
    }

    #[instrument(name = "UserService: Delete", skip(self))]
    pub async fn delete(&self, id: i32) -> Result<User, ApiError> {
        let user = self
            .store
            .delete_by_id(id)
            .await
            .map_err(store_failure("Failed to delete user"))?
            .ok_or(ApiError::NotFound(NOT_FOUND))?;
        tracing::info!(user_id = user.id, "User deleted");
        Ok(user)
    }
}
