pub mod todo;
pub mod user;

use crate::{errors::ApiError, store::StoreError};

pub use todo::TodoService;
pub use user::UserService;

/// Logs the store failure and swaps it for a message safe to show callers.
fn store_failure(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |e| {
        tracing::error!("{}: {:?}", message, e);
        ApiError::Internal(message)
    }
}
