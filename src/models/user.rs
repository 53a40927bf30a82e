use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::prelude::FromRow;

use crate::errors::ApiError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable part of a user. Names are always replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    /// `None` when the request had no `email` key: an update keeps the
    /// stored value. `Some(None)` clears it.
    pub email: Option<Option<String>>,
}

fn required_name(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl UserFields {
    pub fn parse(body: &Value) -> Result<Self, ApiError> {
        let (Some(first_name), Some(last_name)) = (
            required_name(body, "first_name"),
            required_name(body, "last_name"),
        ) else {
            return Err(ApiError::Validation(
                "First and Last Name are required".into(),
            ));
        };

        let email = match body.get("email") {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(email)) => {
                Some(Some(email.trim().to_string()).filter(|email| !email.is_empty()))
            }
            Some(_) => return Err(ApiError::Validation("Email must be a string".into())),
        };

        Ok(UserFields {
            first_name,
            last_name,
            email,
        })
    }

    /// Whether the request says anything about the email.
    pub fn email_given(&self) -> bool {
        self.email.is_some()
    }

    /// The email the row carries after the write, if one was given.
    pub fn new_email(&self) -> Option<&str> {
        self.email.as_ref().and_then(|email| email.as_deref())
    }
}

pub fn parse_user_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid user id: {raw}")))
}
