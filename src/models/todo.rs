use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::ApiError;

/// Identifier of a todo. Postgres hands out serial integers, the in-memory
/// store random UUIDs; on the wire it is a bare number or string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Serial(i32),
    Random(Uuid),
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodoId::Serial(id) => write!(f, "{id}"),
            TodoId::Random(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("`{0}` is neither an integer nor a UUID")]
pub struct ParseTodoIdError(String);

impl FromStr for TodoId {
    type Err = ParseTodoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<i32>() {
            return Ok(TodoId::Serial(id));
        }
        Uuid::parse_str(s)
            .map(TodoId::Random)
            .map_err(|_| ParseTodoIdError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub title: String,
}

/// A validated PATCH request. An empty body means "flip `completed`".
#[derive(Debug, Clone, PartialEq)]
pub enum TodoPatch {
    Toggle,
    Fields {
        title: Option<String>,
        completed: Option<bool>,
    },
}

// `text` is accepted as an alias for `title`; clients of the in-memory API send it.
fn title_field(body: &Map<String, Value>) -> Option<&Value> {
    body.get("title").or_else(|| body.get("text"))
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl NewTodo {
    pub fn parse(body: &Value) -> Result<Self, ApiError> {
        body.as_object()
            .and_then(title_field)
            .and_then(non_blank)
            .map(|title| NewTodo { title })
            .ok_or_else(|| {
                ApiError::Validation("Title is required and must be a non-empty string".into())
            })
    }
}

impl TodoPatch {
    pub fn parse(body: Option<&Value>) -> Result<Self, ApiError> {
        let Some(body) = body else {
            return Ok(TodoPatch::Toggle);
        };
        let fields = body
            .as_object()
            .ok_or_else(|| ApiError::Validation("Request body must be a JSON object".into()))?;
        if fields.is_empty() {
            return Ok(TodoPatch::Toggle);
        }

        let title = match title_field(fields) {
            None => None,
            Some(value) => Some(non_blank(value).ok_or_else(|| {
                ApiError::Validation("Title must be a non-empty string".into())
            })?),
        };

        let completed = match fields.get("completed") {
            None => None,
            Some(Value::Bool(completed)) => Some(*completed),
            Some(_) => {
                return Err(ApiError::Validation("Completed must be a boolean".into()));
            }
        };

        Ok(TodoPatch::Fields { title, completed })
    }

    pub fn apply(self, todo: &mut Todo) {
        match self {
            TodoPatch::Toggle => todo.completed = !todo.completed,
            TodoPatch::Fields { title, completed } => {
                if let Some(title) = title {
                    todo.title = title;
                }
                if let Some(completed) = completed {
                    todo.completed = completed;
                }
            }
        }
    }
}
