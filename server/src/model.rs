//! Todo entity and the request payloads that create or patch it.
//!
//! # Design
//! `Todo` is the only record the service persists. Audit timestamps live in
//! the store's schema and never cross into this type, so the JSON shape stays
//! `{"id","name","completed"}`. `NewTodo` and `TodoPatch` are the validated
//! inputs the repository accepts; the `*Request` types are the raw bodies the
//! handlers deserialize before validation.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a todo.
pub type TodoId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub name: String,
    pub completed: bool,
}

/// Body of `POST /todos/`.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub name: String,
}

/// Body of `PATCH /todos/:id`. Absent and `null` fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// A validated todo ready to be inserted. New todos always start incomplete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub name: String,
}

impl NewTodo {
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name })
    }
}

/// A validated partial update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub name: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.completed.is_none()
    }

    /// Overwrites only the fields this patch carries.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(name) = &self.name {
            todo.name = name.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

impl TryFrom<UpdateTodoRequest> for TodoPatch {
    type Error = String;

    fn try_from(value: UpdateTodoRequest) -> Result<Self, Self::Error> {
        if let Some(name) = &value.name {
            validate_name(name)?;
        }
        Ok(Self {
            name: value.name,
            completed: value.completed,
        })
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name is required".to_string());
    }
    Ok(())
}
