use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, CANNOT_PARSE_ID, CANNOT_PARSE_JSON};
use crate::model::{CreateTodoRequest, Todo, TodoId, TodoPatch, UpdateTodoRequest};
use crate::repo::TodoRepository;

pub(crate) async fn list_todos(
    State(repo): State<TodoRepository>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(repo.list_all().await?))
}

pub(crate) async fn get_todo(
    State(repo): State<TodoRepository>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id)?;
    Ok(Json(repo.get_by_id(id).await?))
}

pub(crate) async fn create_todo(
    State(repo): State<TodoRepository>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let input: CreateTodoRequest = parse_body(body)?;
    Ok(Json(repo.create(input.name).await?))
}

pub(crate) async fn update_todo(
    State(repo): State<TodoRepository>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id)?;
    let input: UpdateTodoRequest = parse_body(body)?;
    let patch = TodoPatch::try_from(input).map_err(ApiError::BadRequest)?;
    Ok(Json(repo.update(id, patch).await?))
}

pub(crate) async fn delete_todo(
    State(repo): State<TodoRepository>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(id)?;
    repo.delete(id).await?;
    Ok(Json(json!({ "status": "todo deleted successfully" })))
}

pub(crate) async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn parse_id(raw: Result<Path<String>, PathRejection>) -> Result<TodoId, ApiError> {
    let bad_id = || ApiError::BadRequest(CANNOT_PARSE_ID.to_string());
    let Path(raw) = raw.map_err(|rejection| {
        debug!(event = "path_rejected", reason = %rejection.body_text());
        bad_id()
    })?;
    raw.parse().map_err(|_| bad_id())
}

// Bodies must be JSON objects; serde's derived visitors would also take arrays.
fn parse_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    let bad_json = || ApiError::BadRequest(CANNOT_PARSE_JSON.to_string());
    let Json(value) = body.map_err(|rejection| {
        debug!(event = "json_rejected", reason = %rejection.body_text());
        bad_json()
    })?;
    if !value.is_object() {
        debug!(event = "json_rejected", reason = "body is not an object");
        return Err(bad_json());
    }
    serde_json::from_value(value).map_err(|err| {
        debug!(event = "json_rejected", reason = %err);
        bad_json()
    })
}
