// rest/routes/tasks.rs — Task CRUD handlers.
//
// One function per HTTP method. Validation happens here, before any storage
// call; a mutation only answers after storage has confirmed the write.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::rest::error::ApiError;
use crate::rest::RoutePath;
use crate::storage::TaskPatch;
use crate::AppContext;

const DEFAULT_STATUS: &str = "pendente";

#[derive(Deserialize)]
struct CreateTaskBody {
    titulo: Option<String>,
    descricao: Option<String>,
    status: Option<String>,
}

/// Update bodies accept any subset of the three mutable fields; unknown
/// fields are ignored.
#[derive(Deserialize)]
struct UpdateTaskBody {
    titulo: Option<String>,
    descricao: Option<String>,
    status: Option<String>,
}

pub async fn get(ctx: &AppContext, route: RoutePath) -> Result<Response, ApiError> {
    match route {
        RoutePath::Collection => {
            let tasks = ctx.storage.list_tasks().await?;
            Ok(Json(tasks).into_response())
        }
        RoutePath::Item(id) => match ctx.storage.get_task(id).await? {
            Some(task) => Ok(Json(task).into_response()),
            None => Err(ApiError::TaskNotFound),
        },
        RoutePath::InvalidId => Err(ApiError::InvalidId),
        RoutePath::UnknownResource => Err(ApiError::RouteNotFound),
    }
}

pub async fn post(ctx: &AppContext, route: RoutePath, body: &[u8]) -> Result<Response, ApiError> {
    // Creation is only addressable on the collection path.
    if route != RoutePath::Collection {
        return Err(ApiError::RouteNotFound);
    }

    let parsed: CreateTaskBody = serde_json::from_slice(body)
        .map_err(|e| ApiError::validation_with_details("invalid JSON body", e.to_string()))?;
    let titulo = match parsed.titulo.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Err(ApiError::validation_with_details(
                "missing required field",
                "\"titulo\" must be a non-empty string",
            ))
        }
    };
    let status = parsed.status.as_deref().unwrap_or(DEFAULT_STATUS);

    let task = ctx
        .storage
        .create_task(titulo, parsed.descricao.as_deref(), status)
        .await?;
    Ok((StatusCode::CREATED, Json(task)).into_response())
}

pub async fn put(ctx: &AppContext, route: RoutePath, body: &[u8]) -> Result<Response, ApiError> {
    let id = match route {
        RoutePath::Item(id) => id,
        // A missing or malformed id on an update is a bad request, not an
        // unknown route.
        RoutePath::Collection | RoutePath::InvalidId => return Err(ApiError::InvalidId),
        RoutePath::UnknownResource => return Err(ApiError::RouteNotFound),
    };

    let parsed: UpdateTaskBody = serde_json::from_slice(body)
        .map_err(|e| ApiError::validation_with_details("invalid JSON body", e.to_string()))?;
    let patch = TaskPatch {
        titulo: parsed.titulo,
        descricao: parsed.descricao,
        status: parsed.status,
    };
    if patch.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }

    if ctx.storage.update_task(id, &patch).await? {
        Ok(Json(json!({ "message": "task updated" })).into_response())
    } else {
        Err(ApiError::TaskNotFound)
    }
}

pub async fn delete(ctx: &AppContext, route: RoutePath) -> Result<Response, ApiError> {
    let id = match route {
        RoutePath::Item(id) => id,
        RoutePath::Collection | RoutePath::InvalidId | RoutePath::UnknownResource => {
            return Err(ApiError::RouteNotFound)
        }
    };

    if ctx.storage.delete_task(id).await? {
        Ok(Json(json!({ "message": "task deleted" })).into_response())
    } else {
        Err(ApiError::TaskNotFound)
    }
}
