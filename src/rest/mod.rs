// rest/mod.rs — Public HTTP API server.
//
// Axum server exposing task CRUD on {bind_address}:{port}.
//
// Endpoints:
//   GET     /tasks
//   POST    /tasks
//   GET     /tasks/{id}
//   PUT     /tasks/{id}
//   DELETE  /tasks/{id}
//   OPTIONS *            (CORS preflight)

pub mod error;
pub mod routes;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::AppContext;
use error::ApiError;

/// A parsed request path. Every method handler matches on this exhaustively,
/// so an unhandled combination of method and path cannot slip through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePath {
    /// `/tasks` — collection-level operations (list, create).
    Collection,
    /// `/tasks/{id}` — item-level operations (get, update, delete).
    Item(i64),
    /// `/tasks/{segment}` where the segment is not an integer.
    InvalidId,
    /// Empty path, or a first segment other than `tasks`.
    UnknownResource,
}

impl RoutePath {
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::UnknownResource,
            ["tasks"] => Self::Collection,
            // Only the second segment is significant; anything after it is ignored.
            ["tasks", id, ..] => match id.parse::<i64>() {
                Ok(n) => Self::Item(n),
                Err(_) => Self::InvalidId,
            },
            _ => Self::UnknownResource,
        }
    }
}

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("task API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

/// Assemble the router: one dispatch entry point for every method and path,
/// wrapped in a permissive CORS layer so every response carries
/// `Access-Control-Allow-Origin` and preflights are answered.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Parse the path, then hand off to the per-method handler. The router holds
/// no task state; everything durable lives behind `ctx.storage`.
async fn dispatch(
    State(ctx): State<Arc<AppContext>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let route = RoutePath::parse(uri.path());
    let result = match method {
        // Preflights with request headers are answered by the CORS layer;
        // a bare OPTIONS lands here and gets an empty 200.
        Method::OPTIONS => return StatusCode::OK.into_response(),
        Method::GET => routes::tasks::get(&ctx, route).await,
        Method::POST => routes::tasks::post(&ctx, route, &body).await,
        Method::PUT => routes::tasks::put(&ctx, route, &body).await,
        Method::DELETE => routes::tasks::delete(&ctx, route).await,
        _ => Err(ApiError::RouteNotFound),
    };
    result.unwrap_or_else(|e| e.into_response())
}

#[cfg(test)]
mod tests {
    use super::RoutePath;

    #[test]
    fn parses_collection_and_item_paths() {
        assert_eq!(RoutePath::parse("/tasks"), RoutePath::Collection);
        assert_eq!(RoutePath::parse("/tasks/"), RoutePath::Collection);
        assert_eq!(RoutePath::parse("/tasks/42"), RoutePath::Item(42));
        assert_eq!(RoutePath::parse("/tasks/42/extra"), RoutePath::Item(42));
    }

    #[test]
    fn parses_invalid_ids_and_unknown_resources() {
        assert_eq!(RoutePath::parse("/tasks/abc"), RoutePath::InvalidId);
        assert_eq!(RoutePath::parse("/tasks/1.5"), RoutePath::InvalidId);
        assert_eq!(RoutePath::parse(""), RoutePath::UnknownResource);
        assert_eq!(RoutePath::parse("/"), RoutePath::UnknownResource);
        assert_eq!(RoutePath::parse("/users"), RoutePath::UnknownResource);
        assert_eq!(RoutePath::parse("/users/1"), RoutePath::UnknownResource);
    }
}
