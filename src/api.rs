//! HTTP API for the configuration UI, mounted under `/api`.
//!
//! | Route                        | Effect                                   |
//! |------------------------------|------------------------------------------|
//! | `GET /api/funcs`             | function catalog                         |
//! | `GET /api/nodes`             | current node tree                        |
//! | `POST /api/nodes`            | import a node tree, store it on success  |
//! | `POST /api/profile?profile=` | switch profile and import its tree       |
//!
//! A rejected node tree answers 400 with
//! `{"error": "Invalid Nodetree", "node", "type", "message"}`.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::import::NodeTreeImportError;
use crate::program::{Program, ProgramError};
use crate::types::{NodeTreeOut, SchemaOut};

/// Error surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  InvalidNodetree(NodeTreeImportError),
  #[error(transparent)]
  Internal(ProgramError),
}

impl From<ProgramError> for ApiError {
  fn from(e: ProgramError) -> Self {
    match e {
      ProgramError::Import(e) => ApiError::InvalidNodetree(e),
      other => ApiError::Internal(other),
    }
  }
}

impl From<NodeTreeImportError> for ApiError {
  fn from(e: NodeTreeImportError) -> Self {
    ApiError::InvalidNodetree(e)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::InvalidNodetree(e) => (
        StatusCode::BAD_REQUEST,
        Json(json!({
          "error": "Invalid Nodetree",
          "node": e.node_id,
          "type": e.node_type,
          "message": e.to_string(),
        })),
      )
        .into_response(),
      ApiError::Internal(e) => {
        warn!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({
            "error": "Internal Error",
            "message": e.to_string(),
          })),
        )
          .into_response()
      }
    }
  }
}

#[derive(Debug, Deserialize)]
struct ProfileQuery {
  profile: u32,
}

async fn read_funcs(State(program): State<Arc<Program>>) -> Json<SchemaOut> {
  Json(program.catalog().clone())
}

async fn read_nodes(State(program): State<Arc<Program>>) -> Json<NodeTreeOut> {
  Json(program.export_nodetree().await)
}

async fn save_nodes(
  State(program): State<Arc<Program>>,
  Json(tree): Json<NodeTreeOut>,
) -> Result<StatusCode, ApiError> {
  program.save_nodetree(&tree).await?;
  Ok(StatusCode::OK)
}

async fn select_profile(
  State(program): State<Arc<Program>>,
  Query(query): Query<ProfileQuery>,
) -> Result<Json<Option<u32>>, ApiError> {
  Ok(Json(program.select_profile(query.profile).await?))
}

/// Builds the application router with every route nested under `/api`.
pub fn router(program: Arc<Program>) -> Router {
  let api = Router::new()
    .route("/funcs", get(read_funcs))
    .route("/nodes", get(read_nodes).post(save_nodes))
    .route("/profile", post(select_profile))
    .with_state(program);

  Router::new()
    .nest("/api", api)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}
