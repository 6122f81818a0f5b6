//! HTTP handlers

use crate::acquire::ScrapeRequest;
use crate::catalog::CatalogError;
use crate::document::{url_from_id, Document};
use crate::server::AppState;
use crate::ZenoError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Error response with a JSON body
#[derive(Debug)]
pub struct ApiError(ZenoError);

impl<E: Into<ZenoError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ZenoError::InvalidUrl { .. } | ZenoError::EmptyId => StatusCode::BAD_REQUEST,
            ZenoError::Catalog(CatalogError::EmptyId) => StatusCode::BAD_REQUEST,
            ZenoError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ZenoError::Catalog(_) | ZenoError::Index(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Accepted {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub id: String,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn accept(
    state: &AppState,
    request: ScrapeRequest,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    let submitted = state.acquirer.submit(request)?;
    Ok((StatusCode::ACCEPTED, Json(Accepted { id: submitted.id })))
}

/// `GET /scrape?url=...&title=...&description=...&capture=true`
pub async fn scrape_query(
    State(state): State<AppState>,
    Query(request): Query<ScrapeRequest>,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    accept(&state, request)
}

/// `POST /scrape` with a JSON body
pub async fn scrape_json(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<(StatusCode, Json<Accepted>), ApiError> {
    accept(&state, request)
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let docs = state.acquirer.catalog().store().get_all()?;
    Ok(Json(docs))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.acquirer.catalog().store().get(&id)? {
        Some(doc) => Ok(Json(doc).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("No document {}", id) })),
        )
            .into_response()),
    }
}

async fn delete(state: &AppState, id: &str) -> Result<StatusCode, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ZenoError::EmptyId.into());
    }
    state.acquirer.catalog().delete(id).await?;
    let url = url_from_id(id).unwrap_or_else(|| id.to_string());
    tracing::info!("Deleted {}", url);
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /documents/:id`
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &id).await
}

/// `DELETE /documents` with a JSON record carrying the identifier
pub async fn delete_record(
    State(state): State<AppState>,
    Json(record): Json<DeleteRequest>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &record.id).await
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let results = state.search.search(&request.q, request.limit).await?;
    Ok(Json(results))
}

pub async fn health() -> &'static str {
    "ok"
}
