//! Web server module for the bookshelf service.
//!
//! Provides the books CRUD HTTP API. Handlers validate input, resolve the
//! configured storage backend through the registry, and delegate to the
//! [`BookStore`] port; responses have the same shape regardless of which
//! backend served them.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use uuid::Uuid;

use crate::storage::{
    Book, BookFilter, BookPatch, BookStore, NewBook, StorageError, StoreRegistry,
};

/// Maximum length accepted for title/author fields.
const MAX_TEXT_LEN: usize = 255;

/// Default page size for listing.
const DEFAULT_LIMIT: u64 = 100;

/// Maximum page size for listing.
const MAX_LIMIT: u64 = 1000;

/// Shared application state.
///
/// This is the selector: it holds the registry plus the one configured
/// backend name, and every request resolves its store through
/// [`AppState::store`]. No other component inspects the backend selection.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<StoreRegistry>,
    backend: String,
}

impl AppState {
    /// Create state for the given registry and configured backend name.
    pub fn new(registry: Arc<StoreRegistry>, backend: impl Into<String>) -> Self {
        Self {
            registry,
            backend: backend.into(),
        }
    }

    /// Configured backend name.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Resolve the configured backend's store.
    pub fn store(&self) -> Result<Arc<dyn BookStore>, StorageError> {
        self.registry.resolve(&self.backend)
    }
}

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub error: String,
}

/// Storage failure mapped onto an HTTP response.
struct ApiError(StorageError);

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StorageError::NotFound => StatusCode::NOT_FOUND,
            StorageError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StorageError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StorageError::UnknownBackend(_) | StorageError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // Server-side failure detail goes to the log, not the client.
        let error = if status.is_server_error() {
            tracing::error!(error = %self.0, "Storage operation failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Input validation failure (422 before any storage work).
fn unprocessable(message: impl Into<String>) -> ApiError {
    ApiError(StorageError::Validation(message.into()))
}

// =============================================================================
// Request/response schemas
// =============================================================================

/// Body for `POST /books`.
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl CreateBookRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_text("title", &self.title)?;
        validate_text("author", &self.author)?;
        validate_year(self.year)
    }
}

/// Body for `PUT /books/{id}`. All fields optional.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

impl UpdateBookRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            validate_text("title", title)?;
        }
        if let Some(author) = &self.author {
            validate_text("author", author)?;
        }
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        Ok(())
    }

    fn into_patch(self) -> BookPatch {
        BookPatch {
            title: self.title,
            author: self.author,
            year: self.year,
        }
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(unprocessable(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(unprocessable(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_year(year: i32) -> Result<(), ApiError> {
    if !(0..=9999).contains(&year) {
        return Err(unprocessable("year must be between 0 and 9999"));
    }
    Ok(())
}

/// Query parameters for `GET /books`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Query parameters for `GET /books/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
}

// =============================================================================
// Router
// =============================================================================

/// Create the axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route("/books/search", get(search_books_handler))
        .route(
            "/books/{id}",
            get(get_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Service info endpoint.
async fn index_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "bookshelf",
        "status": "running",
        "configured_backend": state.backend(),
        "endpoints": {
            "health": "/health",
            "books": "/books",
            "search": "/books/search",
        },
    }))
}

/// Health check endpoint.
///
/// Resolves the configured store and runs its connectivity probe; an
/// unreachable or unregistered backend yields 503.
async fn health_handler(State(state): State<AppState>) -> Response {
    let store = match state.store() {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Backend resolution failed");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "configured_backend": state.backend(),
                    "error": e.to_string(),
                })),
            )
                .into_response();
        }
    };

    let report = store.health_check().await;
    let status = if report.status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if report.status.is_healthy() { "healthy" } else { "unhealthy" },
            "configured_backend": state.backend(),
            "database": report,
        })),
    )
        .into_response()
}

/// Create a new book.
async fn create_book_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    body.validate()?;
    let book = state
        .store()?
        .create(NewBook {
            title: body.title,
            author: body.author,
            year: body.year,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// List books with pagination.
async fn list_books_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let skip = params.skip.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(unprocessable(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    let books = state.store()?.list(skip, limit).await?;
    Ok(Json(books))
}

/// Search books by title fragment, author fragment, and/or exact year.
async fn search_books_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let filter = BookFilter {
        title: params.title.filter(|s| !s.is_empty()),
        author: params.author.filter(|s| !s.is_empty()),
        year: params.year,
    };

    let books = state.store()?.search(&filter).await?;
    Ok(Json(books))
}

/// Get a single book by id.
async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, ApiError> {
    let book = state.store()?.get(id).await?;
    Ok(Json(book))
}

/// Partially update a book by id.
async fn update_book_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateBookRequest>,
) -> Result<Json<Book>, ApiError> {
    body.validate()?;
    let book = state.store()?.update(id, body.into_patch()).await?;
    Ok(Json(book))
}

/// Delete a book by id.
async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store()?.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
