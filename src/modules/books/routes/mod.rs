//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use bookshelf_cache::ReadThrough;
use bookshelf_http::error::AppError;
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use super::keys::BookCacheKey;
use super::models::{Book, BookPayload, DeleteResponse};
use super::store::{CatalogStore, StoreError};

/// Dependencies shared by every books handler
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn CatalogStore>,
    pub cache: ReadThrough,
}

#[derive(OpenApi)]
#[openapi(
    paths(list_books, search_books, get_book, create_book, update_book, delete_book),
    components(schemas(Book, BookPayload, DeleteResponse)),
    tags((name = "Books", description = "Book catalog"))
)]
pub struct BooksApi;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Substring to look for in title or author, case-insensitive
    pub keyword: String,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/search", get(search_books))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(state)
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => AppError::not_found(format!("book {} not found", id)),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

fn book_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn payload(body: Result<Json<BookPayload>, JsonRejection>) -> Result<BookPayload, AppError> {
    let Json(payload) = body.map_err(|rejection| match rejection {
        JsonRejection::JsonDataError(e) => AppError::validation(vec![], e.body_text()),
        other => AppError::bad_request(other.body_text()),
    })?;

    let problems = payload.validate();
    if !problems.is_empty() {
        return Err(AppError::validation(problems, "invalid book payload"));
    }

    Ok(payload)
}

/// Drop the cached entries a write can make stale: the listed keys plus
/// every search result.
async fn invalidate_written(cache: &ReadThrough, keys: &[BookCacheKey]) {
    cache.invalidate(keys).await;
    cache
        .invalidate_prefix(&BookCacheKey::search_namespace())
        .await;
}

/// Books health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    responses((status = 200, description = "All books", body = [Book]))
)]
async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<Book>>, AppError> {
    let books = state
        .cache
        .get_or_load(&BookCacheKey::List, || state.store.list())
        .await?;

    Ok(Json(books))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Books",
    params(SearchParams),
    responses(
        (status = 200, description = "Books whose title or author contains the keyword", body = [Book]),
        (status = 400, description = "Missing keyword")
    )
)]
async fn search_books(
    State(state): State<BooksState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(SearchParams { keyword }) =
        params.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let key = BookCacheKey::Search(keyword.clone());
    let books = state
        .cache
        .get_or_load(&key, || state.store.search(&keyword))
        .await?;

    Ok(Json(books))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
async fn get_book(
    State(state): State<BooksState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(id)?;
    let book = state
        .cache
        .get_or_load(&BookCacheKey::Book(id), || state.store.get(id))
        .await?;

    Ok(Json(book))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = BookPayload,
    responses(
        (status = 200, description = "The created book", body = Book),
        (status = 422, description = "Invalid payload")
    )
)]
async fn create_book(
    State(state): State<BooksState>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let payload = payload(body)?;
    let book = state.store.create(payload.into()).await?;

    invalidate_written(&state.cache, &[BookCacheKey::List]).await;
    tracing::info!(book_id = book.id, "book created");

    Ok(Json(book))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "The updated book", body = Book),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Invalid payload")
    )
)]
async fn update_book(
    State(state): State<BooksState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let id = book_id(id)?;
    let payload = payload(body)?;
    let book = state.store.update(id, payload).await?;

    invalidate_written(&state.cache, &BookCacheKey::written(id)).await;
    tracing::info!(book_id = id, "book updated");

    Ok(Json(book))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Deletion confirmation", body = DeleteResponse),
        (status = 404, description = "Book not found")
    )
)]
async fn delete_book(
    State(state): State<BooksState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = book_id(id)?;
    state.store.delete(id).await?;

    invalidate_written(&state.cache, &BookCacheKey::written(id)).await;
    tracing::info!(book_id = id, "book deleted");

    Ok(Json(DeleteResponse {
        message: "book deleted".to_string(),
    }))
}
