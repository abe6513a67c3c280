use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shelf_http::error::AppError;

use super::catalog::BookCatalog;
use super::models::{Book, BookRequest};

type Catalog = State<Arc<BookCatalog>>;

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub book_rating: i64,
}

#[derive(Debug, Deserialize)]
pub struct PublishDateQuery {
    pub publish_date: i64,
}

/// GET /books
pub async fn read_all_books(State(catalog): Catalog) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(catalog.list_all().await?))
}

/// GET /books/{book_id}
pub async fn read_book(
    State(catalog): Catalog,
    book_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(book_id) = book_id?;
    Ok(Json(catalog.get(book_id).await?))
}

/// GET /books/?book_rating=
pub async fn read_books_by_rating(
    State(catalog): Catalog,
    query: Result<Query<RatingQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(query) = query?;
    Ok(Json(catalog.by_rating(query.book_rating).await?))
}

/// GET /books/publish/?publish_date=
pub async fn read_books_by_publish_date(
    State(catalog): Catalog,
    query: Result<Query<PublishDateQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(query) = query?;
    Ok(Json(catalog.by_published_date(query.publish_date).await?))
}

/// POST /create_book
pub async fn create_book(
    State(catalog): Catalog,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = body?;
    catalog.create(request).await?;
    Ok(StatusCode::CREATED)
}

/// PUT /books/update_book
pub async fn update_book(
    State(catalog): Catalog,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = body?;
    catalog.update(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /books/{book_id}
pub async fn delete_book(
    State(catalog): Catalog,
    book_id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(book_id) = book_id?;
    catalog.delete(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
