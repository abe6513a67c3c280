pub mod catalog;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use shelf_kernel::{settings::CatalogSettings, InitCtx, Module};

use catalog::BookCatalog;
use store::{BookStore, InMemoryBookStore};

/// Books module: the in-memory catalog and its HTTP surface
pub struct BooksModule {
    catalog: Arc<BookCatalog>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self {
            catalog: Arc::new(BookCatalog::new(store)),
        }
    }

    /// Build the module from catalog settings
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        let store = if settings.seed_samples {
            InMemoryBookStore::seeded(settings.id_policy)
        } else {
            InMemoryBookStore::new(settings.id_policy)
        };
        Self::new(Arc::new(store))
    }

    pub fn catalog(&self) -> &Arc<BookCatalog> {
        &self.catalog
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    // Public paths are served from the root, not under /api/books.
    fn base_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.catalog.count().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            id_policy = ?ctx.settings.catalog.id_policy,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books", get(handlers::read_all_books))
            .route("/books/", get(handlers::read_books_by_rating))
            .route("/books/publish/", get(handlers::read_books_by_publish_date))
            .route("/books/update_book", put(handlers::update_book))
            .route(
                "/books/{book_id}",
                get(handlers::read_book).delete(handlers::delete_book),
            )
            .route("/create_book", post(handlers::create_book))
            .with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.catalog.count().await?;
        tracing::info!(
            module = self.name(),
            books,
            "books module stopped; catalog discarded"
        );
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn books_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/Book" }
                }
            }
        }
    })
}

fn integer_parameter(
    name: &str,
    location: &str,
    minimum: i64,
    maximum: Option<i64>,
) -> serde_json::Value {
    let mut schema = json!({ "type": "integer", "format": "int64", "minimum": minimum });
    if let Some(maximum) = maximum {
        schema["maximum"] = json!(maximum);
    }
    json!({
        "name": name,
        "in": location,
        "required": true,
        "schema": schema
    })
}

fn book_request_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookRequest" },
                "example": {
                    "title": "title",
                    "author": "author",
                    "description": "description",
                    "rating": 5,
                    "published_date": 2029
                }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let text = |description: &str| {
        json!({ "type": "string", "minLength": 3, "maxLength": 100, "description": description })
    };

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List all books",
                    "tags": ["Books"],
                    "responses": { "200": books_response("All books in insertion order") }
                }
            },
            "/books/": {
                "get": {
                    "summary": "Filter books by rating",
                    "tags": ["Books"],
                    "parameters": [integer_parameter("book_rating", "query", 1, Some(5))],
                    "responses": {
                        "200": books_response("Books with the given rating"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/books/publish/": {
                "get": {
                    "summary": "Filter books by publication year",
                    "tags": ["Books"],
                    "parameters": [integer_parameter("publish_date", "query", 1901, Some(2031))],
                    "responses": {
                        "200": books_response("Books published in the given year"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/books/{book_id}": {
                "get": {
                    "summary": "Get a book by id",
                    "tags": ["Books"],
                    "parameters": [integer_parameter("book_id", "path", 1, None)],
                    "responses": {
                        "200": {
                            "description": "The book",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                },
                "delete": {
                    "summary": "Delete a book by id",
                    "tags": ["Books"],
                    "parameters": [integer_parameter("book_id", "path", 1, None)],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/books/update_book": {
                "put": {
                    "summary": "Replace a book",
                    "tags": ["Books"],
                    "requestBody": book_request_body(),
                    "responses": {
                        "204": { "description": "Book replaced" },
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/create_book": {
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_request_body(),
                    "responses": {
                        "201": { "description": "Book created" },
                        "422": error_response("Validation error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64", "minimum": 1 },
                        "title": text("Title of the book"),
                        "author": text("Author of the book"),
                        "description": text("Short description"),
                        "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                        "published_date": { "type": "integer", "minimum": 1900, "maximum": 2031 }
                    },
                    "required": ["id", "title", "author", "description", "rating"]
                },
                "BookRequest": {
                    "type": "object",
                    "properties": {
                        "id": {
                            "type": "integer",
                            "format": "int64",
                            "description": "Ignored on create, required on update"
                        },
                        "title": text("Title of the book"),
                        "author": text("Author of the book"),
                        "description": text("Short description"),
                        "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                        "published_date": { "type": "integer", "minimum": 1900, "maximum": 2031 }
                    },
                    "required": ["title", "author", "description", "rating"]
                }
            }
        }
    })
}

/// Create the books module from catalog settings
pub fn create_module(settings: &CatalogSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::from_settings(settings))
}
