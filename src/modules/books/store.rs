//! Persistence for book records.

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use time::OffsetDateTime;

use super::models::{Book, BookPayload, NewBook};
use crate::utils::escape_like;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Book catalog operations. Every call runs on a pooled connection that is
/// returned to the pool when the call completes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All books, ordered by id.
    async fn list(&self) -> StoreResult<Vec<Book>>;

    async fn get(&self, id: i64) -> StoreResult<Book>;

    async fn create(&self, book: NewBook) -> StoreResult<Book>;

    /// Replace the mutable fields; `id` and `create_time` are kept.
    async fn update(&self, id: i64, changes: BookPayload) -> StoreResult<Book>;

    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Books whose title or author contains `keyword`, ignoring case.
    async fn search(&self, keyword: &str) -> StoreResult<Vec<Book>>;
}

/// SQLite-backed [`CatalogStore`] over the `books` table.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, price, description, create_time
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn get(&self, id: i64) -> StoreResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, price, description, create_time
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let create_time = book.create_time.unwrap_or_else(OffsetDateTime::now_utc);

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, price, description, create_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, title, author, price, description, create_time
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.price)
        .bind(&book.description)
        .bind(create_time)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(book_id = created.id, "book created");
        Ok(created)
    }

    async fn update(&self, id: i64, changes: BookPayload) -> StoreResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = ?1, author = ?2, price = ?3, description = ?4
            WHERE id = ?5
            RETURNING id, title, author, price, description, create_time
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(changes.price)
        .bind(&changes.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        tracing::debug!(book_id = id, "book updated");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(book_id = id, "book deleted");
        Ok(())
    }

    async fn search(&self, keyword: &str) -> StoreResult<Vec<Book>> {
        // SQLite's lower() and LIKE fold ASCII only.
        let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, price, description, create_time
            FROM books
            WHERE lower(title) LIKE ?1 ESCAPE '\'
               OR lower(author) LIKE ?1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
