pub mod keys;
pub mod models;
pub mod routes;
pub mod seed;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_cache::ReadThrough;
use bookshelf_kernel::{InitCtx, Migration, Module};
use utoipa::OpenApi;

use routes::{BooksApi, BooksState};
use store::{CatalogStore, SqliteCatalogStore};

pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            price REAL NOT NULL,
            description TEXT,
            create_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS ix_books_title ON books (title);
        CREATE INDEX IF NOT EXISTS ix_books_author ON books (author);
        "#,
}];

/// Book catalog: CRUD and search over the `books` table with an optional
/// read-through cache in front of the read endpoints.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: Arc<dyn CatalogStore>, cache: ReadThrough) -> Self {
        Self {
            state: BooksState { store, cache },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            cache = self.state.cache.backend(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(BooksApi::openapi()) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(module = self.name(), error = %e, "failed to render OpenAPI document");
                None
            }
        }
    }

    fn migrations(&self) -> Vec<Migration> {
        MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over a SQLite pool
pub fn create_module(pool: sqlx::SqlitePool, cache: ReadThrough) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(
        Arc::new(SqliteCatalogStore::new(pool)),
        cache,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn openapi_fragment_lists_book_routes() {
        let module = BooksModule::new(
            Arc::new(SqliteCatalogStore::new(
                sqlx::SqlitePool::connect_lazy("sqlite::memory:").unwrap(),
            )),
            ReadThrough::disabled(),
        );

        let document = module.openapi().unwrap();
        for path in ["/", "/search", "/{id}"] {
            assert!(document["paths"][path].is_object(), "missing {}", path);
        }
        assert!(document["paths"]["/{id}"]["delete"].is_object());
        assert!(document["components"]["schemas"]["Book"].is_object());
    }
}
