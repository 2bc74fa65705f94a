//! SQLite connection pool and module migration runner.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use bookshelf_kernel::{settings::DatabaseSettings, Migration};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module TEXT NOT NULL,
        id TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Shared handle over the SQLite pool. Cloning is cheap.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and create if missing) the database described by `settings`.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        tracing::info!(target: "bookshelf-db", url = %settings.url, "opening SQLite database");

        let in_memory = settings.url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url: {}", settings.url))?
            .create_if_missing(true);

        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    create_parent_dir(parent).await?;
                }
            }
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        // Every connection to `:memory:` is its own database, so keep exactly one alive.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to SQLite database at: {}", settings.url))?;

        tracing::info!(target: "bookshelf-db", "SQLite connection established");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every migration not yet recorded in `schema_migrations`.
    /// Returns how many were applied.
    pub async fn run_migrations(&self, migrations: &[(String, Migration)]) -> Result<usize> {
        sqlx::query(MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create schema_migrations table")?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let exists: Option<(String,)> =
                sqlx::query_as("SELECT id FROM schema_migrations WHERE module = ?1 AND id = ?2")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(&self.pool)
                    .await?;

            if exists.is_some() {
                tracing::debug!(target: "bookshelf-db", module = %module, id = migration.id, "migration already applied");
                continue;
            }

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
            sqlx::query("INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(target: "bookshelf-db", module = %module, id = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn create_parent_dir(parent: &Path) -> Result<()> {
    tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("failed to create database directory: {}", parent.display()))
}
