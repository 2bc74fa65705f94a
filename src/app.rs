//! Application assembly: settings in, running service out.

use std::future::Future;

use anyhow::Context;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A fully wired service: database open, modules registered and
/// initialized, migrations applied.
pub struct Application {
    settings: Settings,
    database: Database,
    registry: ModuleRegistry,
}

impl Application {
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let database = Database::connect(&settings.database)
            .await
            .context("failed to open catalog database")?;
        let cache = bookshelf_cache::build(&settings.cache).await;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &database, cache)?;

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;

        let applied = database
            .run_migrations(&registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "database migrations complete");

        Ok(Self {
            settings,
            database,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The complete HTTP router for every registered module
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Start modules, serve HTTP until `shutdown` resolves, then stop
    /// modules and close the database.
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_modules(&ctx).await?;

        let served = bookshelf_http::serve(self.router(), &self.settings, shutdown).await;

        self.registry.stop_modules().await?;
        self.database.close().await;

        served
    }
}
