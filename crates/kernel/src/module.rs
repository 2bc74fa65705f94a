use async_trait::async_trait;
use axum::Router;

/// What a module sees while the application is being assembled
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// One schema step. Each `id` is applied at most once per database and then
/// recorded in `schema_migrations`. Migrations run sorted by module name,
/// then by id, so prefix ids with a sequence number (`001_init`).
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    /// SQL script, may hold several statements
    pub up: &'static str,
}

/// A feature slice of the service (the book catalog is one). The registry
/// drives every module through the same sequence: `init`, migrations,
/// `start`, serving, then `stop` in reverse registration order.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique within the registry; also the mount point (`/{name}`) and the
    /// prefix of the module's OpenAPI paths
    fn name(&self) -> &'static str;

    /// Runs before any migration, so the schema may not exist yet
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to the mount point; `/` serves `/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with module-relative `paths` and `components.schemas`,
    /// merged into `/docs/openapi.json`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs once the schema is current, right before the listener opens
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server drained, before the database pool closes
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
