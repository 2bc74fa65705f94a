pub mod books;

use bookshelf_cache::ReadThrough;
use bookshelf_db::Database;
use bookshelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    database: &Database,
    cache: ReadThrough,
) -> anyhow::Result<()> {
    registry.register(books::create_module(database.pool().clone(), cache))?;
    Ok(())
}
