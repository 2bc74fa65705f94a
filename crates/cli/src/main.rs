use anyhow::Context;
use bookshelf_app::{
    modules::books::{seed, store::SqliteCatalogStore},
    Application,
};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Run and manage the bookshelf catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Fill the catalog with generated sample books
    Seed {
        /// Number of books to insert
        #[arg(long, default_value_t = 100)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookshelf-cli starting");

    // Bootstrapping applies migrations, which is all `migrate` needs.
    let app = Application::bootstrap(settings).await?;

    match cli.command {
        Command::Serve => app.run_until(bookshelf_http::shutdown_signal()).await?,
        Command::Migrate => {
            println!("migrations applied");
        }
        Command::Seed { count } => {
            let store = SqliteCatalogStore::new(app.database().pool().clone());
            let written = seed::seed(&store, count)
                .await
                .context("failed to seed catalog")?;
            println!("seeded {} books", written);
        }
    }

    Ok(())
}
