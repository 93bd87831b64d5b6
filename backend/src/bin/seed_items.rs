//! Stock the market database from a JSON seed file.
//!
//! ```text
//! seed-items --database-url postgres://market@localhost/market --file fixtures/items.json
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use market::outbound::persistence::{DbPool, DieselItemRepository, PoolConfig, run_migrations};
use market::seeding::seed_items_from_file;

#[derive(Debug, Parser)]
#[command(name = "seed-items", about = "Stock the market from a JSON item list")]
struct Cli {
    /// PostgreSQL connection string.
    #[arg(long, env = "MARKET_DATABASE_URL")]
    database_url: String,
    /// JSON file holding `[{name, price, barcode, description}]`.
    #[arg(long)]
    file: PathBuf,
    /// Leave the schema as it is instead of applying pending migrations.
    #[arg(long)]
    skip_migrations: bool,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> io::Result<()> {
    if !cli.skip_migrations {
        run_migrations(&cli.database_url)
            .await
            .map_err(io::Error::other)?;
    }
    let pool = DbPool::new(PoolConfig::new(cli.database_url))
        .await
        .map_err(io::Error::other)?;
    let items = DieselItemRepository::new(pool);
    let report = seed_items_from_file(&cli.file, &items)
        .await
        .map_err(io::Error::other)?;
    println!(
        "stocked {} item(s), {} already present",
        report.inserted, report.skipped
    );
    Ok(())
}
