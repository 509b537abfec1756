use anyhow::Result;
use clap::Parser;
use shoprec::services::{etl::run_etl, store::PgStore};
use shoprec::{init_tracing, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Roll purchase events up into daily sales summaries", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing().await;

    info!("Starting ShopRec sales ETL");

    let config = Config::load_or_default(&args.config)?;
    let store = PgStore::connect(&config.postgres).await?;
    store.ensure_schema().await?;

    let days = run_etl(&store).await?;
    info!("Sales ETL finished, {} days written", days);

    Ok(())
}
