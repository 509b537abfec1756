use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use shoprec::services::simulator::{generate_interactions, generate_products, generate_users, rng_from};
use shoprec::services::store::PgStore;
use shoprec::{init_tracing, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Populate the store with synthetic products, users and interactions", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Overrides the configured seed for reproducible data.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing().await;

    let mut config = Config::load_or_default(&args.config)?;
    if args.seed.is_some() {
        config.simulator.seed = args.seed;
    }
    let sim = &config.simulator;
    info!("Simulator configuration: {:?}", sim);

    let store = PgStore::connect(&config.postgres).await?;
    store.ensure_schema().await?;

    let mut rng = rng_from(sim);

    let product_ids = store.insert_products(&generate_products(&mut rng, sim.num_products)).await?;
    info!("Inserted {} products.", product_ids.len());

    let user_ids = store.insert_users(&generate_users(&mut rng, sim.num_users)).await?;
    info!("Inserted {} users.", user_ids.len());

    let interactions = generate_interactions(
        &mut rng,
        &user_ids,
        &product_ids,
        sim.num_interactions,
        sim.history_days,
        Utc::now(),
    )?;
    store.insert_interactions(&interactions).await?;
    info!("Inserted {} interactions.", interactions.len());

    Ok(())
}
