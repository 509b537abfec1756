use anyhow::Result;
use clap::Parser;
use shoprec::{api::create_router, init_tracing, AppState, Config};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::env::set_var("RUST_LOG", &args.log_level);

    let config = Config::load_or_default(&args.config)?;

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: Config) -> Result<()> {
    init_tracing().await;
    info!("Starting ShopRec Recommendation Server with config: {:?}", config.server);

    let addr = config.server.socket_addr()?;
    let state = AppState::new(config).await?;

    // A store outage at boot leaves the model untrained; requests fall back to
    // popular products until a retrain succeeds.
    match state.training_service.retrain().await {
        Ok(status) => info!("Initial training finished: {:?}", status),
        Err(e) => warn!("Initial training failed, serving popularity only: {}", e),
    }
    state.training_service.start_retrain_worker();

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
