pub mod algorithms;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::Config;
pub use crate::error::{RecError, RecResult};
pub use crate::models::*;

use services::store::{InteractionStore, PgStore, SalesStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub interaction_store: Arc<dyn InteractionStore>,
    pub sales_store: Arc<dyn SalesStore>,
    pub training_service: Arc<services::training::TrainingService>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
    pub serving_service: Arc<services::serving::ServingService>,
}

impl AppState {
    /// Connects to PostgreSQL and wires the services. The model starts untrained.
    pub async fn new(config: Config) -> RecResult<Self> {
        let store = Arc::new(PgStore::connect(&config.postgres).await?);
        store.ensure_schema().await?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store<S>(config: Config, store: Arc<S>) -> Self
    where
        S: InteractionStore + SalesStore + 'static,
    {
        let config = Arc::new(config);
        let interaction_store: Arc<dyn InteractionStore> = store.clone();
        let sales_store: Arc<dyn SalesStore> = store;

        let training_service = Arc::new(services::training::TrainingService::new(
            interaction_store.clone(),
            config.clone(),
        ));

        let recommendation_service = Arc::new(services::recommendation::RecommendationService::new(
            interaction_store.clone(),
            training_service.clone(),
        ));

        let serving_service = Arc::new(services::serving::ServingService::new(
            recommendation_service.clone(),
        ));

        Self {
            config,
            interaction_store,
            sales_store,
            training_service,
            recommendation_service,
            serving_service,
        }
    }
}

pub async fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
