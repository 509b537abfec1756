use crate::error::RecResult;
use crate::models::*;
use crate::services::recommendation::RecommendationService;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

pub const TOTAL_REQUESTS: &str = "total_requests";
pub const PERSONALIZED: &str = "personalized";
pub const POPULARITY: &str = "popularity";
pub const EMPTY: &str = "empty";
pub const FAILED: &str = "failed";

/// Request-facing wrapper that keeps serving counters.
pub struct ServingService {
    recommendation_service: Arc<RecommendationService>,
    serving_stats: Arc<DashMap<&'static str, u64>>,
}

impl ServingService {
    pub fn new(recommendation_service: Arc<RecommendationService>) -> Self {
        Self {
            recommendation_service,
            serving_stats: Arc::new(DashMap::new()),
        }
    }

    pub async fn serve_recommendations(&self, user_id: UserId, n: usize) -> RecResult<Recommendations> {
        self.increment_stat(TOTAL_REQUESTS);
        let start_time = std::time::Instant::now();

        let response = match self.recommendation_service.recommend(user_id, n).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to get recommendations for user {}: {}", user_id, e);
                self.increment_stat(FAILED);
                return Err(e);
            }
        };

        self.increment_stat(match response.source {
            RecommendationSource::Personalized => PERSONALIZED,
            RecommendationSource::Popularity => POPULARITY,
        });
        if response.is_empty() {
            self.increment_stat(EMPTY);
        }

        info!(
            "Served {} recommendations for user {} in {}ms",
            response.products.len(),
            user_id,
            start_time.elapsed().as_millis()
        );
        Ok(response)
    }

    pub async fn serve_popular(&self, n: usize) -> RecResult<Vec<Product>> {
        self.increment_stat(TOTAL_REQUESTS);
        self.recommendation_service.popular(n).await.map_err(|e| {
            error!("Failed to get popular products: {}", e);
            self.increment_stat(FAILED);
            e
        })
    }

    fn increment_stat(&self, key: &'static str) {
        *self.serving_stats.entry(key).or_insert(0) += 1;
    }

    pub fn stat(&self, key: &str) -> u64 {
        self.serving_stats.get(key).map(|v| *v).unwrap_or(0)
    }

    pub fn get_serving_stats(&self) -> HashMap<String, u64> {
        self.serving_stats
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect()
    }
}
