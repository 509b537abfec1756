use crate::algorithms::popularity::PopularityRanking;
use crate::error::RecResult;
use crate::models::*;
use crate::services::store::InteractionStore;
use crate::services::training::TrainingService;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answers per-user requests against whatever model is live at call time.
pub struct RecommendationService {
    store: Arc<dyn InteractionStore>,
    training: Arc<TrainingService>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn InteractionStore>, training: Arc<TrainingService>) -> Self {
        Self { store, training }
    }

    /// Personalized ranking for users known to the live model, popular
    /// products for everyone else. At most `n` products either way.
    pub async fn recommend(&self, user_id: UserId, n: usize) -> RecResult<Recommendations> {
        // Pin one state for the whole request so a concurrent retrain cannot
        // mix two generations.
        let state = self.training.current();

        let ranked = state
            .snapshot()
            .and_then(|snapshot| snapshot.model.recommend(user_id, n));

        let Some(product_ids) = ranked else {
            warn!(
                "User {} not found or model not trained. Returning popular products.",
                user_id
            );
            let products = self.popular(n).await?;
            return Ok(Recommendations {
                user_id,
                source: RecommendationSource::Popularity,
                products,
                generated_at: Utc::now(),
            });
        };

        let products = self.resolve(&product_ids).await?;
        info!(
            "Personalized {} products for user {} (generation {})",
            products.len(),
            user_id,
            state.generation()
        );

        Ok(Recommendations {
            user_id,
            source: RecommendationSource::Personalized,
            products,
            generated_at: Utc::now(),
        })
    }

    /// Most purchased products, at most `n`.
    pub async fn popular(&self, n: usize) -> RecResult<Vec<Product>> {
        let ranking = PopularityRanking::from_counts(self.store.purchase_counts().await?);
        let top = ranking.top(n);
        debug!("Popularity ranking over {} purchased products", ranking.len());
        self.resolve(&top).await
    }

    /// Catalog records for `ids`, in the order given. Ids without a catalog
    /// row are dropped.
    async fn resolve(&self, ids: &[ProductId]) -> RecResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<ProductId, Product> = self
            .store
            .products(ids)
            .await?
            .into_iter()
            .map(|p| (p.product_id, p))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| {
                let product = by_id.remove(id);
                if product.is_none() {
                    warn!("Product {} has interactions but no catalog record", id);
                }
                product
            })
            .collect())
    }
}
