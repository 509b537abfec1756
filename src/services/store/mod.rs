pub mod postgres;

pub use postgres::PgStore;

use crate::error::RecResult;
use crate::models::*;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Read side of the interaction log and product catalog.
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    /// All interactions, or only those at or after `since`.
    async fn interactions(&self, since: Option<DateTime<Utc>>) -> RecResult<Vec<Interaction>>;

    /// Catalog rows for the given ids. Unknown ids are skipped; order is unspecified.
    async fn products(&self, ids: &[ProductId]) -> RecResult<Vec<Product>>;

    /// Number of purchase events per product that has at least one.
    async fn purchase_counts(&self) -> RecResult<Vec<(ProductId, u64)>>;
}

/// Inputs and outputs of the daily sales roll-up.
#[async_trait::async_trait]
pub trait SalesStore: Send + Sync {
    async fn purchases(&self) -> RecResult<Vec<PurchaseRow>>;

    /// Inserts or replaces summaries keyed by `sale_date`.
    async fn upsert_sales_summaries(&self, summaries: &[SalesSummary]) -> RecResult<()>;

    /// Stored summaries ordered by date.
    async fn sales_summaries(&self) -> RecResult<Vec<SalesSummary>>;
}

/// Process-local store backing tests, benches and demos.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    interactions: RwLock<Vec<Interaction>>,
    products: RwLock<HashMap<ProductId, Product>>,
    summaries: RwLock<BTreeMap<chrono::NaiveDate, SalesSummary>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(products: Vec<Product>, interactions: Vec<Interaction>) -> Self {
        let store = Self::new();
        store.add_products(products);
        store.add_interactions(interactions);
        store
    }

    pub fn add_products(&self, products: impl IntoIterator<Item = Product>) {
        let mut catalog = self.products.write();
        for product in products {
            catalog.insert(product.product_id, product);
        }
    }

    pub fn add_interactions(&self, interactions: impl IntoIterator<Item = Interaction>) {
        self.interactions.write().extend(interactions);
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.read().len()
    }
}

#[async_trait::async_trait]
impl InteractionStore for InMemoryStore {
    async fn interactions(&self, since: Option<DateTime<Utc>>) -> RecResult<Vec<Interaction>> {
        let log = self.interactions.read();
        Ok(match since {
            Some(cutoff) => log.iter().filter(|i| i.timestamp >= cutoff).cloned().collect(),
            None => log.clone(),
        })
    }

    async fn products(&self, ids: &[ProductId]) -> RecResult<Vec<Product>> {
        let catalog = self.products.read();
        Ok(ids.iter().filter_map(|id| catalog.get(id).cloned()).collect())
    }

    async fn purchase_counts(&self) -> RecResult<Vec<(ProductId, u64)>> {
        let mut counts: BTreeMap<ProductId, u64> = BTreeMap::new();
        for interaction in self.interactions.read().iter() {
            if interaction.event_type == EventType::Purchase {
                *counts.entry(interaction.product_id).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl SalesStore for InMemoryStore {
    async fn purchases(&self) -> RecResult<Vec<PurchaseRow>> {
        let catalog = self.products.read();
        Ok(self
            .interactions
            .read()
            .iter()
            .filter(|i| i.event_type == EventType::Purchase)
            .filter_map(|i| {
                catalog.get(&i.product_id).map(|p| PurchaseRow {
                    sale_date: i.timestamp.date_naive(),
                    price: p.price,
                    user_id: i.user_id,
                })
            })
            .collect())
    }

    async fn upsert_sales_summaries(&self, summaries: &[SalesSummary]) -> RecResult<()> {
        let mut stored = self.summaries.write();
        for summary in summaries {
            stored.insert(summary.sale_date, summary.clone());
        }
        Ok(())
    }

    async fn sales_summaries(&self) -> RecResult<Vec<SalesSummary>> {
        Ok(self.summaries.read().values().cloned().collect())
    }
}
