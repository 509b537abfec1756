use super::matrix::IdIndex;
use crate::models::{EventType, Interaction, ProductId};
use std::cmp::Ordering;

/// Purchase counts keyed by their own product table.
///
/// The table only holds products with at least one purchase and is unrelated
/// to the column order of any trained user-item matrix.
#[derive(Debug, Clone, Default)]
pub struct PopularityRanking {
    products: IdIndex<ProductId>,
    counts: Vec<u64>,
}

impl PopularityRanking {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (ProductId, u64)>,
    {
        let mut ranking = Self::default();
        for (product_id, count) in counts {
            ranking.add(product_id, count);
        }
        ranking
    }

    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        Self::from_counts(
            interactions
                .iter()
                .filter(|i| i.event_type == EventType::Purchase)
                .map(|i| (i.product_id, 1)),
        )
    }

    fn add(&mut self, product_id: ProductId, count: u64) {
        if count == 0 {
            return;
        }
        let position = self.products.insert(product_id);
        if position == self.counts.len() {
            self.counts.push(count);
        } else {
            self.counts[position] += count;
        }
    }

    pub fn count(&self, product_id: ProductId) -> u64 {
        self.products
            .position(&product_id)
            .map(|p| self.counts[p])
            .unwrap_or(0)
    }

    /// Most purchased first; ties go to the lower product id.
    pub fn top(&self, n: usize) -> Vec<ProductId> {
        let mut ranked: Vec<(ProductId, u64)> = self
            .products
            .ids()
            .iter()
            .copied()
            .zip(self.counts.iter().copied())
            .collect();

        ranked.sort_by(|a, b| match b.1.cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        ranked.into_iter().take(n).map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
