use super::aggregation::AffinityMap;
use crate::models::{ProductId, UserId};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::hash::Hash;

/// Bijective id <-> position table.
///
/// Positions are handed out in first-seen order. The id type parameter keeps
/// user rows and product columns from being looked up in the wrong table.
#[derive(Debug, Clone)]
pub struct IdIndex<K> {
    ids: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K> Default for IdIndex<K> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> IdIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of `id`, assigning the next free one if unseen.
    pub fn insert(&mut self, id: K) -> usize {
        if let Some(&position) = self.positions.get(&id) {
            return position;
        }

        let position = self.ids.len();
        self.ids.push(id);
        self.positions.insert(id, position);
        position
    }

    pub fn position(&self, id: &K) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id(&self, position: usize) -> Option<K> {
        self.ids.get(position).copied()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.positions.contains_key(id)
    }

    pub fn ids(&self) -> &[K] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Dense users x products table of affinity scores.
#[derive(Debug, Clone)]
pub struct UserItemMatrix {
    users: IdIndex<UserId>,
    products: IdIndex<ProductId>,
    scores: DMatrix<f64>,
}

impl UserItemMatrix {
    /// Returns `None` for an empty affinity map.
    pub fn build(affinities: &AffinityMap) -> Option<Self> {
        if affinities.is_empty() {
            return None;
        }

        let mut users = IdIndex::new();
        let mut products = IdIndex::new();
        let mut cells = Vec::with_capacity(affinities.len());

        for (&(user_id, product_id), &score) in affinities {
            let row = users.insert(user_id);
            let col = products.insert(product_id);
            cells.push((row, col, score));
        }

        let mut scores = DMatrix::zeros(users.len(), products.len());
        for (row, col, score) in cells {
            scores[(row, col)] = f64::from(score);
        }

        Some(Self {
            users,
            products,
            scores,
        })
    }

    pub fn users(&self) -> &IdIndex<UserId> {
        &self.users
    }

    pub fn products(&self) -> &IdIndex<ProductId> {
        &self.products
    }

    pub fn scores(&self) -> &DMatrix<f64> {
        &self.scores
    }

    pub fn score(&self, user_id: UserId, product_id: ProductId) -> f64 {
        match (self.users.position(&user_id), self.products.position(&product_id)) {
            (Some(row), Some(col)) => self.scores[(row, col)],
            _ => 0.0,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.scores.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::aggregation::aggregate;
    use crate::models::{EventType, Interaction};

    #[test]
    fn test_id_index_is_bijective() {
        let mut index = IdIndex::new();
        assert_eq!(index.insert(UserId(42)), 0);
        assert_eq!(index.insert(UserId(7)), 1);
        assert_eq!(index.insert(UserId(42)), 0);

        assert_eq!(index.len(), 2);
        assert_eq!(index.position(&UserId(7)), Some(1));
        assert_eq!(index.id(1), Some(UserId(7)));
        assert_eq!(index.id(2), None);
        assert!(!index.contains(&UserId(8)));
    }

    #[test]
    fn test_empty_affinities_build_nothing() {
        assert!(UserItemMatrix::build(&AffinityMap::new()).is_none());
    }

    #[test]
    fn test_build_fills_scores_and_zeroes() {
        let log = vec![
            Interaction::new(UserId(1), ProductId(10), EventType::Purchase),
            Interaction::new(UserId(2), ProductId(20), EventType::View),
            Interaction::new(UserId(2), ProductId(10), EventType::AddToCart),
        ];
        let matrix = UserItemMatrix::build(&aggregate(&log)).unwrap();

        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.score(UserId(1), ProductId(10)), 3.0);
        assert_eq!(matrix.score(UserId(1), ProductId(20)), 0.0);
        assert_eq!(matrix.score(UserId(2), ProductId(10)), 2.0);
        assert_eq!(matrix.score(UserId(2), ProductId(20)), 1.0);
        assert_eq!(matrix.score(UserId(99), ProductId(10)), 0.0);
    }

    #[test]
    fn test_build_is_deterministic() {
        let log = vec![
            Interaction::new(UserId(5), ProductId(3), EventType::View),
            Interaction::new(UserId(1), ProductId(8), EventType::View),
            Interaction::new(UserId(5), ProductId(8), EventType::View),
        ];
        let mut shuffled = log.clone();
        shuffled.swap(0, 2);

        let a = UserItemMatrix::build(&aggregate(&log)).unwrap();
        let b = UserItemMatrix::build(&aggregate(&shuffled)).unwrap();

        assert_eq!(a.users().ids(), b.users().ids());
        assert_eq!(a.products().ids(), b.products().ids());
        assert_eq!(a.scores(), b.scores());
        // (1, 8) sorts first, so product 8 takes column 0.
        assert_eq!(a.users().ids(), &[UserId(1), UserId(5)]);
        assert_eq!(a.products().ids(), &[ProductId(8), ProductId(3)]);
    }
}
