pub mod aggregation;
pub mod matrix;
pub mod popularity;
pub mod ranking;
pub mod similarity;

use crate::models::{Interaction, ProductId, UserId};
use matrix::{IdIndex, UserItemMatrix};
use similarity::SimilarityMatrix;

pub const DEFAULT_NEIGHBORS: usize = 5;

/// User-based collaborative filtering over one batch of interactions.
///
/// Immutable once fitted; a new batch means a new model.
#[derive(Debug, Clone)]
pub struct UserBasedCf {
    matrix: UserItemMatrix,
    similarity: SimilarityMatrix,
    neighbors: usize,
}

impl UserBasedCf {
    /// Aggregates, builds the matrix and the similarity table.
    /// Returns `None` when there is nothing to train on.
    pub fn fit(interactions: &[Interaction], neighbors: usize) -> Option<Self> {
        let affinities = aggregation::aggregate(interactions);
        let matrix = UserItemMatrix::build(&affinities)?;
        let similarity = SimilarityMatrix::compute(matrix.scores());

        Some(Self {
            matrix,
            similarity,
            neighbors,
        })
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.matrix.users().contains(&user_id)
    }

    /// Unseen products ranked from the user's neighborhood, at most `n`.
    /// `None` means the user is not part of this model.
    pub fn recommend(&self, user_id: UserId, n: usize) -> Option<Vec<ProductId>> {
        let row = self.matrix.users().position(&user_id)?;

        let neighbors = ranking::select_neighbors(&self.similarity.row(row), row, self.neighbors);
        let candidates = ranking::score_candidates(self.matrix.scores(), &neighbors);
        let own: Vec<f64> = self.matrix.scores().row(row).iter().copied().collect();

        let products = self.matrix.products();
        Some(
            ranking::rank_unseen(&candidates, &own, n)
                .into_iter()
                .filter_map(|col| products.id(col))
                .collect(),
        )
    }

    /// Neighbor user ids with their similarity, most similar first.
    pub fn similar_users(&self, user_id: UserId, k: usize) -> Option<Vec<(UserId, f64)>> {
        let row = self.matrix.users().position(&user_id)?;
        let similarities = self.similarity.row(row);

        Some(
            ranking::select_neighbors(&similarities, row, k)
                .into_iter()
                .filter_map(|i| self.matrix.users().id(i).map(|id| (id, similarities[i])))
                .collect(),
        )
    }

    pub fn matrix(&self) -> &UserItemMatrix {
        &self.matrix
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn users(&self) -> &IdIndex<UserId> {
        self.matrix.users()
    }

    pub fn products(&self) -> &IdIndex<ProductId> {
        self.matrix.products()
    }

    pub fn neighbors(&self) -> usize {
        self.neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;

    fn purchase(user: i64, product: i64) -> Interaction {
        Interaction::new(UserId(user), ProductId(product), EventType::Purchase)
    }

    fn view(user: i64, product: i64) -> Interaction {
        Interaction::new(UserId(user), ProductId(product), EventType::View)
    }

    fn three_user_log() -> Vec<Interaction> {
        vec![purchase(1, 1), purchase(2, 1), purchase(2, 2), view(3, 3)]
    }

    #[test]
    fn test_fit_on_empty_log_is_none() {
        assert!(UserBasedCf::fit(&[], DEFAULT_NEIGHBORS).is_none());
    }

    #[test]
    fn test_fit_shapes() {
        let model = UserBasedCf::fit(&three_user_log(), DEFAULT_NEIGHBORS).unwrap();
        assert_eq!(model.matrix().shape(), (3, 3));
        assert_eq!(model.similarity().dim(), 3);
        assert!(model.knows_user(UserId(3)));
        assert!(!model.knows_user(UserId(4)));
    }

    #[test]
    fn test_recommends_neighbor_purchase_first() {
        let model = UserBasedCf::fit(&three_user_log(), DEFAULT_NEIGHBORS).unwrap();

        assert_eq!(model.recommend(UserId(1), 1), Some(vec![ProductId(2)]));
        assert_eq!(
            model.recommend(UserId(1), 5),
            Some(vec![ProductId(2), ProductId(3)])
        );
    }

    #[test]
    fn test_unknown_user_is_none() {
        let model = UserBasedCf::fit(&three_user_log(), DEFAULT_NEIGHBORS).unwrap();
        assert!(model.recommend(UserId(42), 5).is_none());
        assert!(model.similar_users(UserId(42), 5).is_none());
    }

    #[test]
    fn test_user_who_saw_everything_gets_nothing() {
        let log = vec![purchase(1, 1), purchase(1, 2), view(2, 1)];
        let model = UserBasedCf::fit(&log, DEFAULT_NEIGHBORS).unwrap();
        assert_eq!(model.recommend(UserId(1), 5), Some(vec![]));
    }

    #[test]
    fn test_neighborhood_is_capped() {
        // User 1 shares product 1 with users 2..=7; only the first five
        // (by similarity, then row order) contribute.
        let mut log = vec![purchase(1, 1)];
        for user in 2..=7 {
            log.push(purchase(user, 1));
            log.push(view(user, 100 + user));
        }
        let model = UserBasedCf::fit(&log, DEFAULT_NEIGHBORS).unwrap();

        let similar = model.similar_users(UserId(1), DEFAULT_NEIGHBORS).unwrap();
        assert_eq!(similar.len(), 5);
        assert_eq!(similar[0].0, UserId(2));

        let recs = model.recommend(UserId(1), 3).unwrap();
        assert_eq!(recs, vec![ProductId(102), ProductId(103), ProductId(104)]);
        // User 7's product has no neighbor support but is still unseen.
        let all = model.recommend(UserId(1), 10).unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all.last(), Some(&ProductId(107)));
    }

    #[test]
    fn test_never_recommends_seen_products() {
        let log = vec![
            purchase(1, 1),
            view(1, 2),
            purchase(2, 1),
            purchase(2, 2),
            purchase(2, 3),
            view(3, 2),
            purchase(3, 4),
        ];
        let model = UserBasedCf::fit(&log, DEFAULT_NEIGHBORS).unwrap();

        for user in [1, 2, 3] {
            let recs = model.recommend(UserId(user), 10).unwrap();
            for product in recs {
                assert_eq!(model.matrix().score(UserId(user), product), 0.0);
            }
        }
    }
}
