use crate::models::{Interaction, ProductId, UserId};
use std::collections::BTreeMap;

/// Summed event weights per (user, product) pair.
///
/// Keyed by an ordered map so iteration order depends only on the set of
/// pairs, never on the order the interactions arrived in.
pub type AffinityMap = BTreeMap<(UserId, ProductId), u32>;

pub fn aggregate(interactions: &[Interaction]) -> AffinityMap {
    let mut affinities = AffinityMap::new();

    for interaction in interactions {
        *affinities
            .entry((interaction.user_id, interaction.product_id))
            .or_insert(0) += interaction.event_type.weight();
    }

    affinities
}
