use nalgebra::DMatrix;
use std::cmp::Ordering;

/// Orders (index, score) pairs by score descending, then index ascending.
fn by_score_then_index(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Picks the `k` rows most similar to `target`, never `target` itself.
pub fn select_neighbors(similarities: &[f64], target: usize, k: usize) -> Vec<usize> {
    let mut candidates: Vec<(usize, f64)> = similarities
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != target)
        .map(|(i, &s)| (i, s))
        .collect();

    candidates.sort_by(by_score_then_index);
    candidates.into_iter().take(k).map(|(i, _)| i).collect()
}

/// Column-wise sum of the neighbor rows.
pub fn score_candidates(scores: &DMatrix<f64>, neighbors: &[usize]) -> Vec<f64> {
    let mut totals = vec![0.0; scores.ncols()];

    for &row in neighbors {
        for (col, value) in scores.row(row).iter().enumerate() {
            totals[col] += value;
        }
    }

    totals
}

/// Ranks columns the user has not touched yet and keeps the first `n`.
///
/// Unseen columns stay eligible even when no neighbor scored them.
pub fn rank_unseen(candidate_scores: &[f64], own_scores: &[f64], n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = candidate_scores
        .iter()
        .zip(own_scores)
        .enumerate()
        .filter(|(_, (_, own))| **own == 0.0)
        .map(|(col, (&score, _))| (col, score))
        .collect();

    ranked.sort_by(by_score_then_index);
    ranked.into_iter().take(n).map(|(col, _)| col).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_exclude_self_and_break_ties_by_index() {
        let similarities = vec![0.5, 1.0, 0.5, 0.9, 0.0];
        assert_eq!(select_neighbors(&similarities, 1, 3), vec![3, 0, 2]);
        assert_eq!(select_neighbors(&similarities, 1, 10), vec![3, 0, 2, 4]);
    }

    #[test]
    fn test_neighbors_exclude_self_even_when_not_highest() {
        let similarities = vec![0.0, 0.0, 0.0];
        assert_eq!(select_neighbors(&similarities, 0, 5), vec![1, 2]);
    }

    #[test]
    fn test_score_candidates_sums_rows() {
        let scores = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 2.0, 0.0, 3.0, 1.0, 5.0, 5.0, 5.0]);
        assert_eq!(score_candidates(&scores, &[0, 1]), vec![1.0, 3.0, 3.0]);
        assert_eq!(score_candidates(&scores, &[]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rank_unseen_excludes_seen_columns() {
        let candidates = vec![9.0, 3.0, 3.0, 0.0];
        let own = vec![1.0, 0.0, 0.0, 0.0];

        assert_eq!(rank_unseen(&candidates, &own, 10), vec![1, 2, 3]);
        assert_eq!(rank_unseen(&candidates, &own, 1), vec![1]);
    }

    #[test]
    fn test_rank_unseen_empty_when_everything_seen() {
        let candidates = vec![4.0, 2.0];
        let own = vec![1.0, 3.0];
        assert!(rank_unseen(&candidates, &own, 5).is_empty());
    }
}
