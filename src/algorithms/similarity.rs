use nalgebra::DMatrix;

/// Symmetric user x user cosine similarity table.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    values: DMatrix<f64>,
}

impl SimilarityMatrix {
    /// Cosine similarity of every pair of rows of `scores`.
    ///
    /// Each pair is computed once and mirrored, so `get(i, j) == get(j, i)`
    /// holds bit for bit. A non-zero row has similarity 1.0 with itself and
    /// every other entry is capped at 1.0; a zero row is 0.0 everywhere.
    pub fn compute(scores: &DMatrix<f64>) -> Self {
        let n = scores.nrows();
        let norms: Vec<f64> = (0..n).map(|i| scores.row(i).norm()).collect();
        let mut values = DMatrix::zeros(n, n);

        for i in 0..n {
            if norms[i] == 0.0 {
                continue;
            }
            values[(i, i)] = 1.0;

            for j in (i + 1)..n {
                if norms[j] == 0.0 {
                    continue;
                }
                let dot = scores.row(i).dot(&scores.row(j));
                let similarity = (dot / (norms[i] * norms[j])).min(1.0);
                values[(i, j)] = similarity;
                values[(j, i)] = similarity;
            }
        }

        Self { values }
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    pub fn row(&self, i: usize) -> Vec<f64> {
        self.values.row(i).iter().copied().collect()
    }

    pub fn dim(&self) -> usize {
        self.values.nrows()
    }
}
