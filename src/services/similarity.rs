use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{error::PipelineError, services::ingestion::RatingMatrix};

/// Symmetric item × item cosine similarity table
///
/// Scores are stored densely in row-major order; rows and columns share the
/// item order of the rating matrix they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "StoredTable")]
pub struct SimilarityTable {
    items: Vec<String>,
    index: HashMap<String, usize>,
    scores: Vec<f64>,
}

/// On-disk shape of a table; validated by [`SimilarityTable::from_parts`] when read back
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredTable {
    pub(crate) items: Vec<String>,
    pub(crate) scores: Vec<f64>,
}

impl TryFrom<StoredTable> for SimilarityTable {
    type Error = PipelineError;

    fn try_from(stored: StoredTable) -> Result<Self, Self::Error> {
        Self::from_parts(stored.items, stored.scores)
    }
}

impl From<SimilarityTable> for StoredTable {
    fn from(table: SimilarityTable) -> Self {
        Self {
            items: table.items,
            scores: table.scores,
        }
    }
}

impl SimilarityTable {
    /// Computes pairwise cosine similarity between all item rows
    ///
    /// Dot products are accumulated per user column, so only items sharing a
    /// player contribute work. The upper triangle is mirrored, which keeps the
    /// table exactly symmetric. An item whose row has zero norm scores 0.0
    /// against everything, itself included.
    pub fn from_ratings(matrix: &RatingMatrix) -> Self {
        let n = matrix.len();

        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); matrix.users().len()];
        for item in 0..n {
            for &(user, rating) in matrix.row(item) {
                columns[user].push((item, rating));
            }
        }

        let mut dots = vec![0.0f64; n * n];
        for column in &columns {
            for (a, &(i, r_i)) in column.iter().enumerate() {
                for &(j, r_j) in &column[a..] {
                    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
                    dots[lo * n + hi] += r_i * r_j;
                }
            }
        }

        let norms: Vec<f64> = (0..n).map(|i| dots[i * n + i].sqrt()).collect();

        // Only the upper triangle holds accumulated dots; normalize it in place
        // and mirror into the lower triangle.
        let mut scores = dots;
        for i in 0..n {
            scores[i * n + i] = if norms[i] == 0.0 { 0.0 } else { 1.0 };
            for j in (i + 1)..n {
                let sim = if norms[i] == 0.0 || norms[j] == 0.0 {
                    0.0
                } else {
                    // Rounding can push collinear rows just past 1.0
                    (scores[i * n + j] / (norms[i] * norms[j])).min(1.0)
                };
                scores[i * n + j] = sim;
                scores[j * n + i] = sim;
            }
        }

        tracing::info!(items = n, "Similarity table computed");

        Self {
            index: index_items(matrix.items()),
            items: matrix.items().to_vec(),
            scores,
        }
    }

    /// Reassembles a table from its persisted parts, validating shape and keys
    pub fn from_parts(items: Vec<String>, scores: Vec<f64>) -> Result<Self, PipelineError> {
        if scores.len() != items.len() * items.len() {
            return Err(PipelineError::CorruptArtifact(format!(
                "similarity table has {} scores for {} items",
                scores.len(),
                items.len()
            )));
        }

        let index = index_items(&items);
        if index.len() != items.len() {
            return Err(PipelineError::CorruptArtifact(
                "similarity table has duplicate item ids".to_string(),
            ));
        }

        Ok(Self {
            items,
            index,
            scores,
        })
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, item_id: &str) -> Option<usize> {
        self.index.get(item_id).copied()
    }

    /// Full row of scores for an item, in table column order
    pub fn row(&self, item_id: &str) -> Option<&[f64]> {
        let n = self.len();
        self.position(item_id)
            .map(|i| &self.scores[i * n..(i + 1) * n])
    }

    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let (i, j) = (self.position(a)?, self.position(b)?);
        Some(self.scores[i * self.len() + j])
    }
}

fn index_items(items: &[String]) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| (item.clone(), idx))
        .collect()
}
