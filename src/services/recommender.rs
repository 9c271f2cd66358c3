use crate::{
    error::{AppError, AppResult},
    models::{ItemCatalog, Recommendation},
    services::{
        artifact::{Artifact, ArtifactMetadata},
        similarity::SimilarityTable,
    },
};

/// Serves item-to-item recommendations from a loaded artifact
///
/// Built once at startup and shared read-only between request handlers.
#[derive(Debug, Clone)]
pub struct Recommender {
    metadata: ArtifactMetadata,
    catalog: ItemCatalog,
    similarity: SimilarityTable,
}

impl From<Artifact> for Recommender {
    fn from(artifact: Artifact) -> Self {
        Self {
            metadata: artifact.metadata,
            catalog: artifact.catalog,
            similarity: artifact.similarity,
        }
    }
}

impl Recommender {
    /// Returns up to `n` items most similar to `item_id`, best first
    ///
    /// The queried item itself is never part of the result. Equal scores keep
    /// the similarity table's column order, i.e. the order in which items
    /// first appeared in the raw log.
    pub fn recommend(&self, item_id: &str, n: usize) -> AppResult<Vec<Recommendation>> {
        let row = self
            .similarity
            .row(item_id)
            .ok_or_else(|| AppError::ItemNotFound(item_id.to_string()))?;

        let mut ranked: Vec<(&String, f64)> = self
            .similarity
            .items()
            .iter()
            .zip(row.iter().copied())
            .filter(|(candidate, _)| candidate.as_str() != item_id)
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);

        tracing::debug!(
            item = item_id,
            requested = n,
            returned = ranked.len(),
            "Recommendations ranked"
        );

        Ok(ranked
            .into_iter()
            .map(|(item, score)| Recommendation {
                item_id: item.clone(),
                score,
            })
            .collect())
    }

    /// The full item catalog in persisted order
    pub fn list_items(&self) -> &[String] {
        self.catalog.items()
    }

    pub fn search_items(&self, pattern: &str) -> Vec<String> {
        self.catalog.search(pattern)
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Behaviour, Event};

    fn recommender(events: &[Event]) -> Recommender {
        Recommender::from(Artifact::build(events))
    }

    fn ids(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|rec| rec.item_id.as_str()).collect()
    }

    #[test]
    fn test_single_user_example() {
        let recommender = recommender(&[Event::play("U1", "A", 10.0), Event::play("U1", "B", 30.0)]);

        let recs = recommender.recommend("A", 1).unwrap();
        assert_eq!(
            recs,
            vec![Recommendation {
                item_id: "B".to_string(),
                score: 1.0
            }]
        );
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let recommender = recommender(&[Event::play("U1", "A", 1.0)]);

        let err = recommender.recommend("nonexistent-id", 5).unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound(id) if id == "nonexistent-id"));
    }

    #[test]
    fn test_catalog_only_item_is_not_found() {
        // Purchased but never played: listed, but absent from the similarity table.
        let recommender = recommender(&[
            Event::new("U1", "Shelfware", Behaviour::Purchase, Some(1.0)),
            Event::play("U1", "A", 1.0),
        ]);

        assert_eq!(recommender.list_items(), ["Shelfware", "A"]);
        assert!(matches!(
            recommender.recommend("Shelfware", 3),
            Err(AppError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_results_sorted_descending_without_self() {
        let recommender = recommender(&[
            Event::play("U1", "A", 5.0),
            Event::play("U1", "B", 5.0),
            Event::play("U2", "A", 1.0),
            Event::play("U2", "C", 9.0),
            Event::play("U3", "D", 2.0),
        ]);

        let recs = recommender.recommend("A", 10).unwrap();
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|rec| rec.item_id != "A"));
        assert!(recs.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert_eq!(ids(&recs), ["B", "C", "D"]);
        assert_eq!(recs[2].score, 0.0);
    }

    #[test]
    fn test_n_limits_and_zero_returns_nothing() {
        let recommender = recommender(&[
            Event::play("U1", "A", 1.0),
            Event::play("U1", "B", 1.0),
            Event::play("U1", "C", 1.0),
        ]);

        assert_eq!(recommender.recommend("A", 1).unwrap().len(), 1);
        assert!(recommender.recommend("A", 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let recommender = recommender(&[
            Event::play("U1", "C", 1.0),
            Event::play("U1", "A", 1.0),
            Event::play("U1", "B", 1.0),
            Event::play("U1", "D", 1.0),
        ]);

        let recs = recommender.recommend("A", 3).unwrap();
        assert_eq!(ids(&recs), ["C", "B", "D"]);
    }

    #[test]
    fn test_search_items_matches_substring_ignoring_case() {
        let recommender = recommender(&[
            Event::play("U1", "Left 4 Dead 2", 1.0),
            Event::play("U1", "Dota 2", 1.0),
            Event::play("U1", "Left 4 Dead", 1.0),
        ]);

        assert_eq!(recommender.search_items("LEFT"), ["Left 4 Dead 2", "Left 4 Dead"]);
        assert_eq!(recommender.search_items("").len(), 3);
        assert!(recommender.search_items("zelda").is_empty());
    }
}
