//! Offline pipeline (ingestion, similarity, artifact) and the request-time
//! recommender built on its output.
pub mod artifact;
pub mod ingestion;
pub mod recommender;
pub mod similarity;

pub use artifact::{Artifact, ArtifactMetadata};
pub use ingestion::{read_events, RatingMatrix};
pub use recommender::Recommender;
pub use similarity::SimilarityTable;
