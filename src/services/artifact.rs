use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, PipelineResult},
    models::{Event, ItemCatalog},
    services::{
        ingestion::{read_events, RatingMatrix},
        similarity::{SimilarityTable, StoredTable},
    },
};

/// Bincode configuration shared by writer and reader
fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Provenance of a built artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub built_at: DateTime<Utc>,
    /// Raw rows read from the log
    pub events: usize,
    pub play_events: usize,
    pub users: usize,
    /// Ratings that survived deduplication and filtering
    pub ratings: usize,
}

/// Everything the serving process needs, produced once by the offline build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub metadata: ArtifactMetadata,
    pub catalog: ItemCatalog,
    pub similarity: SimilarityTable,
}

/// Decoded form of [`Artifact`]; field order must match it
#[derive(Serialize, Deserialize)]
struct StoredArtifact {
    metadata: ArtifactMetadata,
    catalog: ItemCatalog,
    similarity: StoredTable,
}

impl TryFrom<StoredArtifact> for Artifact {
    type Error = PipelineError;

    fn try_from(stored: StoredArtifact) -> Result<Self, Self::Error> {
        Ok(Self {
            metadata: stored.metadata,
            catalog: stored.catalog,
            similarity: SimilarityTable::try_from(stored.similarity)?,
        })
    }
}

impl Artifact {
    /// Runs the offline pipeline over already parsed events
    pub fn build(events: &[Event]) -> Self {
        let catalog = ItemCatalog::from_events(events);
        let matrix = RatingMatrix::from_events(events);
        let similarity = SimilarityTable::from_ratings(&matrix);

        let metadata = ArtifactMetadata {
            built_at: Utc::now(),
            events: events.len(),
            play_events: events.iter().filter(|event| event.is_play()).count(),
            users: matrix.users().len(),
            ratings: matrix.nnz(),
        };

        Self {
            metadata,
            catalog,
            similarity,
        }
    }

    /// Reads the raw log at `path` and runs the offline pipeline over it
    pub fn build_from_path(path: &Path) -> PipelineResult<Self> {
        let events = read_events(path)?;
        Ok(Self::build(&events))
    }

    /// Writes the artifact, creating parent directories as needed
    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        bincode_options()
            .serialize_into(&mut writer, self)
            .map_err(|source| PipelineError::Serialise {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %path.display(),
            items = self.similarity.len(),
            catalog = self.catalog.len(),
            "Artifact written"
        );

        Ok(())
    }

    /// Reads an artifact back
    ///
    /// Undecodable bytes yield [`PipelineError::Deserialise`]; a decodable
    /// table with the wrong shape or duplicate ids yields
    /// [`PipelineError::CorruptArtifact`].
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let file = File::open(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stored: StoredArtifact = bincode_options()
            .deserialize_from(BufReader::new(file))
            .map_err(|source| PipelineError::Deserialise {
                path: path.to_path_buf(),
                source,
            })?;
        let artifact = Self::try_from(stored)?;

        tracing::info!(
            path = %path.display(),
            items = artifact.similarity.len(),
            catalog = artifact.catalog.len(),
            built_at = %artifact.metadata.built_at,
            "Artifact loaded"
        );

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Behaviour;

    fn sample_events() -> Vec<Event> {
        vec![
            Event::new("U1", "Portal", Behaviour::Purchase, Some(1.0)),
            Event::play("U1", "Dota 2", 10.0),
            Event::play("U1", "Portal", 30.0),
            Event::play("U2", "Dota 2", 5.0),
            Event::play("U2", "Dota 2", 50.0),
        ]
    }

    #[test]
    fn test_build_collects_metadata() {
        let artifact = Artifact::build(&sample_events());

        assert_eq!(artifact.metadata.events, 5);
        assert_eq!(artifact.metadata.play_events, 4);
        assert_eq!(artifact.metadata.users, 2);
        assert_eq!(artifact.metadata.ratings, 3);
        assert_eq!(artifact.catalog.items(), ["Portal", "Dota 2"]);
        assert_eq!(artifact.similarity.items(), ["Portal", "Dota 2"]);
    }

    #[test]
    fn test_save_then_load_preserves_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recommender.bin");
        let artifact = Artifact::build(&sample_events());

        artifact.save(&path).unwrap();
        let loaded = Artifact::load(&path).unwrap();

        assert_eq!(loaded, artifact);
        assert_eq!(loaded.similarity.position("Dota 2"), Some(1));
    }

    #[test]
    fn test_build_from_path_reads_raw_log() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"U1,A,play,10.0,0\nU1,B,play,30.0,0\n").unwrap();

        let artifact = Artifact::build_from_path(file.path()).unwrap();
        assert_eq!(artifact.similarity.score("A", "B"), Some(1.0));
    }

    #[test]
    fn test_load_missing_artifact_fails() {
        let err = Artifact::load(Path::new("/nonexistent/recommender.bin")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_load_shape_corrupt_table_is_corrupt_artifact() {
        let artifact = Artifact::build(&sample_events());
        let stored = StoredArtifact {
            metadata: artifact.metadata,
            catalog: artifact.catalog,
            similarity: StoredTable {
                items: vec!["Portal".to_string(), "Dota 2".to_string()],
                scores: vec![1.0, 0.5, 0.5],
            },
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        bincode_options()
            .serialize_into(file.as_file(), &stored)
            .unwrap();

        let err = Artifact::load(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::CorruptArtifact(_)), "got {err:?}");
    }

    #[test]
    fn test_load_garbage_fails_to_deserialise() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an artifact").unwrap();

        let err = Artifact::load(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Deserialise { .. }));
    }
}
