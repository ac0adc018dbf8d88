//! Track registry
//!
//! Validates track descriptors and assigns stable identities. Registration is
//! all-or-nothing per batch: the first path that fails the existence check
//! rejects the whole submission, naming the offending absolute path.

use crate::error::{Error, Result};
use crate::track::{Track, TrackId};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Caller-supplied track descriptor, before validation
#[derive(Debug, Clone)]
pub struct TrackInput {
    /// Path to a local audio file; relative paths are resolved against the
    /// process working directory
    pub file_path: String,

    /// Display title
    pub title: String,

    /// Optional display artist
    pub artist: Option<String>,
}

/// Assigns identities to validated track batches
///
/// Ids are `<batch-timestamp-millis>-<batch-seq>-<index>`: the batch counter
/// is process-wide monotonic, so repeated submissions of the same files in
/// the same process never collide.
pub struct TrackRegistry {
    batch_seq: AtomicU64,
}

impl TrackRegistry {
    /// Create a new registry
    pub fn new() -> Self {
        Self {
            batch_seq: AtomicU64::new(0),
        }
    }

    /// Validate a batch of descriptors and assign ids.
    ///
    /// All paths are checked before any track is created, so a failure
    /// mid-batch never leaves partial registrations behind. No file content
    /// is read here; the lazy loader does that on first play.
    pub async fn register_batch(&self, inputs: Vec<TrackInput>) -> Result<Vec<Track>> {
        if inputs.is_empty() {
            return Err(Error::BadRequest("track batch is empty".into()));
        }

        // Validate every path first (all-or-nothing)
        let mut resolved: Vec<(PathBuf, TrackInput)> = Vec::with_capacity(inputs.len());
        for input in inputs {
            let path = absolutize(Path::new(&input.file_path))?;
            check_readable(&path).await?;
            resolved.push((path, input));
        }

        let batch = self.batch_seq.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Utc::now().timestamp_millis();

        let tracks: Vec<Track> = resolved
            .into_iter()
            .enumerate()
            .map(|(index, (file_path, input))| Track {
                id: TrackId(format!("{}-{}-{}", stamp, batch, index)),
                file_path,
                title: input.title,
                artist: input.artist,
                source: None,
            })
            .collect();

        info!("Registered batch {} with {} tracks", batch, tracks.len());
        Ok(tracks)
    }
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a possibly relative path against the working directory
fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(path))
    }
}

/// Verify the file exists and is readable without reading its content
async fn check_readable(path: &Path) -> Result<()> {
    let meta = tokio::fs::metadata(path).await.map_err(|e| {
        debug!("Validation failed for {}: {}", path.display(), e);
        Error::Validation {
            path: path.to_path_buf(),
        }
    })?;

    if !meta.is_file() {
        return Err(Error::Validation {
            path: path.to_path_buf(),
        });
    }

    // Opening read-only proves readability; the handle is dropped unread
    tokio::fs::File::open(path).await.map_err(|e| {
        debug!("Open failed for {}: {}", path.display(), e);
        Error::Validation {
            path: path.to_path_buf(),
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"audio bytes").unwrap();
        path
    }

    fn input(path: &Path, title: &str) -> TrackInput {
        TrackInput {
            file_path: path.to_string_lossy().to_string(),
            title: title.to_string(),
            artist: None,
        }
    }

    #[tokio::test]
    async fn registers_valid_batch_with_unique_ids() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.mp3");
        let b = write_file(&dir, "b.mp3");

        let registry = TrackRegistry::new();
        let tracks = registry
            .register_batch(vec![input(&a, "A"), input(&b, "B")])
            .await
            .unwrap();

        assert_eq!(tracks.len(), 2);
        assert_ne!(tracks[0].id, tracks[1].id);
        assert!(tracks.iter().all(|t| t.source.is_none()));
        assert!(tracks.iter().all(|t| t.file_path.is_absolute()));
    }

    #[tokio::test]
    async fn rejects_whole_batch_naming_the_missing_path() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.mp3");
        let missing = dir.path().join("missing.mp3");
        let c = write_file(&dir, "c.mp3");

        let registry = TrackRegistry::new();
        let err = registry
            .register_batch(vec![input(&a, "A"), input(&missing, "B"), input(&c, "C")])
            .await
            .unwrap_err();

        match err {
            Error::Validation { path } => assert_eq!(path, missing),
            other => panic!("expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejects_directories() {
        let dir = TempDir::new().unwrap();

        let registry = TrackRegistry::new();
        let err = registry
            .register_batch(vec![input(dir.path(), "Dir")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn rejects_empty_batch() {
        let registry = TrackRegistry::new();
        let err = registry.register_batch(vec![]).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn ids_stay_unique_across_repeated_batches() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.mp3");

        let registry = TrackRegistry::new();
        let mut seen = HashSet::new();
        for _ in 0..5 {
            let tracks = registry
                .register_batch(vec![input(&a, "A")])
                .await
                .unwrap();
            assert!(seen.insert(tracks[0].id.clone()), "duplicate id assigned");
        }
    }
}
