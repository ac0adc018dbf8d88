//! Lazy audio source resolution
//!
//! Resolves a track's file into a playable source the moment playback is
//! actually requested. The default mode reads the file fully and encodes it
//! as a base64 data URL; stream mode instead hands the player a relative URL
//! into the byte-range endpoint so bytes never leave the disk until the
//! player asks for them. The engine guards single-flight via
//! `PlayerState::loading_id` and caches the result on the track, so this
//! module stays a stateless resolve step.

use crate::config::{AdvisoryConfig, SourceMode};
use crate::error::{Error, Result};
use crate::media::mime_for_extension;
use crate::track::TrackSource;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::Path;
use tracing::{debug, warn};

/// MIME type used when the extension is unrecognized
const FALLBACK_MIME: &str = "audio/mpeg";

/// Result of a completed resolve
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// Playable source, cached on the track by the caller
    pub source: TrackSource,

    /// Non-fatal oversize advisory, when the policy flagged the payload
    pub advisory: Option<String>,
}

/// Resolves track files into playable sources
pub struct LazyLoader {
    advisory: AdvisoryConfig,
    mode: SourceMode,
}

impl LazyLoader {
    /// Create a loader with the given advisory policy and source mode
    pub fn new(advisory: AdvisoryConfig, mode: SourceMode) -> Self {
        Self { advisory, mode }
    }

    /// Resolve the file at `path` into a source per the configured mode.
    ///
    /// Fails with `Error::Load` when the file vanished or became unreadable
    /// since registration; the caller leaves the track unresolved so a later
    /// play attempt can retry.
    pub async fn resolve(&self, path: &Path) -> Result<ResolvedSource> {
        match self.mode {
            SourceMode::DataUrl => self.read_data_url(path).await,
            SourceMode::Stream => self.stream_url(path).await,
        }
    }

    /// Read the file and encode it as a `data:` URL
    async fn read_data_url(&self, path: &Path) -> Result<ResolvedSource> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mime = mime_for_extension(path).unwrap_or(FALLBACK_MIME);
        let encoded = BASE64.encode(&bytes);
        let data_url = format!("data:{};base64,{}", mime, encoded);

        debug!(
            "Loaded {} ({} bytes, {} encoded) as {}",
            path.display(),
            bytes.len(),
            encoded.len(),
            mime
        );

        let advisory = self.advisory_for(encoded.len() as u64, path);

        Ok(ResolvedSource {
            source: TrackSource::DataUrl(data_url),
            advisory,
        })
    }

    /// Point the player at the byte-range endpoint instead of embedding the
    /// bytes. The file is only checked for existence here; the range server
    /// does the actual reads on demand, so no advisory applies.
    async fn stream_url(&self, path: &Path) -> Result<ResolvedSource> {
        tokio::fs::metadata(path).await.map_err(|e| Error::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let url = format!("/audio?path={}", urlencoding::encode(&path.to_string_lossy()));
        debug!("Resolved {} as stream URL", path.display());

        Ok(ResolvedSource {
            source: TrackSource::StreamUrl(url),
            advisory: None,
        })
    }

    /// Attach the oversize advisory when the encoded payload crosses the
    /// configured threshold. Never an error; playback proceeds regardless.
    fn advisory_for(&self, encoded_len: u64, path: &Path) -> Option<String> {
        if !self.advisory.enabled || encoded_len <= self.advisory.threshold_bytes {
            return None;
        }
        warn!(
            "Encoded payload for {} is {} bytes (threshold {})",
            path.display(),
            encoded_len,
            self.advisory.threshold_bytes
        );
        Some(format!(
            "Encoded audio is {:.1} MiB; loading in the player may be slow",
            encoded_len as f64 / (1024.0 * 1024.0)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn loader(enabled: bool, threshold: u64) -> LazyLoader {
        LazyLoader::new(
            AdvisoryConfig {
                enabled,
                threshold_bytes: threshold,
            },
            SourceMode::DataUrl,
        )
    }

    fn stream_loader() -> LazyLoader {
        LazyLoader::new(AdvisoryConfig::default(), SourceMode::Stream)
    }

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    fn data_url(resolved: &ResolvedSource) -> &str {
        match &resolved.source {
            TrackSource::DataUrl(url) => url,
            other => panic!("expected data URL source, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn encodes_known_extension_with_its_mime() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "clip.wav", b"RIFFdata");

        let resolved = loader(true, u64::MAX).resolve(&path).await.unwrap();
        assert!(data_url(&resolved).starts_with("data:audio/wav;base64,"));
        assert!(resolved.advisory.is_none());
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_mpeg() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "clip.weird", b"bytes");

        let resolved = loader(true, u64::MAX).resolve(&path).await.unwrap();
        assert!(data_url(&resolved).starts_with("data:audio/mpeg;base64,"));
    }

    #[tokio::test]
    async fn payload_round_trips_through_base64() {
        let dir = TempDir::new().unwrap();
        let content = b"\x00\x01\x02binary audio\xff";
        let path = write_file(&dir, "clip.mp3", content);

        let resolved = loader(true, u64::MAX).resolve(&path).await.unwrap();
        let payload = data_url(&resolved).split(',').nth(1).unwrap().to_string();
        assert_eq!(BASE64.decode(payload).unwrap(), content);
    }

    #[tokio::test]
    async fn oversize_payload_gets_advisory_when_enabled() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "big.mp3", &vec![0u8; 1024]);

        // Threshold below the encoded size trips the advisory
        let resolved = loader(true, 16).resolve(&path).await.unwrap();
        assert!(resolved.advisory.is_some());

        // Disabled policy never attaches one
        let resolved = loader(false, 16).resolve(&path).await.unwrap();
        assert!(resolved.advisory.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.mp3");

        let err = loader(true, u64::MAX).resolve(&path).await.unwrap_err();
        match err {
            Error::Load { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Load error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stream_mode_yields_encoded_range_url() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "clip with space.mp3", b"bytes");

        let resolved = stream_loader().resolve(&path).await.unwrap();
        match &resolved.source {
            TrackSource::StreamUrl(url) => {
                assert!(url.starts_with("/audio?path="));
                // Path is percent-encoded, never raw
                assert!(!url.contains(' '));
                assert!(url.contains("clip%20with%20space.mp3"));
            }
            other => panic!("expected stream URL source, got {:?}", other),
        }
        assert!(resolved.advisory.is_none());
    }

    #[tokio::test]
    async fn stream_mode_never_embeds_bytes() {
        let dir = TempDir::new().unwrap();
        let content = b"should not appear in the url";
        let path = write_file(&dir, "clip.mp3", content);

        let resolved = stream_loader().resolve(&path).await.unwrap();
        let url = resolved.source.url();
        assert!(!url.contains(&BASE64.encode(content)));
    }

    #[tokio::test]
    async fn stream_mode_missing_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.mp3");

        let err = stream_loader().resolve(&path).await.unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
