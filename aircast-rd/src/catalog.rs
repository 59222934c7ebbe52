//! Object catalog: the playable track list and its change detection
//!
//! A snapshot is the deterministic view of one bucket: keys filtered to
//! the audio suffix and sorted lexicographically, identified by a crc32
//! fingerprint over the exact ordered sequence. The playback loop compares
//! fingerprints to decide whether the playlist changed; an unchanged
//! catalog keeps the old snapshot (and the loop restarts it from the top).

use crate::error::{Error, Result};
use crate::storage::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Recognized audio object suffix
pub const AUDIO_SUFFIX: &str = ".mp3";

/// Immutable, ordered view of the playable objects in a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    tracks: Vec<String>,
    fingerprint: u32,
}

impl CatalogSnapshot {
    /// The empty catalog
    pub fn empty() -> Self {
        Self::from_keys(Vec::new())
    }

    /// Build a snapshot from raw bucket keys: filter to the audio suffix
    /// and sort for deterministic order
    pub fn from_keys(keys: Vec<String>) -> Self {
        let mut tracks: Vec<String> = keys
            .into_iter()
            .filter(|key| key.ends_with(AUDIO_SUFFIX))
            .collect();
        tracks.sort();
        let fingerprint = fingerprint(&tracks);
        Self {
            tracks,
            fingerprint,
        }
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Content-order-sensitive hash over the whole track list
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }
}

/// Stable hash over an ordered key sequence.
///
/// Keys are separated by a zero byte so adjacent keys cannot collide by
/// concatenation.
fn fingerprint(keys: &[String]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for key in keys {
        hasher.update(key.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Lists playable objects in one bucket and detects list changes
pub struct Catalog {
    storage: Arc<dyn ObjectStore>,
    bucket: String,
}

impl Catalog {
    pub fn new(storage: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { storage, bucket }
    }

    /// Current snapshot of the bucket.
    ///
    /// A failed listing is reported as the empty catalog: the playback
    /// loop idles and retries rather than aborting.
    pub async fn list(&self) -> CatalogSnapshot {
        match self.list_inner().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(bucket = %self.bucket, error = %e, "listing failed; treating catalog as empty");
                CatalogSnapshot::empty()
            }
        }
    }

    async fn list_inner(&self) -> Result<CatalogSnapshot> {
        let keys = self
            .storage
            .list_objects(&self.bucket)
            .await
            .map_err(|e| Error::Catalog(e.to_string()))?;
        Ok(CatalogSnapshot::from_keys(keys))
    }

    /// List again and compare fingerprints.
    ///
    /// Returns the fresh snapshot and `true` when the list changed,
    /// otherwise the caller's snapshot and `false`.
    pub async fn refresh_if_changed(&self, current: &CatalogSnapshot) -> (CatalogSnapshot, bool) {
        let fresh = self.list().await;
        if fresh.fingerprint() != current.fingerprint() {
            info!(tracks = fresh.len(), "track list changed, refreshing");
            (fresh, true)
        } else {
            debug!("track list unchanged, looping");
            (current.clone(), false)
        }
    }
}
