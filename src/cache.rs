//! Cache-key derivation and the batch processing manifest.
//!
//! Every transform contributes a byte sequence to a rolling
//! [`CacheKeyDigest`]; the finished hex digest identifies one decoded-and-
//! transformed variant. Two requests with equal parameters produce
//! byte-for-byte identical digests, so a caller-side cache can reuse the
//! stored output; any parameter difference changes the digest and lands in
//! a separate slot.
//!
//! # Cache keys
//!
//! Lookups in the batch manifest are **content-addressed**: an output is
//! current when both hashes still match, not when a timestamp says so.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` (which resets
//!   modification times).
//!
//! - **`params_hash`**: the finished [`CacheKeyDigest`] of the request's
//!   transform chain. If any transform parameter changes, the params hash
//!   changes and the image is re-processed.
//!
//! The manifest is a JSON file at `<output_dir>/.easel-manifest.json`,
//! living alongside the processed images so it travels with the output
//! directory when cached in CI. A missing, corrupt, or version-mismatched
//! manifest loads as empty and every image is re-processed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Name of the manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".easel-manifest.json";

/// Version of the manifest format. Bump to invalidate all existing
/// manifests when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// Rolling digest accumulating cache-key contributions from a chain of
/// transforms.
///
/// Contributions are order-sensitive: a chain `[A, B]` and a chain `[B, A]`
/// finish to different keys. Text contributions use UTF-8, the one fixed
/// encoding, so keys match across platforms.
pub struct CacheKeyDigest {
    hasher: Sha256,
}

impl CacheKeyDigest {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Feed raw bytes into the digest.
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Feed a string as UTF-8 bytes.
    pub fn update_str(&mut self, text: &str) {
        self.hasher.update(text.as_bytes());
    }

    /// Finish the digest and return it as a hex string.
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl Default for CacheKeyDigest {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 of a byte slice as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of a file's contents as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

/// A single cached output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk manifest mapping output paths (relative to the output
/// directory) to the hashes they were produced from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchManifest {
    pub version: u32,
    pub entries: HashMap<String, ManifestEntry>,
}

impl BatchManifest {
    /// Create an empty manifest (used for `--no-cache` or a first run).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Whether the recorded output is still current: an entry exists for
    /// this output path, both hashes match, and the file is on disk.
    pub fn is_current(
        &self,
        output_rel: &str,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> bool {
        match self.entries.get(output_rel) {
            Some(entry) => {
                entry.source_hash == source_hash
                    && entry.params_hash == params_hash
                    && output_dir.join(output_rel).exists()
            }
            None => false,
        }
    }

    /// Record an output file and the hashes it was produced from.
    pub fn insert(&mut self, output_rel: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            output_rel,
            ManifestEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// Summary of manifest performance for a batch run.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    pub failures: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn failure(&mut self) {
        self.failures += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.failures
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} processed ({} total)",
                self.hits,
                self.misses,
                self.total()
            )?;
        } else {
            write!(f, "{} processed", self.misses)?;
        }
        if self.failures > 0 {
            write!(f, ", {} failed", self.failures)?;
        }
        Ok(())
    }
}
