//! Batch processing: one preset over a directory of images.
//!
//! The demo pipeline behind `easel batch`. Walks the source directory for
//! supported images, fans the work out with [rayon](https://docs.rs/rayon)
//! (one [`BucketPool`] per worker), writes PNG outputs mirroring the
//! source layout, and keeps a manifest of `{source_hash, params_hash}`
//! per output so an unchanged input is skipped on the next run.
//!
//! Progress streams over an mpsc channel as [`BatchEvent`]s; the CLI
//! drains them on a printer thread.

use crate::cache::{self, BatchManifest, CacheStats};
use crate::loader::{LoadError, Loader, Preset};
use crate::pool::BucketPool;
use crate::request::CacheStrategy;
use crate::transform::TransformChain;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions the batch pipeline picks up, matching the decoders the
/// `image` crate has compiled in.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

/// Progress notification for one input file.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Processed { input: PathBuf, output: String },
    Cached { input: PathBuf, output: String },
    Failed { input: PathBuf, message: String },
}

/// Result of a batch run.
pub struct BatchResult {
    pub stats: CacheStats,
    /// Relative output paths that are now current (processed or cached).
    pub outputs: Vec<String>,
}

enum Outcome {
    Processed { output: String, source_hash: String },
    Cached { output: String, source_hash: String },
    Failed,
}

/// Process every supported image under `source_dir` with `preset`,
/// writing `<stem>-<preset>.png` files into `output_dir`.
///
/// The manifest only comes into play under a `strategy` that allows
/// caching decoded outputs; `use_cache: false` bypasses it regardless.
pub fn run(
    loader: &Loader,
    preset: Preset,
    source_dir: &Path,
    output_dir: &Path,
    use_cache: bool,
    strategy: CacheStrategy,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchResult, BatchError> {
    if !source_dir.is_dir() {
        return Err(BatchError::SourceNotFound(source_dir.to_path_buf()));
    }
    std::fs::create_dir_all(output_dir)?;

    let chain = TransformChain::new(preset.transforms(loader.config()));
    let params_hash = chain.cache_key();

    let manifest = if use_cache && strategy.caches_decoded() {
        BatchManifest::load(output_dir)
    } else {
        BatchManifest::empty()
    };

    let files = discover(source_dir);

    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map_init(BucketPool::default, |pool, input| {
            let output_rel = output_name(source_dir, input, preset);
            let send = |event: BatchEvent| {
                if let Some(tx) = &events {
                    // A dropped receiver just means nobody is listening.
                    let _ = tx.send(event);
                }
            };

            let source_hash = match cache::hash_file(input) {
                Ok(hash) => hash,
                Err(e) => {
                    send(BatchEvent::Failed {
                        input: input.clone(),
                        message: e.to_string(),
                    });
                    return Outcome::Failed;
                }
            };

            if manifest.is_current(&output_rel, &source_hash, &params_hash, output_dir) {
                send(BatchEvent::Cached {
                    input: input.clone(),
                    output: output_rel.clone(),
                });
                return Outcome::Cached {
                    output: output_rel,
                    source_hash,
                };
            }

            match process_one(loader, pool, input, &chain, strategy, output_dir, &output_rel) {
                Ok(()) => {
                    send(BatchEvent::Processed {
                        input: input.clone(),
                        output: output_rel.clone(),
                    });
                    Outcome::Processed {
                        output: output_rel,
                        source_hash,
                    }
                }
                Err(e) => {
                    send(BatchEvent::Failed {
                        input: input.clone(),
                        message: e.to_string(),
                    });
                    Outcome::Failed
                }
            }
        })
        .collect();

    let mut stats = CacheStats::default();
    let mut next_manifest = BatchManifest::empty();
    let mut outputs = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Processed {
                output,
                source_hash,
            } => {
                stats.miss();
                next_manifest.insert(output.clone(), source_hash, params_hash.clone());
                outputs.push(output);
            }
            Outcome::Cached {
                output,
                source_hash,
            } => {
                stats.hit();
                next_manifest.insert(output.clone(), source_hash, params_hash.clone());
                outputs.push(output);
            }
            Outcome::Failed => stats.failure(),
        }
    }
    outputs.sort();
    // Strategies that never cache decoded outputs leave any existing
    // manifest untouched.
    if strategy.caches_decoded() {
        next_manifest.save(output_dir)?;
    }

    Ok(BatchResult { stats, outputs })
}

#[derive(Error, Debug)]
enum ProcessError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn process_one(
    loader: &Loader,
    pool: &mut BucketPool,
    input: &Path,
    chain: &TransformChain,
    strategy: CacheStrategy,
    output_dir: &Path,
    output_rel: &str,
) -> Result<(), ProcessError> {
    let loaded = loader.load_chain(
        pool,
        Some(input),
        chain,
        loader.config().placeholder,
        (1, 1),
        strategy,
    )?;

    let output_path = output_dir.join(output_rel);
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    loaded.image.save(&output_path).map_err(|e| ProcessError::Encode {
        path: output_path.clone(),
        source: e,
    })?;
    Ok(())
}

/// Supported image files under `dir`, sorted for deterministic output.
fn discover(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_supported(path))
        .collect();
    files.sort();
    files
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

/// Relative output path for an input: the source-relative path with the
/// preset name appended and a `.png` extension.
fn output_name(source_dir: &Path, input: &Path, preset: Preset) -> String {
    let rel = input.strip_prefix(source_dir).unwrap_or(input);
    let stem = rel
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let parent = rel.parent().filter(|p| !p.as_os_str().is_empty());
    match parent {
        Some(parent) => format!("{}/{}-{}.png", parent.display(), stem, preset.name()),
        None => format!("{}-{}.png", stem, preset.name()),
    }
}
