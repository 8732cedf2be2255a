//! # Easel
//!
//! Preset-driven image transformations. Easel turns a handful of named
//! presets — circular crop, bordered circle, plain border ring, rounded
//! corners, grayscale, blur, resize — into pure pixel operations over
//! decoded RGBA bitmaps, with pooled destination buffers and a
//! deterministic cache-key contract so callers can address transformed
//! variants content-wise.
//!
//! # Architecture
//!
//! Three layers, each usable on its own:
//!
//! ```text
//! 1. Transforms   RgbaImage → RgbaImage     (pure pixel work + key bytes)
//! 2. Loader       path + options → Loaded    (decode, chain, key hashes)
//! 3. Batch        directory → outputs        (rayon fan-out + manifest)
//! ```
//!
//! The separation exists for three reasons:
//!
//! - **Testability**: transforms are pure functions over in-memory
//!   bitmaps; the whole core is unit-tested without touching a disk.
//! - **Reuse**: callers with their own decode pipeline can use the
//!   transform layer directly and feed its key bytes into their own cache.
//! - **Ergonomics**: the loader presets mirror the way applications
//!   actually ask for images ("this avatar, circular, with a border").
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`transform`] | The transforms and the chain that applies them |
//! | [`pool`] | Destination-buffer reuse (`BitmapPool`, `BucketPool`) |
//! | [`cache`] | Rolling cache-key digest and the batch manifest |
//! | [`request`] | Request options, cache strategy, packed colors |
//! | [`config`] | Explicit loader configuration with TOML loading |
//! | [`loader`] | Decode + preset helpers returning bitmap and key hashes |
//! | [`batch`] | Parallel directory processing behind `easel batch` |
//!
//! # Design Decisions
//!
//! ## Values Over Builders
//!
//! Request configuration is a struct literal with named optional fields
//! ([`request::RequestOptions`]) and loader configuration is an explicit
//! value passed at construction ([`config::LoaderConfig`]). There is no
//! fluent builder and no process-wide mutable default: two call sites can
//! never interfere with each other through shared configuration state.
//!
//! ## Content-Addressed Keys
//!
//! Every transform contributes its identity and parameters to a rolling
//! SHA-256 digest. Equal parameters always produce byte-identical
//! contributions; a tenth-of-a-pixel border width difference lands in a
//! different cache slot. The batch manifest uses the same digests to skip
//! work whose source and parameters haven't changed.
//!
//! ## Pure-Rust Pixels
//!
//! Decoding, resampling, and blur come from the `image` crate; the
//! geometric transforms (circle, ring, rounded rect) are direct coverage
//! evaluation with a one-pixel anti-aliasing ramp. No system libraries,
//! no GPU requirement — the binary is fully self-contained.

pub mod batch;
pub mod cache;
pub mod config;
pub mod loader;
pub mod pool;
pub mod request;
pub mod transform;
