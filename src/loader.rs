//! Preset loading: decode, transform, and key one image per request.
//!
//! [`Loader`] is the convenience surface. It owns a [`LoaderConfig`] and
//! turns preset helpers (`load_circle`, `load_blur`, ...) or an explicit
//! [`RequestOptions`] into a decode plus a transform chain, returning the
//! result bitmap together with its cache-key parts. Decoding itself is
//! delegated to the `image` crate; this module decides *what* to run, not
//! how pixels are decoded.
//!
//! An absent source (no path, or an empty path) is not an error: the
//! loader resolves it to a solid bitmap in the configured placeholder
//! color, skipping the transform chain, the way a pipeline shows a
//! placeholder instead of a missing image.

use crate::cache::{self, CacheKeyDigest};
use crate::config::LoaderConfig;
use crate::pool::{BitmapPool, NoPool};
use crate::request::{Argb, CacheStrategy, RequestOptions};
use crate::transform::{
    Blur, Border, BorderedCircle, CenterCrop, CircleCrop, Grayscale, Resize, RoundedCorners,
    Transform, TransformChain, TransformError,
};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// A finished load: the transformed bitmap, the two hashes a cache uses
/// to address it, and where the request allows it to be cached.
pub struct Loaded {
    pub image: RgbaImage,
    /// SHA-256 of the source file bytes (hash of the empty byte string
    /// when the request had no source).
    pub source_hash: String,
    /// Finished digest of the request's transform chain.
    pub params_hash: String,
    /// Caching advice carried over from the request.
    pub cache_strategy: CacheStrategy,
}

/// The named presets the library ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Decode only, no transforms.
    Plain,
    Circle,
    CircleBorder,
    Border,
    Rounded,
    Gray,
    Blur,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Plain,
        Preset::Circle,
        Preset::CircleBorder,
        Preset::Border,
        Preset::Rounded,
        Preset::Gray,
        Preset::Blur,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Plain => "plain",
            Preset::Circle => "circle",
            Preset::CircleBorder => "circle-border",
            Preset::Border => "border",
            Preset::Rounded => "rounded",
            Preset::Gray => "gray",
            Preset::Blur => "blur",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Preset::Plain => "decode without transforms",
            Preset::Circle => "crop to the inscribed circle",
            Preset::CircleBorder => "circular crop with a stroked border",
            Preset::Border => "stroked inscribed ring, no crop",
            Preset::Rounded => "center crop with rounded corners",
            Preset::Gray => "center crop desaturated to grayscale",
            Preset::Blur => "center crop with a gaussian blur",
        }
    }

    /// The transform chain this preset expands to under `config`.
    pub fn transforms(self, config: &LoaderConfig) -> Vec<Box<dyn Transform>> {
        match self {
            Preset::Plain => vec![],
            Preset::Circle => vec![Box::new(CircleCrop)],
            Preset::CircleBorder => {
                vec![Box::new(BorderedCircle::new(config.border(), config.density))]
            }
            Preset::Border => vec![Box::new(Border::new(config.border(), config.density))],
            Preset::Rounded => vec![
                Box::new(CenterCrop),
                Box::new(RoundedCorners::new(config.corner_radius, 0)),
            ],
            Preset::Gray => vec![Box::new(CenterCrop), Box::new(Grayscale)],
            Preset::Blur => vec![Box::new(CenterCrop), Box::new(Blur::new(config.blur_sigma))],
        }
    }
}

#[derive(Error, Debug)]
#[error("unknown preset '{given}', expected one of: plain, circle, circle-border, border, rounded, gray, blur")]
pub struct ParsePresetError {
    given: String,
}

impl std::str::FromStr for Preset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ParsePresetError { given: s.to_string() })
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The preset-driven image loader.
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(LoaderConfig::default())
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load with explicit options and a throwaway pool.
    pub fn load(&self, source: Option<&Path>, options: RequestOptions) -> Result<Loaded, LoadError> {
        self.load_with_pool(&mut NoPool, source, options)
    }

    /// Load with explicit options, drawing destination buffers from `pool`.
    pub fn load_with_pool(
        &self,
        pool: &mut dyn BitmapPool,
        source: Option<&Path>,
        options: RequestOptions,
    ) -> Result<Loaded, LoadError> {
        let mut transforms: Vec<Box<dyn Transform>> = Vec::new();
        if options.center_crop {
            transforms.push(Box::new(CenterCrop));
        }
        if let Some((width, height)) = options.resize {
            transforms.push(Box::new(Resize::new(width, height)));
        }
        transforms.extend(options.transforms);
        let chain = TransformChain::new(transforms);

        let placeholder = options.placeholder.unwrap_or(self.config.placeholder);
        let placeholder_size = options.resize.unwrap_or((1, 1));
        self.load_chain(
            pool,
            source,
            &chain,
            placeholder,
            placeholder_size,
            options.cache_strategy,
        )
    }

    /// Core entry point: decode `source` and run it through `chain`.
    ///
    /// An absent or empty source yields a `placeholder_size` bitmap filled
    /// with `placeholder`, bypassing the chain.
    pub fn load_chain(
        &self,
        pool: &mut dyn BitmapPool,
        source: Option<&Path>,
        chain: &TransformChain,
        placeholder: Argb,
        placeholder_size: (u32, u32),
        cache_strategy: CacheStrategy,
    ) -> Result<Loaded, LoadError> {
        let mut digest = CacheKeyDigest::new();
        chain.update_cache_key(&mut digest);
        let params_hash = digest.finish();

        let path = match source {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => {
                let (width, height) = placeholder_size;
                let image = RgbaImage::from_pixel(
                    width.max(1),
                    height.max(1),
                    placeholder.to_rgba(),
                );
                return Ok(Loaded {
                    image,
                    source_hash: cache::hash_bytes(&[]),
                    params_hash,
                    cache_strategy,
                });
            }
        };

        let bytes = std::fs::read(path)?;
        let source_hash = cache::hash_bytes(&bytes);
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| LoadError::Decode {
                path: path.to_path_buf(),
                source: e,
            })?
            .to_rgba8();

        let image = chain.apply(pool, decoded)?;
        Ok(Loaded {
            image,
            source_hash,
            params_hash,
            cache_strategy,
        })
    }

    // Preset helpers, mirroring the request each preset expands to.

    pub fn load_plain(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                center_crop: true,
                ..Default::default()
            },
        )
    }

    pub fn load_circle(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                placeholder: Some(self.config.circle_placeholder),
                transforms: Preset::Circle.transforms(&self.config),
                ..Default::default()
            },
        )
    }

    pub fn load_circle_with_border(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                transforms: Preset::CircleBorder.transforms(&self.config),
                ..Default::default()
            },
        )
    }

    pub fn load_border(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                transforms: Preset::Border.transforms(&self.config),
                ..Default::default()
            },
        )
    }

    pub fn load_rounded(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                transforms: Preset::Rounded.transforms(&self.config),
                ..Default::default()
            },
        )
    }

    pub fn load_gray(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                transforms: Preset::Gray.transforms(&self.config),
                ..Default::default()
            },
        )
    }

    pub fn load_blur(&self, path: &Path) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                transforms: Preset::Blur.transforms(&self.config),
                ..Default::default()
            },
        )
    }

    pub fn load_resized(&self, path: &Path, width: u32, height: u32) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                resize: Some((width, height)),
                center_crop: true,
                ..Default::default()
            },
        )
    }

    pub fn load_with_transforms(
        &self,
        path: &Path,
        transforms: Vec<Box<dyn Transform>>,
    ) -> Result<Loaded, LoadError> {
        self.load(
            Some(path),
            RequestOptions {
                transforms,
                ..Default::default()
            },
        )
    }
}
