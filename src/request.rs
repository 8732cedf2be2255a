//! Request configuration value types.
//!
//! Construction is plain struct literals with named optional fields and
//! [`Default`] — no mutable fluent builder — so a request is a value that
//! can be compared, stored, and constructed in tests without ceremony:
//!
//! ```
//! use easel::request::RequestOptions;
//!
//! let options = RequestOptions {
//!     resize: Some((800, 200)),
//!     center_crop: true,
//!     ..Default::default()
//! };
//! assert!(options.transforms.is_empty());
//! ```

use crate::transform::Transform;
use serde::{Deserialize, Serialize};

/// A packed 0xAARRGGBB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argb(pub u32);

impl Argb {
    pub const TRANSPARENT: Argb = Argb(0);

    /// An opaque color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.red(), self.green(), self.blue(), self.alpha()])
    }
}

/// Where the pipeline may cache a loaded image.
///
/// Unrecognized settings do not exist: the enumeration is closed and
/// matched exhaustively everywhere. `All` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStrategy {
    /// Cache both the original encoded data and every decoded variant.
    #[default]
    All,
    /// Cache nothing.
    None,
    /// Cache only decoded (post-transform) images.
    DecodedOnly,
    /// Cache only the original encoded data.
    EncodedOnly,
    /// Let the pipeline pick per source.
    Automatic,
}

impl CacheStrategy {
    /// Whether decoded (post-transform) outputs may be cached under this
    /// strategy. The batch manifest records an output only when they may.
    pub fn caches_decoded(self) -> bool {
        match self {
            CacheStrategy::All | CacheStrategy::DecodedOnly | CacheStrategy::Automatic => true,
            CacheStrategy::None | CacheStrategy::EncodedOnly => false,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CacheStrategy::All => "all",
            CacheStrategy::None => "none",
            CacheStrategy::DecodedOnly => "decoded-only",
            CacheStrategy::EncodedOnly => "encoded-only",
            CacheStrategy::Automatic => "automatic",
        }
    }
}

impl std::fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown cache strategy '{given}', expected one of: all, none, decoded-only, encoded-only, automatic")]
pub struct ParseCacheStrategyError {
    given: String,
}

impl std::str::FromStr for CacheStrategy {
    type Err = ParseCacheStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CacheStrategy::All),
            "none" => Ok(CacheStrategy::None),
            "decoded-only" => Ok(CacheStrategy::DecodedOnly),
            "encoded-only" => Ok(CacheStrategy::EncodedOnly),
            "automatic" => Ok(CacheStrategy::Automatic),
            other => Err(ParseCacheStrategyError {
                given: other.to_string(),
            }),
        }
    }
}

/// Configuration for one load request.
///
/// `center_crop` runs before `resize`; `transforms` run last, in order.
/// A `placeholder` of `None` falls back to the loader's configured
/// placeholder color.
pub struct RequestOptions {
    pub resize: Option<(u32, u32)>,
    pub center_crop: bool,
    pub cache_strategy: CacheStrategy,
    pub placeholder: Option<Argb>,
    pub transforms: Vec<Box<dyn Transform>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            resize: None,
            center_crop: false,
            cache_strategy: CacheStrategy::All,
            placeholder: None,
            transforms: Vec::new(),
        }
    }
}
