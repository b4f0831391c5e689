use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;

use crate::assets::decode::{DecodedImage, decode_image, looks_like_svg, parse_svg};

/// Why an asset reference could not be turned into pixels.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Nothing exists at the reference.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// The bytes exist but are not a decodable image or font.
    #[error("failed to decode asset '{reference}': {message}")]
    Decode {
        /// Asset reference.
        reference: String,
        /// Decoder message.
        message: String,
    },
    /// The reference itself is malformed.
    #[error("invalid asset reference '{reference}': {message}")]
    InvalidRef {
        /// Asset reference.
        reference: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Resolves asset references to raw bytes.
pub trait AssetSource {
    /// Read the bytes behind `reference`.
    fn read(&self, reference: &str) -> Result<Vec<u8>, AssetError>;
}

/// Normalize and validate an asset-root-relative path.
///
/// The result uses `/` separators, drops `.` segments and rejects absolute paths and parent
/// traversals.
pub fn normalize_rel_path(source: &str) -> Result<String, AssetError> {
    let invalid = |message: &str| AssetError::InvalidRef {
        reference: source.to_string(),
        message: message.to_string(),
    };
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(invalid("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(invalid("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(invalid("asset paths must not contain '..'"));
        }
        out.push(part);
    }
    if out.is_empty() {
        return Err(invalid("asset path must contain a file name"));
    }
    Ok(out.join("/"))
}

/// Assets read from a directory.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn read(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        let norm = normalize_rel_path(reference)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(reference.to_string()),
            _ => AssetError::Decode {
                reference: reference.to_string(),
                message: format!("read '{}': {e}", p.display()),
            },
        })
    }
}

/// Assets held in memory, keyed by normalized reference.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryAssetSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, reference: &str, bytes: Vec<u8>) -> Result<(), AssetError> {
        let key = normalize_rel_path(reference)?;
        self.entries.insert(key, Arc::new(bytes));
        Ok(())
    }

    /// Builder form of [`Self::insert`].
    pub fn with(mut self, reference: &str, bytes: Vec<u8>) -> Result<Self, AssetError> {
        self.insert(reference, bytes)?;
        Ok(self)
    }
}

impl AssetSource for MemoryAssetSource {
    fn read(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        let key = normalize_rel_path(reference)?;
        self.entries
            .get(&key)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| AssetError::NotFound(reference.to_string()))
    }
}

/// A decoded image ready to paint.
#[derive(Clone, Debug)]
pub enum LoadedImage {
    /// Raster pixels.
    Raster(Arc<DecodedImage>),
    /// Vector document, rasterized at draw size.
    Vector(Arc<usvg::Tree>),
}

impl LoadedImage {
    /// Natural size in image units.
    pub fn size(&self) -> (f64, f64) {
        match self {
            Self::Raster(img) => (f64::from(img.width), f64::from(img.height)),
            Self::Vector(tree) => {
                let s = tree.size();
                (f64::from(s.width()), f64::from(s.height()))
            }
        }
    }
}

/// Resolves references to decoded images and font bytes.
///
/// Failures are returned, never retried; the engine degrades them to a fallback or placeholder.
pub trait ImageLoader {
    /// Load and decode an image.
    fn load_image(&mut self, reference: &str) -> Result<LoadedImage, AssetError>;

    /// Load raw font bytes.
    fn load_font(&mut self, reference: &str) -> Result<Arc<Vec<u8>>, AssetError>;

    /// Forget cached entries for references not listed in `live`.
    fn retain_only(&mut self, _live: &[&str]) {}
}

/// Caching [`ImageLoader`] over an [`AssetSource`]. `data:` URLs are decoded inline.
#[derive(Debug)]
pub struct AssetCache<S> {
    source: S,
    images: HashMap<String, LoadedImage>,
    fonts: HashMap<String, Arc<Vec<u8>>>,
}

impl<S: AssetSource> AssetCache<S> {
    /// Wrap a source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            images: HashMap::new(),
            fonts: HashMap::new(),
        }
    }

    /// Underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source. Cached entries are kept.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Drop every cached decode.
    pub fn clear(&mut self) {
        self.images.clear();
        self.fonts.clear();
    }

    /// Number of cached images and fonts.
    pub fn len(&self) -> usize {
        self.images.len() + self.fonts.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bytes_for(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        if reference.starts_with("data:") {
            return decode_data_url(reference);
        }
        self.source.read(reference)
    }
}

impl<S: AssetSource> ImageLoader for AssetCache<S> {
    fn load_image(&mut self, reference: &str) -> Result<LoadedImage, AssetError> {
        let key = cache_key(reference);
        if let Some(img) = self.images.get(&key) {
            return Ok(img.clone());
        }
        let bytes = self.bytes_for(reference)?;
        let decode_err = |e: crate::foundation::error::CoverError| AssetError::Decode {
            reference: short_ref(reference),
            message: e.to_string(),
        };
        let loaded = if looks_like_svg(&bytes) {
            LoadedImage::Vector(parse_svg(&bytes).map_err(decode_err)?)
        } else {
            LoadedImage::Raster(Arc::new(decode_image(&bytes).map_err(decode_err)?))
        };
        self.images.insert(key, loaded.clone());
        Ok(loaded)
    }

    fn load_font(&mut self, reference: &str) -> Result<Arc<Vec<u8>>, AssetError> {
        let key = cache_key(reference);
        if let Some(f) = self.fonts.get(&key) {
            return Ok(f.clone());
        }
        let bytes = Arc::new(self.bytes_for(reference)?);
        self.fonts.insert(key, bytes.clone());
        Ok(bytes)
    }

    fn retain_only(&mut self, live: &[&str]) {
        let live: HashSet<String> = live.iter().map(|r| cache_key(r)).collect();
        let before = self.len();
        self.images.retain(|k, _| live.contains(k));
        self.fonts.retain(|k, _| live.contains(k));
        let dropped = before - self.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = self.len(), "evicted unused assets");
        }
    }
}

/// Cache key for a reference. `data:` URLs are reduced to their length and a hash of the payload.
pub(crate) fn cache_key(reference: &str) -> String {
    if !reference.starts_with("data:") {
        return reference.to_string();
    }
    let mut h = DefaultHasher::new();
    reference.hash(&mut h);
    format!("data:{}:{:016x}", reference.len(), h.finish())
}

/// Decode a `data:[<mime>][;base64],<payload>` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, AssetError> {
    let invalid = |message: String| AssetError::InvalidRef {
        reference: short_ref(url),
        message,
    };
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| invalid("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing ',' separator".to_string()))?;
    if header.split(';').any(|p| p == "base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| invalid(format!("bad base64 payload: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Encode bytes as a base64 `data:` URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn short_ref(reference: &str) -> String {
    const MAX: usize = 48;
    match reference.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &reference[..i]),
        None => reference.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
