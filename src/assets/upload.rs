use std::io::Cursor;

use anyhow::Context;

use crate::design::state::LayoutVariant;
use crate::foundation::error::{CoverError, CoverResult};

/// Where an uploaded image is going to be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadTarget {
    /// The front-panel main image for the given layout.
    Main(LayoutVariant),
    /// A custom icon.
    Icon,
}

/// Output encoding chosen for an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadEncoding {
    /// Lossy, for photos.
    Jpeg {
        /// JPEG quality in `1..=100`.
        quality: u8,
    },
    /// Lossless with alpha, for tinted graphics and icons.
    Png,
}

impl UploadEncoding {
    /// MIME type of the encoding.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Size limit and encoding applied to an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Longest allowed side in pixels.
    pub max_side: u32,
    /// Output encoding.
    pub encoding: UploadEncoding,
}

impl UploadPolicy {
    /// Policy for `target`.
    pub fn for_target(target: UploadTarget) -> Self {
        match target {
            UploadTarget::Icon => Self {
                max_side: 500,
                encoding: UploadEncoding::Png,
            },
            UploadTarget::Main(LayoutVariant::Graphic) => Self {
                max_side: 1417,
                encoding: UploadEncoding::Png,
            },
            UploadTarget::Main(_) => Self {
                max_side: 2500,
                encoding: UploadEncoding::Jpeg { quality: 90 },
            },
        }
    }
}

/// An upload scaled down and re-encoded for the design state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedUpload {
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Encoding of [`Self::bytes`].
    pub encoding: UploadEncoding,
    /// Encoded image.
    pub bytes: Vec<u8>,
}

impl PreparedUpload {
    /// The upload as a `data:` URL usable as an image reference.
    pub fn to_data_url(&self) -> String {
        crate::assets::loader::encode_data_url(self.encoding.mime(), &self.bytes)
    }
}

/// Output size for fitting `(width, height)` within `max_side` on the long side.
///
/// Images already within the limit keep their size.
pub fn fit_long_side(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let long = width.max(height);
    if long <= max_side || long == 0 {
        return (width, height);
    }
    let k = f64::from(max_side) / f64::from(long);
    let scale = |v: u32| ((f64::from(v) * k).round() as u32).max(1);
    if width >= height {
        (max_side, scale(height))
    } else {
        (scale(width), max_side)
    }
}

/// Decode an uploaded image, downsize it for `target` and re-encode it.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn prepare_upload(bytes: &[u8], target: UploadTarget) -> CoverResult<PreparedUpload> {
    let policy = UploadPolicy::for_target(target);
    let img = image::load_from_memory(bytes).context("decode uploaded image")?;
    let (w, h) = fit_long_side(img.width(), img.height(), policy.max_side);
    if w == 0 || h == 0 {
        return Err(CoverError::validation("uploaded image is empty"));
    }
    let img = if (w, h) == (img.width(), img.height()) {
        img
    } else {
        tracing::debug!(
            from_w = img.width(),
            from_h = img.height(),
            to_w = w,
            to_h = h,
            "downsizing upload"
        );
        img.resize_exact(w, h, image::imageops::FilterType::Triangle)
    };

    let mut out = Cursor::new(Vec::new());
    match policy.encoding {
        UploadEncoding::Jpeg { quality } => {
            let rgb = img.to_rgb8();
            let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
            rgb.write_with_encoder(enc).context("encode upload as jpeg")?;
        }
        UploadEncoding::Png => {
            img.to_rgba8()
                .write_to(&mut out, image::ImageFormat::Png)
                .context("encode upload as png")?;
        }
    }

    Ok(PreparedUpload {
        width: w,
        height: h,
        encoding: policy.encoding,
        bytes: out.into_inner(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/upload.rs"]
mod tests;
