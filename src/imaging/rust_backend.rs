//! Pure Rust image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only, no decode) |
//! | Decode (JPEG, PNG, GIF, WebP) | `image` crate decoders |
//! | Resize | `image::imageops::resize` with `CatmullRom` (bicubic) filter |
//! | Quantize | greedy first-seen palette ([`palette`](super::palette)) |
//! | Encode → GIF | `gif::Encoder` with a global palette |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::palette;
use super::params::ThumbnailParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageReader};
use std::borrow::Cow;
use std::path::Path;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| match e {
            ImageError::Unsupported(u) => {
                BackendError::Unsupported(format!("{}: {}", path.display(), u))
            }
            other => BackendError::ProcessingFailed(format!(
                "Failed to decode {}: {}",
                path.display(),
                other
            )),
        })
}

/// Encode indexed pixels as a single-frame GIF.
fn encode_gif(width: u32, height: u32, indexed: &palette::Indexed) -> Result<Vec<u8>, BackendError> {
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(BackendError::ProcessingFailed(format!(
                "GIF dimensions {width}x{height} out of range"
            )));
        }
    };
    let encode_err = |e: gif::EncodingError| {
        BackendError::ProcessingFailed(format!("GIF encode failed: {}", e))
    };

    let mut buf = Vec::new();
    {
        let mut encoder =
            gif::Encoder::new(&mut buf, w, h, &indexed.flat_palette()).map_err(encode_err)?;
        let frame = gif::Frame {
            width: w,
            height: h,
            buffer: Cow::Borrowed(&indexed.indices),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame).map_err(encode_err)?;
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError> {
        if !params.fits_palette() {
            return Err(BackendError::ProcessingFailed(format!(
                "thumbnail {}x{} exceeds palette capacity",
                params.width, params.height
            )));
        }
        let img = load_image(&params.source)?;
        let scaled = image::imageops::resize(
            &img.to_rgb8(),
            params.width,
            params.height,
            FilterType::CatmullRom,
        );
        let pixels: Vec<[u8; 3]> = scaled.pixels().map(|p| p.0).collect();
        let indexed = palette::greedy(&pixels, params.pixels() as usize);
        encode_gif(params.width, params.height, &indexed)
    }
}
