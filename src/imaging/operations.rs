//! High-level image operations.
//!
//! These functions combine parameters with backend execution and shape the
//! results the way the renderer consumes them.

use super::backend::{BackendError, ImageBackend};
use super::params::ThumbnailParams;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

pub const GIF_DATA_URI_PREFIX: &str = "data:image/gif;base64,";

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Scale `path` down to `width`×`height` and return the palette GIF,
/// base64-encoded.
pub fn thumbnail(
    backend: &impl ImageBackend,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<String> {
    let params = ThumbnailParams {
        source: path.to_path_buf(),
        width,
        height,
    };
    if !params.fits_palette() {
        return Err(BackendError::ProcessingFailed(format!(
            "only 1 to 256 pixels supported, got {width}x{height}"
        )));
    }
    let gif = backend.thumbnail(&params)?;
    Ok(STANDARD.encode(gif))
}

/// The standard placeholder for `path` as a `data:` URI.
pub fn placeholder_uri(backend: &impl ImageBackend, path: &Path) -> Result<String> {
    let params = ThumbnailParams::placeholder(path);
    let b64 = thumbnail(backend, path, params.width, params.height)?;
    Ok(format!("{GIF_DATA_URI_PREFIX}{b64}"))
}
