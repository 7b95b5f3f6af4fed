//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations) (which decides what to
//! produce) and the [`backend`](super::backend) (which does the pixel work),
//! so tests can swap in a mock backend.

use std::path::PathBuf;

/// Width and height of the blur-up placeholder, in pixels.
pub const THUMBNAIL_SIZE: u32 = 4;

/// Largest placeholder (in pixels) whose colors always fit a GIF palette.
pub const MAX_THUMBNAIL_PIXELS: u32 = 256;

/// Parameters for a placeholder thumbnail: decode `source`, scale it to
/// exactly `width`×`height` and encode it as a palette GIF.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailParams {
    /// The standard square placeholder for `source`.
    pub fn placeholder(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            width: THUMBNAIL_SIZE,
            height: THUMBNAIL_SIZE,
        }
    }

    pub fn pixels(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }

    /// Whether the output is non-empty and small enough for one palette entry
    /// per pixel.
    pub fn fits_palette(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels() <= MAX_THUMBNAIL_PIXELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_square() {
        let p = ThumbnailParams::placeholder("/a.jpg");
        assert_eq!((p.width, p.height), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
        assert!(p.fits_palette());
    }

    #[test]
    fn palette_limit() {
        let ok = ThumbnailParams {
            source: "/a.jpg".into(),
            width: 16,
            height: 16,
        };
        assert!(ok.fits_palette());
        let too_big = ThumbnailParams { height: 17, ..ok.clone() };
        assert!(!too_big.fits_palette());
        let empty = ThumbnailParams { width: 0, ..ok };
        assert!(!empty.fits_palette());
    }
}
