//! Image descriptor resolution.
//!
//! Authors reference images by a static path, a wildcard pattern, or an
//! external URL. Resolution turns that into everything the markup needs:
//!
//! ```text
//! path = "photo-*.jpg"                      static/photo-400.jpg
//!          │                                static/photo-800.jpg
//!          ▼                                static_gen/photo-400.webp
//! ImageDescriptor                           static_gen/photo-800.webp
//!   src      photo-400.webp
//!   srcset   photo-400.webp 400w, photo-800.webp 800w
//!   fallback photo-400.jpg / photo-400.jpg 400w, photo-800.jpg 800w
//!   width    400 (1x file), height from the same file
//!   sizes    400px
//!   thumb    data:image/gif;base64,…
//! ```
//!
//! Raster images that aren't WebP get a WebP primary source with the original
//! as fallback. SVGs and WebPs are used as-is. Every referenced file must
//! exist in `static/` or `static_gen/`.

use crate::config::{ConfigError, Site};
use crate::imaging::calculations::{
    default_sizes, has_extension, match_width, reference_width, srcset, with_extension,
};
use crate::imaging::{self, BackendError, ImageBackend};
use crate::types::Mode;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const WEBP_EXT: &str = ".webp";
pub const SVG_EXT: &str = ".svg";
const WILDCARD: char = '*';

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("exactly one of path or url must be set")]
    Source,
    #[error("alt must be set")]
    MissingAlt,
    #[error("width and height must be set for URLs")]
    UrlDimensions,
    #[error("bad image pattern {0:?}")]
    Pattern(String),
    #[error("no images matched by prefix {prefix:?} and suffix {suffix:?}")]
    NoMatches { prefix: String, suffix: String },
    #[error("dimensions of {0:?} could not be determined")]
    Undetermined(String),
    #[error("failed getting {path:?} dimensions: {source}")]
    Dimensions { path: String, source: BackendError },
    #[error(transparent)]
    Static(#[from] ConfigError),
    #[error("failed listing {dir}: {source}")]
    List { dir: String, source: std::io::Error },
    #[error("failed generating thumbnail for {path:?}: {source}")]
    Thumbnail { path: String, source: BackendError },
}

/// An image reference as written by the author.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSpec {
    pub path: Option<String>,
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: String,
    pub lazy: bool,
    pub sizes: Option<String>,
}

/// AMP layout of the resulting `<amp-img>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Responsive,
    Fixed,
    Fill,
}

impl Layout {
    pub fn name(self) -> &'static str {
        match self {
            Layout::Responsive => "responsive",
            Layout::Fixed => "fixed",
            Layout::Fill => "fill",
        }
    }
}

/// Choices made by the caller rather than the author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Static(String),
    External(String),
}

/// Legacy-format source used when the browser can't show the primary one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub src: String,
    pub srcset: String,
}

/// A fully resolved image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    pub alt: String,
    pub lazy: bool,
    pub src: String,
    /// Empty for external images.
    pub srcset: String,
    pub fallback: Option<Fallback>,
    /// Empty for external images.
    pub sizes: String,
    /// Widths of all files in a wildcard set, ascending.
    pub widths: Vec<u32>,
    /// Largest available file, for "view full size" links.
    pub biggest_src: String,
    /// Placeholder `data:` URI.
    pub thumb: Option<String>,
    /// The page must define the placeholder blur filter along with this image.
    pub define_thumb_filter: bool,
    pub layout: Layout,
}

/// Placeholders made so far on one page.
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    made: HashMap<String, Option<String>>,
    filter_defined: bool,
}

impl ThumbnailCache {
    /// Hand the filter definition back when the image that claimed it isn't
    /// emitted after all.
    pub fn release_filter(&mut self, d: &ImageDescriptor) {
        if d.define_thumb_filter {
            self.filter_defined = false;
        }
    }
}

/// Resolves image references for one page render.
pub struct ImageResolver<'a, B: ImageBackend> {
    site: &'a Site,
    backend: &'a B,
    mode: Mode,
}

/// Files of a wildcard set in one directory: `(site-relative url, width)`,
/// ascending by width.
fn list_set(
    dir: &Path,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<(String, u32)>, ImageError> {
    let (sub, name_prefix) = match prefix.rfind('/') {
        Some(i) => (&prefix[..=i], &prefix[i + 1..]),
        None => ("", prefix),
    };
    let dir = dir.join(sub);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let list_err = |source| ImageError::List {
        dir: dir.display().to_string(),
        source,
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(&dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(w) = match_width(name, name_prefix, suffix) {
            found.push((format!("{prefix}{w}{suffix}"), w));
        }
    }
    found.sort_by_key(|&(_, w)| w);
    Ok(found)
}

impl<'a, B: ImageBackend> ImageResolver<'a, B> {
    pub fn new(site: &'a Site, backend: &'a B, mode: Mode) -> Self {
        Self {
            site,
            backend,
            mode,
        }
    }

    /// Files matching `prefix*suffix`, from `static/` or else `static_gen/`.
    fn find_set(&self, prefix: &str, suffix: &str) -> Result<Vec<(String, u32)>, ImageError> {
        let found = list_set(&self.site.static_dir(), prefix, suffix)?;
        if !found.is_empty() {
            return Ok(found);
        }
        let found = list_set(&self.site.static_gen_dir(), prefix, suffix)?;
        if found.is_empty() {
            return Err(ImageError::NoMatches {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            });
        }
        Ok(found)
    }

    fn dimensions(&self, rel: &str) -> Result<(u32, u32), ImageError> {
        let path = self.site.check_static(rel)?;
        imaging::get_dimensions(self.backend, &path).map_err(|source| ImageError::Dimensions {
            path: rel.to_string(),
            source,
        })
    }

    /// Resolve `spec`. `thumbs` carries placeholder state across the images
    /// of one page.
    pub fn resolve(
        &self,
        spec: &ImageSpec,
        opts: ImageOptions,
        thumbs: &mut ThumbnailCache,
    ) -> Result<ImageDescriptor, ImageError> {
        let (path, url) = match (&spec.path, &spec.url) {
            (Some(p), None) if !p.is_empty() => (p.as_str(), None),
            (None, Some(u)) if !u.is_empty() => ("", Some(u.as_str())),
            _ => return Err(ImageError::Source),
        };
        if spec.alt.is_empty() {
            return Err(ImageError::MissingAlt);
        }

        if let Some(url) = url {
            let (Some(width), Some(height)) = (spec.width, spec.height) else {
                return Err(ImageError::UrlDimensions);
            };
            if width == 0 || height == 0 {
                return Err(ImageError::UrlDimensions);
            }
            return Ok(ImageDescriptor {
                source: ImageSource::External(url.to_string()),
                width,
                height,
                alt: spec.alt.clone(),
                lazy: spec.lazy,
                src: url.to_string(),
                srcset: String::new(),
                fallback: None,
                sizes: String::new(),
                widths: Vec::new(),
                biggest_src: url.to_string(),
                thumb: None,
                define_thumb_filter: false,
                layout: opts.layout,
            });
        }

        let known = spec.width.zip(spec.height).filter(|&(w, h)| w > 0 && h > 0);
        let as_is = has_extension(path, WEBP_EXT) || has_extension(path, SVG_EXT);
        let mut widths = Vec::new();

        let (width, height, src, srcset_attr, fallback, biggest_src) =
            match path.split_once(WILDCARD) {
                None => {
                    let (width, height) = match known {
                        Some(dims) => dims,
                        None => self.dimensions(path)?,
                    };
                    let single = |s: &str| srcset(&[(s, width)]);
                    if as_is {
                        (width, height, path.to_string(), single(path), None, path.to_string())
                    } else {
                        let src = with_extension(path, WEBP_EXT);
                        let fallback = Fallback {
                            src: path.to_string(),
                            srcset: single(path),
                        };
                        let set = single(&src);
                        (width, height, src, set, Some(fallback), path.to_string())
                    }
                }
                Some((prefix, suffix)) => {
                    if suffix.contains(WILDCARD) || suffix.contains('/') {
                        return Err(ImageError::Pattern(path.to_string()));
                    }
                    let set = self.find_set(prefix, suffix)?;
                    widths = set.iter().map(|&(_, w)| w).collect();
                    let file = |w: u32| format!("{prefix}{w}{suffix}");

                    let (width, height) = match known {
                        Some(dims) => dims,
                        None => {
                            let probe = spec
                                .width
                                .filter(|&w| w > 0)
                                .or_else(|| reference_width(&widths))
                                .ok_or_else(|| ImageError::Undetermined(path.to_string()))?;
                            self.dimensions(&file(probe))?
                        }
                    };
                    let chosen = file(width);
                    let biggest = file(widths.last().copied().unwrap_or(width));

                    if as_is {
                        (width, height, chosen, srcset(&set), None, biggest)
                    } else {
                        let webp_suffix = with_extension(suffix, WEBP_EXT);
                        let webp_set = self.find_set(prefix, &webp_suffix)?;
                        let fallback = Fallback {
                            src: chosen.clone(),
                            srcset: srcset(&set),
                        };
                        let src = with_extension(&chosen, WEBP_EXT);
                        (width, height, src, srcset(&webp_set), Some(fallback), biggest)
                    }
                }
            };

        let sizes = spec.sizes.clone().unwrap_or_else(|| {
            default_sizes(
                width,
                widths.len() >= 2,
                self.site.config.mobile_max_width,
            )
        });

        self.site.check_static(&src)?;
        if let Some(fb) = &fallback {
            self.site.check_static(&fb.src)?;
        }
        self.site.check_static(&biggest_src)?;

        let mut define_thumb_filter = false;
        let thumb = if has_extension(&src, SVG_EXT) {
            None
        } else {
            let orig = fallback.as_ref().map_or(src.as_str(), |f| f.src.as_str());
            let thumb = self.placeholder(orig, thumbs)?;
            if thumb.is_some() && !self.mode.is_amp() && !thumbs.filter_defined {
                thumbs.filter_defined = true;
                define_thumb_filter = true;
            }
            thumb
        };
        debug!("resolved image {path} as {src} ({width}x{height})");

        Ok(ImageDescriptor {
            source: ImageSource::Static(path.to_string()),
            width,
            height,
            alt: spec.alt.clone(),
            lazy: spec.lazy,
            src,
            srcset: srcset_attr,
            fallback,
            sizes,
            widths,
            biggest_src,
            thumb,
            define_thumb_filter,
            layout: opts.layout,
        })
    }

    /// Placeholder for `rel`, made at most once per page.
    fn placeholder(
        &self,
        rel: &str,
        thumbs: &mut ThumbnailCache,
    ) -> Result<Option<String>, ImageError> {
        if let Some(made) = thumbs.made.get(rel) {
            return Ok(made.clone());
        }
        let path = self.site.check_static(rel)?;
        let thumb = match imaging::placeholder_uri(self.backend, &path) {
            Ok(uri) => Some(uri),
            Err(e) if e.is_benign() => {
                warn!("skipping placeholder for {rel}: {e}");
                None
            }
            Err(source) => {
                return Err(ImageError::Thumbnail {
                    path: rel.to_string(),
                    source,
                });
            }
        };
        thumbs.made.insert(rel.to_string(), thumb.clone());
        Ok(thumb)
    }
}
