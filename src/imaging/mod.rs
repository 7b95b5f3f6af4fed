//! Image probing and placeholder generation.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | CatmullRom resize + greedy palette + `gif` encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for srcset/sizes math (unit testable)
//! - **Palette**: First-seen palette construction
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining parameters + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod palette;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{get_dimensions, placeholder_uri, thumbnail};
pub use params::{MAX_THUMBNAIL_PIXELS, THUMBNAIL_SIZE, ThumbnailParams};
pub use rust_backend::RustBackend;
