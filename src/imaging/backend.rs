//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the renderer needs:
//! identify (native pixel size) and thumbnail (tiny palette GIF).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `gif` crates.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A decoder limitation (e.g. animated WebP) rather than a broken file.
    #[error("Unsupported image: {0}")]
    Unsupported(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

impl BackendError {
    /// Whether the failure is a known decoder limitation that callers may
    /// tolerate by skipping the placeholder.
    pub fn is_benign(&self) -> bool {
        matches!(self, BackendError::Unsupported(_))
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image backends. `Sync` so one backend serves parallel renders.
pub trait ImageBackend: Sync {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Produce GIF bytes for a placeholder thumbnail.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock backend that records operations and answers from canned data.
    /// Uses Mutex (not RefCell) so it is Sync.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: HashMap<PathBuf, Dimensions>,
        /// Sources whose thumbnail fails as an unsupported image.
        pub unsupported: Vec<PathBuf>,
        /// Sources whose thumbnail fails outright.
        pub broken: Vec<PathBuf>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Thumbnail {
            source: String,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: &[(&Path, u32, u32)]) -> Self {
            Self {
                dimensions: dims
                    .iter()
                    .map(|&(p, width, height)| (p.to_path_buf(), Dimensions { width, height }))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn thumbnail_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Thumbnail { .. }))
                .count()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.dimensions
                .get(path)
                .copied()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn thumbnail(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source: params.source.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
            });
            if self.unsupported.contains(&params.source) {
                return Err(BackendError::Unsupported("animated".to_string()));
            }
            if self.broken.contains(&params.source) {
                return Err(BackendError::ProcessingFailed("corrupt".to_string()));
            }
            Ok(b"GIF89a".to_vec())
        }
    }

    #[test]
    fn mock_records_identify() {
        let path = Path::new("/test/image.jpg");
        let backend = MockBackend::with_dimensions(&[(path, 800, 600)]);

        let result = backend.identify(path).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_records_thumbnail() {
        let backend = MockBackend::new();
        backend
            .thumbnail(&ThumbnailParams::placeholder("/source.jpg"))
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![RecordedOp::Thumbnail {
                source: "/source.jpg".to_string(),
                width: 4,
                height: 4,
            }]
        );
    }

    #[test]
    fn only_unsupported_is_benign() {
        assert!(BackendError::Unsupported("x".into()).is_benign());
        assert!(!BackendError::ProcessingFailed("x".into()).is_benign());
        assert!(!BackendError::Io(std::io::Error::other("x")).is_benign());
    }
}
