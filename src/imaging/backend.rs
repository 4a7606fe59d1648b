//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the rendition builder and
//! the pixel work: decode, resize, smart-crop, encode and metadata lookup.
//! The builder only decides *what* to produce and *whether* to write it; the
//! backend does the rest.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! recording [`MockBackend`](tests::MockBackend), which fakes rasters and
//! writes placeholder files so the staleness policy still sees real mtimes.

use super::calculations::CropRect;
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Callers add the file path; the reason alone is carried here.
    #[error("{0}")]
    Decode(String),
    #[error("unexpected format: {0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Encode(String),
}

/// A decoded source raster and the container format it came from.
///
/// Renditions are encoded back into the same format.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub raster: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.raster.width(), self.raster.height())
    }
}

/// Trait for image processing backends.
///
/// Shared by reference across all build workers, hence `Sync`.
pub trait ImageBackend: Sync {
    /// Decode a file into an in-memory raster.
    fn decode(&self, path: &Path) -> Result<DecodedImage, BackendError>;

    /// Embedded copyright string, if any. Absence is never an error.
    fn read_copyright(&self, path: &Path) -> Option<String>;

    /// Proportional resize bounded by `max_w`×`max_h`.
    fn fit_within(&self, img: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage;

    /// Resize to exactly `width`×`height`.
    fn resize_exact(&self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Most salient rectangle with the aspect ratio of `target_w`×`target_h`.
    fn best_crop(&self, img: &DynamicImage, target_w: u32, target_h: u32) -> Option<CropRect>;

    /// Extract a sub-region, or `None` when the raster cannot supply it.
    fn sub_image(&self, img: &DynamicImage, rect: CropRect) -> Option<DynamicImage>;

    /// Encode `img` as `format` into `path`.
    fn encode(
        &self,
        img: &DynamicImage,
        format: ImageFormat,
        path: &Path,
    ) -> Result<(), BackendError>;
}
