//! Pixel work behind the rendition builder.
//!
//! | Operation | Where |
//! |---|---|
//! | **Decode / encode** | `image` crate, JPEG and PNG |
//! | **Fit within / exact resize** | Lanczos3 resampling |
//! | **Smart crop** | saliency search in [`smartcrop`] |
//! | **Copyright** | EXIF / IPTC / PNG text reader in [`copyright`] |
//!
//! The module is split into:
//! - **Calculations**: pure functions for rendition geometry (unit testable)
//! - **Parameters**: encoding settings
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod copyright;
mod params;
pub mod rust_backend;
pub mod smartcrop;

pub use backend::{BackendError, DecodedImage, ImageBackend};
pub use calculations::{CropRect, crop_window, fit_within_dimensions};
pub use params::Quality;
pub use rust_backend::RustBackend;
