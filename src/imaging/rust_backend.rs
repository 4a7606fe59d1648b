//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | Fit within / exact resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Smart crop | [`smartcrop`](super::smartcrop) saliency search |
//! | Sub-region | `image::DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Copyright | [`copyright`](super::copyright) EXIF / IPTC / PNG text reader |
//!
//! Renditions are written to a `.partial` sibling and renamed into place, so
//! an interrupted run never leaves a truncated file that the staleness check
//! would later mistake for a fresh one.

use super::backend::{BackendError, DecodedImage, ImageBackend};
use super::calculations::{CropRect, fit_within_dimensions};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    jpeg_quality: Quality,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_quality(Quality::default())
    }

    pub fn with_quality(jpeg_quality: Quality) -> Self {
        Self { jpeg_quality }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

fn write_encoded(
    img: &DynamicImage,
    format: ImageFormat,
    path: &Path,
    quality: Quality,
) -> Result<(), BackendError> {
    let encode_err = |e: image::ImageError| BackendError::Encode(e.to_string());
    let writer = BufWriter::new(std::fs::File::create(path)?);

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
            // JPEG has no alpha and no 16-bit depth
            match img {
                DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => {
                    img.write_with_encoder(encoder).map_err(encode_err)
                }
                other => DynamicImage::ImageRgb8(other.to_rgb8())
                    .write_with_encoder(encoder)
                    .map_err(encode_err),
            }
        }
        ImageFormat::Png => img
            .write_with_encoder(PngEncoder::new(writer))
            .map_err(encode_err),
        other => Err(BackendError::UnsupportedFormat(format!("{other:?}"))),
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DecodedImage, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| BackendError::Decode("unrecognized image data".into()))?;
        let raster = reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(DecodedImage { raster, format })
    }

    fn read_copyright(&self, path: &Path) -> Option<String> {
        super::copyright::read_copyright(path)
    }

    fn fit_within(&self, img: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
        let source = (img.width(), img.height());
        let (w, h) = fit_within_dimensions(source, (max_w, max_h));
        if (w, h) == source {
            img.clone()
        } else {
            img.resize_exact(w, h, FilterType::Lanczos3)
        }
    }

    fn resize_exact(&self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }

    fn best_crop(&self, img: &DynamicImage, target_w: u32, target_h: u32) -> Option<CropRect> {
        super::smartcrop::best_crop(img, target_w, target_h)
    }

    fn sub_image(&self, img: &DynamicImage, rect: CropRect) -> Option<DynamicImage> {
        rect.fits_within((img.width(), img.height()))
            .then(|| img.crop_imm(rect.x, rect.y, rect.width, rect.height))
    }

    fn encode(
        &self,
        img: &DynamicImage,
        format: ImageFormat,
        path: &Path,
    ) -> Result<(), BackendError> {
        if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
            return Err(BackendError::UnsupportedFormat(format!("{format:?}")));
        }
        let partial = partial_path(path);
        match write_encoded(img, format, &partial, self.jpeg_quality) {
            Ok(()) => {
                std::fs::rename(&partial, path)?;
                Ok(())
            }
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                Err(e)
            }
        }
    }
}
