//! Shared test utilities for the swipe-gal test suite.
//!
//! Provides synthetic image writers, mtime manipulation and a ready-made
//! build context pointing at a temp output directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let src = tmp.path().join("a.jpg");
//! write_jpeg(&src, 64, 48);
//! age(&src, 3600); // source last touched an hour ago
//! ```

use crate::rendition::BuildContext;
use crate::types::{RenditionSpec, SourceItem};
use image::{ImageEncoder, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG with the given dimensions.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let writer = std::io::BufWriter::new(fs::File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small valid PNG with the given dimensions.
pub fn write_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a decodable JPEG carrying an EXIF Copyright tag.
pub fn write_jpeg_with_copyright(path: &Path, width: u32, height: u32, copyright: &str) {
    write_jpeg(path, width, height);
    let mut bytes = fs::read(path).unwrap();
    let tail = bytes.split_off(2); // keep SOI
    bytes.extend(exif_app1(copyright));
    bytes.extend(tail);
    fs::write(path, bytes).unwrap();
}

// =========================================================================
// Embedded metadata
// =========================================================================

/// Little-endian TIFF with a single IFD0 entry: Copyright = `value`.
pub fn tiff_with_copyright(value: &str) -> Vec<u8> {
    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes()); // IFD0 offset
    tiff.extend_from_slice(&1u16.to_le_bytes()); // one entry
    tiff.extend_from_slice(&0x8298u16.to_le_bytes()); // Copyright
    tiff.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    tiff.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
    let data_offset = 8 + 2 + 12 + 4;
    tiff.extend_from_slice(&(data_offset as u32).to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    tiff.extend_from_slice(&ascii);
    tiff
}

/// Complete APP1 segment (marker included) holding an EXIF Copyright tag.
pub fn exif_app1(value: &str) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend(tiff_with_copyright(value));
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend(payload);
    segment
}

// =========================================================================
// Modification times
// =========================================================================

/// Set a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// Push a file's modification time `secs` seconds into the past.
///
/// Tests age their sources so outputs written moments later are strictly
/// newer even on coarse-timestamp filesystems.
pub fn age(path: &Path, secs: u64) {
    set_mtime(path, SystemTime::now() - Duration::from_secs(secs));
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

// =========================================================================
// Pipeline fixtures
// =========================================================================

/// Build context writing into `output_dir` with the given thumbnail/small sizes.
pub fn context(output_dir: &Path, thumb: (u32, u32), small: (u32, u32)) -> BuildContext {
    fs::create_dir_all(output_dir).unwrap();
    BuildContext {
        output_dir: output_dir.to_path_buf(),
        small: RenditionSpec::small(small.0, small.1),
        thumbnail: RenditionSpec::thumbnail(thumb.0, thumb.1),
    }
}

/// Create empty placeholder sources (for the mock backend) aged one hour.
pub fn placeholder_sources(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, "").unwrap();
            age(&path, 3600);
            path
        })
        .collect()
}

/// Stat a source and wrap it as an item at `position`.
pub fn item(path: &Path, position: usize) -> SourceItem {
    SourceItem::from_path(path, position).unwrap()
}
