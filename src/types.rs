//! Shared types passed between the builder, the orchestrator and the page
//! renderer.
//!
//! Everything that ends up in the gallery page derives `Serialize` so the
//! manifest can be embedded as JSON for the viewer script.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One input image, as given on the command line.
///
/// `position` is the 0-based rank of the path in the argument list; it
/// travels with the item through the worker and back so the final manifest
/// can be restored to input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub path: PathBuf,
    pub position: usize,
    pub modified: SystemTime,
}

impl SourceItem {
    /// Stat `path` and capture its modification time.
    pub fn from_path(path: &Path, position: usize) -> std::io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(Self {
            path: path.to_path_buf(),
            position,
            modified,
        })
    }

    /// Base file name of the source (`/a/b/IMG_1.jpg` → `IMG_1.jpg`).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The two renditions generated for every source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenditionKind {
    Small,
    Thumbnail,
}

impl RenditionKind {
    /// File-name infix inserted before the extension.
    pub fn suffix(self) -> &'static str {
        match self {
            RenditionKind::Small => "_small",
            RenditionKind::Thumbnail => "_thm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenditionKind::Small => "small",
            RenditionKind::Thumbnail => "thumbnail",
        }
    }
}

/// Target geometry for one rendition kind.
///
/// `Small` is a bounding box (the realized size may be smaller on the
/// constraining axis); `Thumbnail` is exact and smart-cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionSpec {
    pub kind: RenditionKind,
    pub width: u32,
    pub height: u32,
    pub crop: bool,
}

impl RenditionSpec {
    pub fn small(width: u32, height: u32) -> Self {
        Self {
            kind: RenditionKind::Small,
            width,
            height,
            crop: false,
        }
    }

    pub fn thumbnail(width: u32, height: u32) -> Self {
        Self {
            kind: RenditionKind::Thumbnail,
            width,
            height,
            crop: true,
        }
    }
}

/// What happened to a rendition file during this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenditionStatus {
    /// Written this run.
    Encoded,
    /// Existing output was newer than the source and reused as-is.
    Fresh,
    /// The raster could not supply the crop region; the file may be absent.
    Unavailable,
}

/// Outcome of building one [`RenditionSpec`] for one [`SourceItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenditionRecord {
    pub kind: RenditionKind,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub status: RenditionStatus,
}

/// One row of the gallery manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixEntry {
    pub filename: String,
    pub small: String,
    pub small_width: u32,
    pub small_height: u32,
    pub thumbnail: String,
    pub thumb_width: u32,
    pub thumb_height: u32,
    pub width: u32,
    pub height: u32,
    pub copyright: String,
    pub position: usize,
}

impl PixEntry {
    /// Fold the two rendition records of a source into its manifest row.
    pub fn from_records(
        filename: String,
        (width, height): (u32, u32),
        small: &RenditionRecord,
        thumbnail: &RenditionRecord,
        copyright: String,
        position: usize,
    ) -> Self {
        Self {
            filename,
            small: small.file_name.clone(),
            small_width: small.width,
            small_height: small.height,
            thumbnail: thumbnail.file_name.clone(),
            thumb_width: thumbnail.width,
            thumb_height: thumbnail.height,
            width,
            height,
            copyright,
            position,
        }
    }
}

/// Ordered manifest: entry `i` corresponds to the `i`-th processable input.
pub type GalleryManifest = Vec<PixEntry>;
