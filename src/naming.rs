//! File-name conventions for sources and renditions.
//!
//! A source `IMG_1.JPG` publishes three files side by side in the output
//! directory:
//!
//! ```text
//! IMG_1.JPG          # the original, hard-linked or copied
//! IMG_1_small.JPG    # bounded "small" view
//! IMG_1_thm.JPG      # smart-cropped thumbnail
//! ```
//!
//! Because renditions land next to their originals, a previous output
//! directory is often passed back in as input (`swipe-gal -o out out/*`).
//! [`classify`] keeps generated files from being treated as new sources.

use crate::types::RenditionKind;
use std::fmt;
use std::path::Path;

/// Extensions with a decoder and encoder compiled in (compared case-insensitively).
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Why a path is not a processable source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File name carries a rendition infix (`_small.` / `_thm.`).
    Rendition,
    /// No extension at all.
    NoExtension,
    /// Extension outside [`SOURCE_EXTENSIONS`].
    Extension(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Rendition => write!(f, "generated rendition"),
            SkipReason::NoExtension => write!(f, "no extension"),
            SkipReason::Extension(ext) => write!(f, "unsupported extension .{ext}"),
        }
    }
}

/// Decide whether `path` names a processable source image.
///
/// Only the file name is inspected; the file is not opened.
pub fn classify(path: &Path) -> Result<(), SkipReason> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    let reserved = [RenditionKind::Small, RenditionKind::Thumbnail]
        .iter()
        .any(|kind| name.contains(&format!("{}.", kind.suffix())));
    if reserved {
        return Err(SkipReason::Rendition);
    }

    let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
        return Err(SkipReason::NoExtension);
    };
    if SOURCE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
    {
        Ok(())
    } else {
        Err(SkipReason::Extension(ext.into_owned()))
    }
}

/// Output file name of a rendition: stem + suffix + original extension.
///
/// The extension keeps its original case so `IMG.JPG` pairs with
/// `IMG_small.JPG`.
pub fn rendition_file_name(source_name: &str, kind: RenditionKind) -> String {
    let path = Path::new(source_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, kind.suffix(), ext.to_string_lossy()),
        None => format!("{}{}", stem, kind.suffix()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_any_case() {
        for name in ["a.jpg", "a.JPG", "a.jpeg", "a.Jpeg", "a.png", "a.PNG"] {
            assert_eq!(classify(Path::new(name)), Ok(()), "{name}");
        }
    }

    #[test]
    fn rejects_rendition_names() {
        assert_eq!(
            classify(Path::new("photo_small.jpg")),
            Err(SkipReason::Rendition)
        );
        assert_eq!(
            classify(Path::new("dir/photo_thm.png")),
            Err(SkipReason::Rendition)
        );
    }

    #[test]
    fn infix_must_precede_a_dot() {
        assert_eq!(classify(Path::new("my_small_dog.jpg")), Ok(()));
        assert_eq!(classify(Path::new("thm_thm_x.jpg")), Ok(()));
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert_eq!(
            classify(Path::new("notes.txt")),
            Err(SkipReason::Extension("txt".into()))
        );
        assert_eq!(
            classify(Path::new("scan.tiff")),
            Err(SkipReason::Extension("tiff".into()))
        );
    }

    #[test]
    fn rejects_missing_extension() {
        assert_eq!(classify(Path::new("README")), Err(SkipReason::NoExtension));
    }

    #[test]
    fn rendition_names_keep_extension_case() {
        assert_eq!(
            rendition_file_name("IMG_1.JPG", RenditionKind::Small),
            "IMG_1_small.JPG"
        );
        assert_eq!(
            rendition_file_name("b.jpg", RenditionKind::Thumbnail),
            "b_thm.jpg"
        );
    }

    #[test]
    fn rendition_name_only_touches_the_last_extension() {
        assert_eq!(
            rendition_file_name("a.png.png", RenditionKind::Small),
            "a.png_small.png"
        );
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(
            SkipReason::Extension("gif".into()).to_string(),
            "unsupported extension .gif"
        );
    }
}
