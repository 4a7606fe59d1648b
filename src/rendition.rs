//! Per-source rendition builder.
//!
//! [`build`] turns one input path into one [`PixEntry`]:
//!
//! 1. **Classify** the file name ([`naming::classify`]). Rendition names and
//!    unknown extensions are skipped, not failed.
//! 2. **Publish the original** into the output directory under its base
//!    name: hard link, copy as fallback.
//! 3. **Decode** the source. Failure is a hard error for the whole run.
//! 4. **Copyright** from embedded metadata, empty when absent.
//! 5. **Small**: proportional fit within the small bound, encoded only when
//!    stale.
//! 6. **Thumbnail**: when the existing thumbnail is fresh nothing else
//!    happens (the crop search is the most expensive step). Otherwise
//!    smart-crop the full raster, resize to the exact size and encode. A
//!    raster that cannot supply the crop region leaves the thumbnail
//!    [`Unavailable`](RenditionStatus::Unavailable) without failing the item.
//!
//! The builder never touches shared state: everything it produces is
//! returned to the caller.

use crate::imaging::{BackendError, DecodedImage, ImageBackend, fit_within_dimensions};
use crate::naming::{self, SkipReason};
use crate::staleness::needs_rebuild;
use crate::types::{PixEntry, RenditionRecord, RenditionSpec, RenditionStatus, SourceItem};
use image::{DynamicImage, ImageFormat};
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("could not stat {path}: {source}")]
    Stat { path: PathBuf, source: io::Error },
    #[error("could not publish {path} to the output directory: {source}")]
    Publish { path: PathBuf, source: io::Error },
    #[error("could not decode {path}: {source}")]
    Decode { path: PathBuf, source: BackendError },
    #[error("could not write {path}: {source}")]
    Encode { path: PathBuf, source: BackendError },
}

/// Everything a worker needs besides the backend: where to write and what sizes.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub output_dir: PathBuf,
    pub small: RenditionSpec,
    pub thumbnail: RenditionSpec,
}

/// Wall time spent in each phase of one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildTimings {
    pub decode: Duration,
    pub small: Duration,
    pub thumbnail: Duration,
}

/// A successfully built source.
#[derive(Debug, Clone)]
pub struct Built {
    pub entry: PixEntry,
    pub small: RenditionRecord,
    pub thumbnail: RenditionRecord,
    pub timings: BuildTimings,
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Built(Box<Built>),
    Skipped(SkipReason),
}

/// Classify, stat and build the source at `path`.
///
/// Unprocessable names are skipped before the file is even stat'ed.
pub fn build(
    path: &Path,
    position: usize,
    backend: &impl ImageBackend,
    ctx: &BuildContext,
) -> Result<BuildOutcome, BuildError> {
    if let Err(reason) = naming::classify(path) {
        debug!("skipping {}: {}", path.display(), reason);
        return Ok(BuildOutcome::Skipped(reason));
    }
    let item = SourceItem::from_path(path, position).map_err(|source| BuildError::Stat {
        path: path.to_path_buf(),
        source,
    })?;
    build_item(&item, backend, ctx).map(|built| BuildOutcome::Built(Box::new(built)))
}

/// Build both renditions for an already classified and stat'ed source.
pub fn build_item(
    item: &SourceItem,
    backend: &impl ImageBackend,
    ctx: &BuildContext,
) -> Result<Built, BuildError> {
    let file_name = item.file_name();
    let published = ctx.output_dir.join(&file_name);
    debug!(
        "publishing {} as {}",
        item.path.display(),
        published.display()
    );
    publish_original(&item.path, &published).map_err(|source| BuildError::Publish {
        path: item.path.clone(),
        source,
    })?;

    let started = Instant::now();
    let decoded = backend
        .decode(&item.path)
        .map_err(|source| BuildError::Decode {
            path: item.path.clone(),
            source,
        })?;
    let copyright = backend.read_copyright(&item.path).unwrap_or_default();
    let mut timings = BuildTimings {
        decode: started.elapsed(),
        ..BuildTimings::default()
    };

    let started = Instant::now();
    let small = build_rendition(ctx.small, item, &file_name, &decoded, backend, ctx)?;
    timings.small = started.elapsed();

    let started = Instant::now();
    let thumbnail = build_rendition(ctx.thumbnail, item, &file_name, &decoded, backend, ctx)?;
    timings.thumbnail = started.elapsed();

    let entry = PixEntry::from_records(
        file_name,
        decoded.dimensions(),
        &small,
        &thumbnail,
        copyright,
        item.position,
    );
    Ok(Built {
        entry,
        small,
        thumbnail,
        timings,
    })
}

/// Build one rendition of `decoded` as described by `spec`.
fn build_rendition(
    spec: RenditionSpec,
    item: &SourceItem,
    file_name: &str,
    decoded: &DecodedImage,
    backend: &impl ImageBackend,
    ctx: &BuildContext,
) -> Result<RenditionRecord, BuildError> {
    let name = naming::rendition_file_name(file_name, spec.kind);
    let path = ctx.output_dir.join(&name);
    let stale = needs_rebuild(&path, item.modified);
    if !stale {
        debug!("{} more recent than original {}", name, item.path.display());
    }

    let (width, height, status) = if spec.crop {
        let status = if stale {
            build_cropped(spec, &path, file_name, decoded, backend)?
        } else {
            RenditionStatus::Fresh
        };
        (spec.width, spec.height, status)
    } else if stale {
        info!("generating {} {name} for {file_name}", spec.kind.label());
        let scaled = backend.fit_within(&decoded.raster, spec.width, spec.height);
        encode(backend, &scaled, decoded.format, &path)?;
        (scaled.width(), scaled.height(), RenditionStatus::Encoded)
    } else {
        // Same fit rule the backend applies, without resampling
        let (w, h) = fit_within_dimensions(decoded.dimensions(), (spec.width, spec.height));
        (w, h, RenditionStatus::Fresh)
    };

    Ok(RenditionRecord {
        kind: spec.kind,
        file_name: name,
        width,
        height,
        status,
    })
}

/// Smart-crop, resize to the exact size and encode.
///
/// Only called for a stale output: the crop search is the most expensive
/// step of a build.
fn build_cropped(
    spec: RenditionSpec,
    path: &Path,
    file_name: &str,
    decoded: &DecodedImage,
    backend: &impl ImageBackend,
) -> Result<RenditionStatus, BuildError> {
    let region = backend
        .best_crop(&decoded.raster, spec.width, spec.height)
        .inspect(|rect| info!("the best crop for {file_name} is {rect:?}"))
        .and_then(|rect| backend.sub_image(&decoded.raster, rect));
    let Some(region) = region else {
        let kind = spec.kind.label();
        warn!("cannot crop {file_name}, {kind} not generated");
        return Ok(RenditionStatus::Unavailable);
    };
    let resized = backend.resize_exact(&region, spec.width, spec.height);
    encode(backend, &resized, decoded.format, path)?;
    Ok(RenditionStatus::Encoded)
}

fn encode(
    backend: &impl ImageBackend,
    img: &DynamicImage,
    format: ImageFormat,
    path: &Path,
) -> Result<(), BuildError> {
    backend
        .encode(img, format, path)
        .map_err(|source| BuildError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

/// Place the original next to its renditions: replace, hard-link, or copy.
///
/// A source that already lives at `dest` is left untouched.
fn publish_original(source: &Path, dest: &Path) -> io::Result<()> {
    if is_same_file(source, dest) {
        return Ok(());
    }
    match fs::remove_file(dest) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    if let Err(e) = fs::hard_link(source, dest) {
        debug!("hard link failed ({e}), copying {}", source.display());
        fs::copy(source, dest)?;
    }
    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{age, context, item, mtime, placeholder_sources};
    use tempfile::TempDir;

    fn built(outcome: BuildOutcome) -> Built {
        match outcome {
            BuildOutcome::Built(b) => *b,
            BuildOutcome::Skipped(reason) => panic!("unexpectedly skipped: {reason}"),
        }
    }

    #[test]
    fn builds_both_renditions_and_publishes_original() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(&tmp.path().join("src"), &["b.jpg"]);
        let out = tmp.path().join("out");
        let ctx = context(&out, (100, 100), (500, 500));
        let backend = MockBackend::new();

        let b = built(build(&sources[0], 4, &backend, &ctx).unwrap());

        assert_eq!(b.entry.filename, "b.jpg");
        assert_eq!(b.entry.small, "b_small.jpg");
        assert_eq!((b.entry.small_width, b.entry.small_height), (500, 375));
        assert_eq!(b.entry.thumbnail, "b_thm.jpg");
        assert_eq!((b.entry.thumb_width, b.entry.thumb_height), (100, 100));
        assert_eq!((b.entry.width, b.entry.height), (800, 600));
        assert_eq!(b.entry.position, 4);
        assert_eq!(b.small.status, RenditionStatus::Encoded);
        assert_eq!(b.thumbnail.status, RenditionStatus::Encoded);

        assert!(out.join("b.jpg").exists());
        assert!(out.join("b_small.jpg").exists());
        assert!(out.join("b_thm.jpg").exists());
    }

    #[test]
    fn records_operations_in_order() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        let ctx = context(&tmp.path().join("out"), (64, 64), (300, 200));
        let backend = MockBackend::new();

        build(&sources[0], 0, &backend, &ctx).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Decode("a.jpg".into()),
                RecordedOp::ReadCopyright("a.jpg".into()),
                RecordedOp::FitWithin {
                    max_w: 300,
                    max_h: 200
                },
                RecordedOp::Encode {
                    output: "a_small.jpg".into(),
                    format: ImageFormat::Jpeg
                },
                RecordedOp::BestCrop {
                    target_w: 64,
                    target_h: 64
                },
                RecordedOp::ResizeExact {
                    width: 64,
                    height: 64
                },
                RecordedOp::Encode {
                    output: "a_thm.jpg".into(),
                    format: ImageFormat::Jpeg
                },
            ]
        );
    }

    #[test]
    fn build_item_keeps_the_given_position() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.png"]);
        let ctx = context(&tmp.path().join("out"), (32, 32), (64, 64));
        let backend = MockBackend::new().with_dims("a.png", (40, 20));

        let b = build_item(&item(&sources[0], 9), &backend, &ctx).unwrap();
        assert_eq!(b.entry.position, 9);
        assert_eq!(b.entry.small, "a_small.png");
        // Already within the bound: no upscaling
        assert_eq!((b.entry.small_width, b.entry.small_height), (40, 20));
    }

    #[test]
    fn unprocessable_names_are_skipped_without_stat() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), (10, 10), (10, 10));
        let backend = MockBackend::new();

        for name in ["photo_small.jpg", "photo_thm.png", "notes.txt"] {
            // None of these exist: classification happens before any I/O
            let outcome = build(&tmp.path().join("missing").join(name), 0, &backend, &ctx);
            assert!(
                matches!(outcome, Ok(BuildOutcome::Skipped(_))),
                "{name}: {outcome:?}"
            );
        }
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn missing_source_is_a_stat_error() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(tmp.path(), (10, 10), (10, 10));
        let err = build(&tmp.path().join("gone.jpg"), 0, &MockBackend::new(), &ctx).unwrap_err();
        assert!(matches!(err, BuildError::Stat { .. }));
    }

    #[test]
    fn decode_failure_is_a_hard_error() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["bad.jpg"]);
        let ctx = context(&tmp.path().join("out"), (10, 10), (10, 10));
        let backend = MockBackend::new().failing_on("bad.jpg");

        let err = build(&sources[0], 0, &backend, &ctx).unwrap_err();
        assert!(matches!(err, BuildError::Decode { .. }));
        assert!(err.to_string().contains("bad.jpg"));
    }

    #[test]
    fn decode_error_names_the_source_once() {
        let tmp = TempDir::new().unwrap();
        let fake = tmp.path().join("fake.jpg");
        fs::write(&fake, "not image bytes").unwrap();
        let ctx = context(&tmp.path().join("out"), (10, 10), (10, 10));

        let err = build(&fake, 0, &RustBackend::new(), &ctx).unwrap_err();
        assert!(matches!(err, BuildError::Decode { .. }));
        assert_eq!(err.to_string().matches("fake.jpg").count(), 1, "{err}");
    }

    #[test]
    fn missing_copyright_is_empty() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        let ctx = context(&tmp.path().join("out"), (10, 10), (10, 10));

        let b = built(build(&sources[0], 0, &MockBackend::new(), &ctx).unwrap());
        assert_eq!(b.entry.copyright, "");
    }

    #[test]
    fn copyright_is_carried_into_entry() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        let ctx = context(&tmp.path().join("out"), (10, 10), (10, 10));
        let backend = MockBackend::new().with_copyright("a.jpg", "© Someone");

        let b = built(build(&sources[0], 0, &backend, &ctx).unwrap());
        assert_eq!(b.entry.copyright, "© Someone");
    }

    #[test]
    fn second_build_reuses_fresh_renditions() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        let ctx = context(&tmp.path().join("out"), (100, 100), (500, 500));

        build(&sources[0], 0, &MockBackend::new(), &ctx).unwrap();

        let backend = MockBackend::new();
        let b = built(build(&sources[0], 0, &backend, &ctx).unwrap());
        assert_eq!(b.small.status, RenditionStatus::Fresh);
        assert_eq!(b.thumbnail.status, RenditionStatus::Fresh);
        assert!(backend.encodes().is_empty());
        // Realized size is still reported for reused files
        assert_eq!((b.entry.small_width, b.entry.small_height), (500, 375));
        // The crop search is skipped entirely for a fresh thumbnail
        let crop_searches = backend
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::BestCrop { .. }))
            .count();
        assert_eq!(crop_searches, 0);
    }

    #[test]
    fn stale_small_rebuilds_only_small() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        let out = tmp.path().join("out");
        let ctx = context(&out, (100, 100), (500, 500));
        build(&sources[0], 0, &MockBackend::new(), &ctx).unwrap();

        // Small older than the (one hour old) source; thumbnail untouched
        age(&out.join("a_small.jpg"), 7200);
        let thumb_before = mtime(&out.join("a_thm.jpg"));

        let backend = MockBackend::new();
        let b = built(build(&sources[0], 0, &backend, &ctx).unwrap());
        assert_eq!(b.small.status, RenditionStatus::Encoded);
        assert_eq!(b.thumbnail.status, RenditionStatus::Fresh);
        assert_eq!(backend.encodes(), vec!["a_small.jpg".to_string()]);
        assert_eq!(mtime(&out.join("a_thm.jpg")), thumb_before);
    }

    #[test]
    fn refused_crop_leaves_thumbnail_unavailable() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        let out = tmp.path().join("out");
        let ctx = context(&out, (100, 100), (500, 500));
        let backend = MockBackend {
            refuse_crop: true,
            ..MockBackend::new()
        };

        let b = built(build(&sources[0], 0, &backend, &ctx).unwrap());
        assert_eq!(b.thumbnail.status, RenditionStatus::Unavailable);
        assert_eq!(b.entry.thumbnail, "a_thm.jpg");
        assert_eq!((b.entry.thumb_width, b.entry.thumb_height), (100, 100));
        assert!(!out.join("a_thm.jpg").exists());
        assert!(out.join("a_small.jpg").exists());
    }

    #[test]
    fn unsupported_format_is_a_hard_error_naming_it() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.png"]);
        let ctx = context(&tmp.path().join("out"), (10, 10), (10, 10));
        let backend = MockBackend {
            format: ImageFormat::Gif,
            ..MockBackend::new()
        };

        let err = build(&sources[0], 0, &backend, &ctx).unwrap_err();
        assert!(matches!(err, BuildError::Encode { .. }));
        assert!(err.to_string().contains("unexpected format: Gif"), "{err}");
    }

    #[test]
    fn existing_original_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let src_dir = tmp.path().join("src");
        let sources = placeholder_sources(&src_dir, &["a.jpg"]);
        fs::write(&sources[0], "new bytes").unwrap();
        let out = tmp.path().join("out");
        let ctx = context(&out, (10, 10), (10, 10));
        fs::write(out.join("a.jpg"), "old bytes").unwrap();

        build(&sources[0], 0, &MockBackend::new(), &ctx).unwrap();
        assert_eq!(fs::read_to_string(out.join("a.jpg")).unwrap(), "new bytes");
    }

    #[test]
    fn source_inside_output_dir_is_kept() {
        let tmp = TempDir::new().unwrap();
        let sources = placeholder_sources(tmp.path(), &["a.jpg"]);
        fs::write(&sources[0], "original").unwrap();
        let ctx = context(tmp.path(), (10, 10), (10, 10));

        build(&sources[0], 0, &MockBackend::new(), &ctx).unwrap();
        assert_eq!(fs::read_to_string(&sources[0]).unwrap(), "original");
    }
}
