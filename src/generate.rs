//! Gallery page generation.
//!
//! Final step of a run: turns the ordered manifest into `index.html` plus the
//! viewer's static assets, all in the output directory next to the
//! renditions.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── index.html        # Thumbnail grid + embedded manifest JSON
//! ├── gallery.css       # Grid and viewer styles
//! ├── gallery.js        # Swipe/keyboard viewer
//! ├── dawn.jpg          # Published original
//! ├── dawn_small.jpg    # Large view
//! ├── dawn_thm.jpg      # Thumbnail
//! └── ...
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Every link in the grid works without JavaScript (it points at the small
//! rendition); `gallery.js` upgrades it to an in-page viewer driven by the
//! manifest embedded as `application/json`.

use crate::types::GalleryManifest;
use chrono::NaiveDateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timestamp format of [`TemplateInput::generated`].
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CSS: &str = include_str!("../static/gallery.css");
const JS: &str = include_str!("../static/gallery.js");

/// Everything the page renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateInput {
    pub title: String,
    pub generated: String,
    pub pix: GalleryManifest,
}

/// Bundle the manifest with the page title and generation time.
pub fn assemble(
    title: &str,
    manifest: GalleryManifest,
    generated_at: NaiveDateTime,
) -> TemplateInput {
    TemplateInput {
        title: title.to_string(),
        generated: generated_at.format(GENERATED_FORMAT).to_string(),
        pix: manifest,
    }
}

/// Write `index.html`, `gallery.css` and `gallery.js` into `output_dir`.
pub fn write_gallery(output_dir: &Path, input: &TemplateInput) -> Result<(), GenerateError> {
    fs::write(output_dir.join("gallery.css"), CSS)?;
    fs::write(output_dir.join("gallery.js"), JS)?;
    let page = render_index(input)?;
    fs::write(output_dir.join("index.html"), page.into_string())?;
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Manifest JSON safe to inline in a `<script>` element.
fn embedded_manifest(input: &TemplateInput) -> Result<String, GenerateError> {
    let json = serde_json::to_string(&input.pix)?;
    Ok(json.replace("</", "<\\/"))
}

fn thumbnail_grid(input: &TemplateInput) -> Markup {
    html! {
        main.thumbnail-grid {
            @for (index, pix) in input.pix.iter().enumerate() {
                figure.thumb {
                    a href=(pix.small)
                        data-index=(index)
                        data-width=(pix.small_width)
                        data-height=(pix.small_height)
                        data-original=(pix.filename) {
                        img src=(pix.thumbnail)
                            width=(pix.thumb_width)
                            height=(pix.thumb_height)
                            alt=(pix.filename)
                            loading="lazy";
                    }
                    @if !pix.copyright.is_empty() {
                        figcaption.copyright { (pix.copyright) }
                    }
                }
            }
        }
    }
}

fn viewer() -> Markup {
    html! {
        div.viewer id="viewer" hidden {
            button.viewer-close type="button" aria-label="Close" { "×" }
            button.viewer-prev type="button" aria-label="Previous" { "‹" }
            figure.viewer-frame {
                img.viewer-image alt="";
                figcaption.viewer-caption {
                    span.viewer-copyright {}
                    a.viewer-original { "original" }
                }
            }
            button.viewer-next type="button" aria-label="Next" { "›" }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

pub fn render_index(input: &TemplateInput) -> Result<Markup, GenerateError> {
    let manifest = embedded_manifest(input)?;
    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="generator" content="swipe-gal";
                title { (input.title) }
                link rel="stylesheet" href="gallery.css";
            }
            body {
                header.gallery-header {
                    h1 { (input.title) }
                    p.generated { "Generated " time { (input.generated) } }
                }
                (thumbnail_grid(input))
                (viewer())
                script id="gallery-data" type="application/json" { (PreEscaped(manifest)) }
                script src="gallery.js" {}
            }
        }
    })
}
