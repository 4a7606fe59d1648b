//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each source leads with its positional index (its place on the command
//! line) and file name. The full source path and the status of every
//! rendition follow as indented context lines, so the output reads as an
//! inventory of the gallery while still tracing back to specific files.
//!
//! # Output Format
//!
//! ## Build progress
//!
//! Lines arrive in completion order, not input order; the index keeps them
//! attributable.
//!
//! ```text
//! Building 3 sources on 3 workers
//!     002 b.jpg
//!         Source: shots/b.jpg
//!         small: encoded b_small.jpg 500x375
//!         thumbnail: fresh b_thm.jpg 100x100
//!     003 (notes.txt) skipped: unsupported extension .txt
//!     001 a.png
//!         ...
//! ```
//!
//! ## Summary
//!
//! ```text
//! Spring → out/index.html (2 photos)
//! Renditions: 1 encoded, 3 fresh (4 total)
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and are pure (no I/O), `print_*`
//! wrappers write them to stdout.

use crate::process::ProcessEvent;
use crate::staleness::RenditionStats;
use crate::types::{RenditionRecord, RenditionStatus};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 0-based position as a 1-based, 3-digit zero-padded index.
fn format_index(position: usize) -> String {
    format!("{:0>3}", position + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name_of(source_path: &str) -> String {
    Path::new(source_path)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_path.to_string())
}

fn status_label(status: RenditionStatus) -> &'static str {
    match status {
        RenditionStatus::Encoded => "encoded",
        RenditionStatus::Fresh => "fresh",
        RenditionStatus::Unavailable => "unavailable",
    }
}

/// ```text
/// small: encoded b_small.jpg 500x375
/// ```
fn rendition_line(record: &RenditionRecord) -> String {
    format!(
        "{}: {} {} {}x{}",
        record.kind.label(),
        status_label(record.status),
        record.file_name,
        record.width,
        record.height
    )
}

// ============================================================================
// Build progress
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { sources, workers } => {
            let noun = if *sources == 1 { "source" } else { "sources" };
            let wnoun = if *workers == 1 { "worker" } else { "workers" };
            vec![format!("Building {sources} {noun} on {workers} {wnoun}")]
        }
        ProcessEvent::Built {
            position,
            source_path,
            renditions,
        } => {
            let mut lines = vec![
                format!(
                    "{}{} {}",
                    indent(1),
                    format_index(*position),
                    file_name_of(source_path)
                ),
                format!("{}Source: {}", indent(2), source_path),
            ];
            lines.extend(
                renditions
                    .iter()
                    .map(|r| format!("{}{}", indent(2), rendition_line(r))),
            );
            lines
        }
        ProcessEvent::Skipped {
            position,
            source_path,
            reason,
        } => vec![format!(
            "{}{} ({}) skipped: {}",
            indent(1),
            format_index(*position),
            file_name_of(source_path),
            reason
        )],
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the end-of-run summary.
pub fn format_summary(
    title: &str,
    index_path: &Path,
    photos: usize,
    stats: &RenditionStats,
) -> Vec<String> {
    let noun = if photos == 1 { "photo" } else { "photos" };
    vec![
        format!(
            "{} \u{2192} {} ({} {})",
            title,
            index_path.display(),
            photos,
            noun
        ),
        format!("Renditions: {}", stats),
    ]
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(title: &str, index_path: &Path, photos: usize, stats: &RenditionStats) {
    for line in format_summary(title, index_path, photos, stats) {
        println!("{}", line);
    }
}
