//! # Swipe Gal
//!
//! Turns a list of photos into a static, swipeable gallery. Every source
//! image gets two renditions, a proportionally bounded large view and a
//! smart-cropped thumbnail, and `index.html` lists them in command-line
//! order.
//!
//! # Architecture: Ordered Fan-Out
//!
//! ```text
//! sources ──▶ process::run ──▶ rendition::build ×N (parallel) ──▶ reorder
//!                                                                   │
//!                    generate::write_gallery ◀── generate::assemble ◀┘
//! ```
//!
//! - One build task per source, all dispatched at once on a dedicated rayon
//!   pool. Tasks share nothing mutable; each returns a tagged result over a
//!   channel sized to the source count.
//! - Results are reassembled by input position, so the gallery order never
//!   depends on which photo finished encoding first.
//! - A hard error in any task fails the whole run and `index.html` is not
//!   written. Whatever renditions were finished stay on disk and are reused
//!   on the next run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Orchestrator: fan-out, fan-in, reordering, failure policy |
//! | [`rendition`] | Per-source builder: classify, publish original, small view, thumbnail |
//! | [`staleness`] | Timestamp rebuild policy and per-run rendition tallies |
//! | [`naming`] | Source classification and `_small` / `_thm` file names |
//! | [`imaging`] | `ImageBackend` trait, `image`-crate backend, smart crop, copyright reader |
//! | [`generate`] | Manifest assembly and the Maud-rendered gallery page |
//! | [`config`] | Layered TOML configuration (defaults, file, flags) |
//! | [`output`] | CLI progress and summary formatting |
//! | [`profile`] | `--cpuprofile` build-timing JSON |
//! | [`types`] | Shared data types: sources, rendition specs and records, manifest rows |
//!
//! # Design Decisions
//!
//! ## Timestamps, Not Hashes
//!
//! A rendition is rebuilt when it is not strictly newer than its source.
//! There is no cache manifest to corrupt or migrate: deleting a rendition or
//! touching a source is all it takes to force a rebuild. The small view and
//! the thumbnail are judged independently.
//!
//! ## Same Format In, Same Format Out
//!
//! JPEG sources produce JPEG renditions and PNG sources produce PNG
//! renditions. No format negotiation, and PNG transparency survives.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3), smart cropping and encoding all run on
//! the `image` crate. No ImageMagick, no system libraries: the binary is
//! self-contained.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod profile;
pub mod rendition;
pub mod staleness;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
