//! Timestamp-based rebuild policy for renditions.
//!
//! Encoding is the expensive part of a run, so each rendition file is only
//! written when it is older than its source. The check is purely on
//! modification times: no content hashing, no sidecar cache manifest. A
//! touched-but-unchanged source therefore forces a regeneration, which is
//! wasteful but never serves stale pixels.
//!
//! An output whose mtime *equals* the source mtime is considered stale. On
//! coarse-timestamp filesystems a source edited within the same tick as the
//! last build would otherwise be missed.
//!
//! The small and thumbnail renditions of one source are checked
//! independently; one may be rebuilt while the other is reused.

use crate::types::RenditionStatus;
use std::fmt;
use std::path::Path;
use std::time::SystemTime;

/// Whether `output` must be (re)built for a source last modified at `source_modified`.
///
/// - missing (or unstatable) output → rebuild
/// - output mtime not strictly after the source → rebuild
/// - otherwise → reuse
pub fn needs_rebuild(output: &Path, source_modified: SystemTime) -> bool {
    match std::fs::metadata(output).and_then(|m| m.modified()) {
        Ok(output_modified) => output_modified <= source_modified,
        Err(_) => true,
    }
}

/// Per-run tally of rendition work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenditionStats {
    pub encoded: u32,
    pub fresh: u32,
    pub unavailable: u32,
}

impl RenditionStats {
    pub fn encoded(&mut self) {
        self.encoded += 1;
    }

    pub fn fresh(&mut self) {
        self.fresh += 1;
    }

    pub fn unavailable(&mut self) {
        self.unavailable += 1;
    }

    pub fn record(&mut self, status: RenditionStatus) {
        match status {
            RenditionStatus::Encoded => self.encoded(),
            RenditionStatus::Fresh => self.fresh(),
            RenditionStatus::Unavailable => self.unavailable(),
        }
    }

    pub fn total(&self) -> u32 {
        self.encoded + self.fresh + self.unavailable
    }
}

impl fmt::Display for RenditionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fresh == 0 && self.unavailable == 0 {
            return write!(f, "{} encoded", self.encoded);
        }
        write!(f, "{} encoded, {} fresh", self.encoded, self.fresh)?;
        if self.unavailable > 0 {
            write!(f, ", {} unavailable", self.unavailable)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
