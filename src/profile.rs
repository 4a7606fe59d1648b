//! Build timing profile written by `--cpuprofile`.
//!
//! Records wall time per phase for every built source plus the whole run, as
//! pretty-printed JSON. Enough to see which sources dominate a slow build
//! without attaching an external profiler.

use crate::rendition::BuildTimings;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Phase timings of one built source, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTiming {
    pub position: usize,
    pub file_name: String,
    pub decode_ms: f64,
    pub small_ms: f64,
    pub thumbnail_ms: f64,
}

impl ItemTiming {
    pub fn new(position: usize, file_name: &str, timings: &BuildTimings) -> Self {
        Self {
            position,
            file_name: file_name.to_string(),
            decode_ms: millis(timings.decode),
            small_ms: millis(timings.small),
            thumbnail_ms: millis(timings.thumbnail),
        }
    }

    pub fn total_ms(&self) -> f64 {
        self.decode_ms + self.small_ms + self.thumbnail_ms
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildProfile {
    pub workers: usize,
    pub total_ms: f64,
    /// In input order.
    pub items: Vec<ItemTiming>,
}

impl BuildProfile {
    pub fn new(workers: usize, total: Duration, items: Vec<ItemTiming>) -> Self {
        Self {
            workers,
            total_ms: millis(total),
            items,
        }
    }

    /// The single slowest source, if anything was built.
    pub fn slowest(&self) -> Option<&ItemTiming> {
        self.items
            .iter()
            .max_by(|a, b| a.total_ms().total_cmp(&b.total_ms()))
    }

    pub fn write(&self, path: &Path) -> Result<(), ProfileError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
