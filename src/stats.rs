//! Per-run extraction statistics.
//!
//! Tracks what one extraction run consumed and produced, prints a human
//! summary at the end, and persists a machine-readable run summary next to
//! the output files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Counters for one extraction run. Plain fields: the pipeline is
/// single-threaded and owns its stats exclusively.
#[derive(Debug)]
pub struct ExtractionStats {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    localization_samples: u64,
    chassis_samples: u64,
    malformed_lines: u64,
    frames_closed: u64,
    files_written: u64,
    frames_written: u64,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            localization_samples: 0,
            chassis_samples: 0,
            malformed_lines: 0,
            frames_closed: 0,
            files_written: 0,
            frames_written: 0,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record_localization_sample(&mut self) {
        self.localization_samples += 1;
    }

    pub fn record_chassis_sample(&mut self) {
        self.chassis_samples += 1;
    }

    pub fn record_malformed_lines(&mut self, count: u64) {
        self.malformed_lines += count;
    }

    pub fn record_frame_closed(&mut self) {
        self.frames_closed += 1;
    }

    pub fn record_file_written(&mut self, frames: usize) {
        self.files_written += 1;
        self.frames_written += frames as u64;
    }

    pub fn frames_closed(&self) -> u64 {
        self.frames_closed
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Freeze the counters into a serializable summary.
    pub fn to_summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            localization_samples: self.localization_samples,
            chassis_samples: self.chassis_samples,
            malformed_lines: self.malformed_lines,
            frames_closed: self.frames_closed,
            files_written: self.files_written,
            frames_written: self.frames_written,
        }
    }

    /// Human-readable summary for the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "Extraction run {}:\n\
             - Localization samples: {}\n\
             - Chassis samples: {}\n\
             - Malformed record lines skipped: {}\n\
             - Frames closed: {}\n\
             - Files written: {}\n\
             - Total frames written: {}",
            self.run_id,
            self.localization_samples,
            self.chassis_samples,
            self.malformed_lines,
            self.frames_closed,
            self.files_written,
            self.frames_written
        )
    }
}

impl Default for ExtractionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted record of one finished extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub localization_samples: u64,
    pub chassis_samples: u64,
    pub malformed_lines: u64,
    pub frames_closed: u64,
    pub files_written: u64,
    pub frames_written: u64,
}

impl RunSummary {
    /// Write the summary as JSON into the given directory.
    pub fn save(&self, dir: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(dir.join("extraction_summary.json"), json)
    }
}
