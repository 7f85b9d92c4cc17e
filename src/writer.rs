//! Batch accumulation and rotating file output.
//!
//! Closed frames queue up in an in-memory batch; once the batch reaches the
//! configured per-file frame count it is serialized to the next file index.
//! The file index and the cumulative frame total are instance fields so that
//! independent pipelines never share state.

use crate::core::frame::Frame;
use crate::error::ExtractError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// The current batch file format version.
pub const BATCH_FORMAT_VERSION: u16 = 1;

/// File stem shared by all batch files of a run.
pub const BATCH_FILE_STEM: &str = "learning_data";

/// Output serialization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// bincode payload, `.bin` suffix
    Binary,
    /// pretty-printed JSON payload, `.json` suffix
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Binary => "bin",
            OutputFormat::Text => "json",
        }
    }
}

/// On-disk representation of one flushed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFile {
    /// Batch format version
    pub format_version: u16,
    /// Id of the extraction run that produced this file
    pub extraction_id: Uuid,
    /// When this file was written
    pub produced_at: DateTime<Utc>,
    /// Zero-based index of this file within the run
    pub file_index: u64,
    /// Closed frames, oldest first
    pub frames: Vec<Frame>,
}

impl BatchFile {
    /// Read a batch file back, inferring the form from its extension.
    pub fn read(path: &Path) -> Result<Self, ExtractError> {
        let bytes = fs::read(path)?;
        let is_text = path.extension().map(|e| e == "json").unwrap_or(false);
        let batch = if is_text {
            serde_json::from_slice(&bytes)?
        } else {
            bincode::deserialize(&bytes)?
        };
        Ok(batch)
    }
}

/// Report for one completed flush.
#[derive(Debug, Clone)]
pub struct FlushReport {
    pub path: PathBuf,
    pub file_index: u64,
    pub frames: usize,
}

/// Accumulates closed frames and rotates output files.
pub struct BatchWriter {
    output_dir: PathBuf,
    frames_per_file: usize,
    format: OutputFormat,
    extraction_id: Uuid,
    batch: Vec<Frame>,
    file_index: u64,
    total_frames_written: u64,
}

impl BatchWriter {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        frames_per_file: usize,
        format: OutputFormat,
        extraction_id: Uuid,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            frames_per_file: frames_per_file.max(1),
            format,
            extraction_id,
            batch: Vec::new(),
            file_index: 0,
            total_frames_written: 0,
        }
    }

    /// Frames currently queued and not yet flushed.
    pub fn pending_frames(&self) -> usize {
        self.batch.len()
    }

    /// Next file index to be written.
    pub fn file_index(&self) -> u64 {
        self.file_index
    }

    /// Frames flushed to disk so far, across all files.
    pub fn total_frames_written(&self) -> u64 {
        self.total_frames_written
    }

    /// Queue a closed frame; flush when the batch is full.
    ///
    /// On a failed flush the batch is retained and the error propagates, so a
    /// later frame (or finalize) retries the same file index.
    pub fn on_frame_closed(&mut self, frame: Frame) -> Result<Option<FlushReport>, ExtractError> {
        self.batch.push(frame);
        if self.batch.len() >= self.frames_per_file {
            return self.flush().map(Some);
        }
        Ok(None)
    }

    /// End of stream: flush whatever remains, if anything.
    pub fn finalize(&mut self) -> Result<Option<FlushReport>, ExtractError> {
        if self.batch.is_empty() {
            return Ok(None);
        }
        self.flush().map(Some)
    }

    fn flush(&mut self) -> Result<FlushReport, ExtractError> {
        let path = self.output_dir.join(format!(
            "{}.{}.{}",
            BATCH_FILE_STEM,
            self.file_index,
            self.format.extension()
        ));

        let batch_file = BatchFile {
            format_version: BATCH_FORMAT_VERSION,
            extraction_id: self.extraction_id,
            produced_at: Utc::now(),
            file_index: self.file_index,
            frames: std::mem::take(&mut self.batch),
        };

        let bytes: Result<Vec<u8>, ExtractError> = match self.format {
            OutputFormat::Binary => bincode::serialize(&batch_file).map_err(ExtractError::from),
            OutputFormat::Text => serde_json::to_vec_pretty(&batch_file).map_err(ExtractError::from),
        };
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => {
                // Put the frames back so the flush can be retried.
                self.batch = batch_file.frames;
                return Err(e);
            }
        };

        // Write through a temp file and rename so a crash or I/O failure
        // never leaves a readable-but-corrupt batch at the final path.
        let tmp_path = path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp_path, &bytes).and_then(|_| fs::rename(&tmp_path, &path)) {
            fs::remove_file(&tmp_path).ok();
            self.batch = batch_file.frames;
            return Err(e.into());
        }

        let frames = batch_file.frames.len();
        self.total_frames_written += frames as u64;
        self.file_index += 1;

        info!(path = %path.display(), frames, total = self.total_frames_written, "batch flushed");
        Ok(FlushReport {
            path,
            file_index: self.file_index - 1,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::types::ChassisSample;

    fn test_output_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("drivelog-writer-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn frame_with_speed(speed: f64) -> Frame {
        let mut frame = Frame::new();
        frame.set_chassis(&ChassisSample {
            speed_mps: speed,
            ..Default::default()
        });
        frame
    }

    #[test]
    fn test_flush_at_capacity_and_rotate() {
        let dir = test_output_dir();
        let mut writer = BatchWriter::new(&dir, 2, OutputFormat::Binary, Uuid::new_v4());

        assert!(writer.on_frame_closed(frame_with_speed(1.0)).unwrap().is_none());
        let report = writer
            .on_frame_closed(frame_with_speed(2.0))
            .unwrap()
            .expect("second frame fills the batch");

        assert_eq!(report.file_index, 0);
        assert_eq!(report.frames, 2);
        assert_eq!(writer.pending_frames(), 0);
        assert_eq!(writer.file_index(), 1);
        assert_eq!(writer.total_frames_written(), 2);
        assert!(report.path.ends_with("learning_data.0.bin"));

        let batch = BatchFile::read(&report.path).unwrap();
        assert_eq!(batch.format_version, BATCH_FORMAT_VERSION);
        assert_eq!(batch.file_index, 0);
        assert_eq!(batch.frames.len(), 2);
        assert_eq!(batch.frames[1].chassis_feature.as_ref().unwrap().speed_mps, 2.0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_finalize_flushes_partial_batch() {
        let dir = test_output_dir();
        let mut writer = BatchWriter::new(&dir, 10, OutputFormat::Text, Uuid::new_v4());

        writer.on_frame_closed(frame_with_speed(3.0)).unwrap();
        let report = writer.finalize().unwrap().expect("partial batch flushes");

        assert_eq!(report.frames, 1);
        assert!(report.path.ends_with("learning_data.0.json"));
        assert_eq!(writer.total_frames_written(), 1);

        // Text form is plain JSON and reads back.
        let batch = BatchFile::read(&report.path).unwrap();
        assert_eq!(batch.frames.len(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_finalize_with_empty_batch_is_noop() {
        let dir = test_output_dir();
        let mut writer = BatchWriter::new(&dir, 2, OutputFormat::Binary, Uuid::new_v4());

        assert!(writer.finalize().unwrap().is_none());
        assert_eq!(writer.file_index(), 0);
        assert_eq!(writer.total_frames_written(), 0);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_flush_retains_batch() {
        // Nonexistent directory: the write fails, the frames stay queued.
        let dir = std::env::temp_dir()
            .join(format!("drivelog-writer-missing-{}", Uuid::new_v4()))
            .join("nested");
        let mut writer = BatchWriter::new(&dir, 1, OutputFormat::Binary, Uuid::new_v4());

        let err = writer.on_frame_closed(frame_with_speed(1.0)).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
        assert_eq!(writer.pending_frames(), 1);
        assert_eq!(writer.file_index(), 0);
        assert_eq!(writer.total_frames_written(), 0);

        // Once the directory exists, finalize retries the same index.
        fs::create_dir_all(&dir).unwrap();
        let report = writer.finalize().unwrap().unwrap();
        assert_eq!(report.file_index, 0);
        assert_eq!(report.frames, 1);

        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let dir = test_output_dir();
        let mut writer = BatchWriter::new(&dir, 1, OutputFormat::Binary, Uuid::new_v4());
        writer.on_frame_closed(frame_with_speed(1.0)).unwrap();
        writer.on_frame_closed(frame_with_speed(2.0)).unwrap();

        let names: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".bin")));

        fs::remove_dir_all(&dir).ok();
    }
}
