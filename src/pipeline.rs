//! Wiring: record samples in, batch files out.
//!
//! One [`Pipeline`] owns a generator, a writer, and the run statistics for a
//! single input stream. Everything is synchronous: each sample runs at most
//! one frame close and at most one batch flush, in that order, before the
//! next sample is accepted.

use crate::config::Config;
use crate::core::generator::FeatureGenerator;
use crate::error::ExtractError;
use crate::reader::types::{ChassisSample, LocalizationSample, TelemetrySample};
use crate::stats::{ExtractionStats, RunSummary};
use crate::writer::{BatchWriter, FlushReport};
use tracing::{debug, warn};

pub struct Pipeline {
    generator: FeatureGenerator,
    writer: BatchWriter,
    stats: ExtractionStats,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        let stats = ExtractionStats::new();
        let writer = BatchWriter::new(
            &config.output_dir,
            config.frames_per_file,
            config.output_format(),
            stats.run_id(),
        );
        let generator = FeatureGenerator::new(
            config.label_sample_interval,
            config.trajectory_point_interval,
            config.move_window_step,
        );
        Self {
            generator,
            writer,
            stats,
        }
    }

    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Ingest one channel-tagged sample.
    pub fn ingest(&mut self, sample: TelemetrySample) -> Result<Option<FlushReport>, ExtractError> {
        match sample {
            TelemetrySample::Localization(s) => self.ingest_localization(s),
            TelemetrySample::Chassis(s) => {
                self.ingest_chassis(&s)?;
                Ok(None)
            }
        }
    }

    /// Ingest one localization sample; returns the flush report when this
    /// sample completed a batch.
    pub fn ingest_localization(
        &mut self,
        sample: LocalizationSample,
    ) -> Result<Option<FlushReport>, ExtractError> {
        self.stats.record_localization_sample();
        let closed = match self.generator.on_localization(sample) {
            Ok(closed) => closed,
            Err(e @ ExtractError::NoOpenFrame) => {
                warn!("dropping localization sample: {e}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(frame) = closed else {
            return Ok(None);
        };
        self.stats.record_frame_closed();

        let report = self.writer.on_frame_closed(frame)?;
        if let Some(ref report) = report {
            self.stats.record_file_written(report.frames);
        }
        Ok(report)
    }

    /// Ingest one chassis sample.
    pub fn ingest_chassis(&mut self, sample: &ChassisSample) -> Result<(), ExtractError> {
        self.stats.record_chassis_sample();
        if let Err(e) = self.generator.on_chassis(sample) {
            warn!("dropping chassis sample: {e}");
        }
        Ok(())
    }

    /// Note malformed input lines skipped by the reader.
    pub fn record_malformed_lines(&mut self, count: u64) {
        self.stats.record_malformed_lines(count);
    }

    /// End of stream: drop the open (label-less) frame, flush the remaining
    /// partial batch, and return the run summary.
    pub fn finalize(mut self) -> Result<RunSummary, ExtractError> {
        if self.generator.finish().is_some() {
            debug!("discarding open frame without labels at end of stream");
        }
        if let Some(report) = self.writer.finalize()? {
            self.stats.record_file_written(report.frames);
        }
        Ok(self.stats.to_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::types::Vector3;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn test_config(output_dir: PathBuf) -> Config {
        Config {
            output_dir,
            label_sample_interval: 4,
            frames_per_file: 2,
            trajectory_point_interval: 2,
            move_window_step: 2,
            binary_output: true,
        }
    }

    fn loc_at(x: f64) -> TelemetrySample {
        TelemetrySample::Localization(LocalizationSample {
            position: Vector3::new(x, 0.0, 0.0),
            ..Default::default()
        })
    }

    fn temp_output_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("drivelog-pipeline-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_close_then_flush_ordering() {
        let dir = temp_output_dir();
        let mut pipeline = Pipeline::new(&test_config(dir.clone()));

        // First window: frame closes, batch not yet full.
        for i in 0..4 {
            let report = pipeline.ingest(loc_at(i as f64)).unwrap();
            assert!(report.is_none());
        }
        assert_eq!(pipeline.stats().frames_closed(), 1);

        // Second window closes after two more samples (overlap = 2) and fills
        // the two-frame batch, triggering the flush on the same sample.
        pipeline.ingest(loc_at(4.0)).unwrap();
        let report = pipeline.ingest(loc_at(5.0)).unwrap().expect("flush expected");
        assert_eq!(report.frames, 2);
        assert_eq!(pipeline.stats().frames_closed(), 2);
        assert_eq!(pipeline.stats().frames_written(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_finalize_reports_exact_totals() {
        let dir = temp_output_dir();
        let mut pipeline = Pipeline::new(&test_config(dir.clone()));

        // Three closed frames: one full file of 2 plus a partial of 1.
        for i in 0..8 {
            pipeline.ingest(loc_at(i as f64)).unwrap();
        }
        let summary = pipeline.finalize().unwrap();
        assert_eq!(summary.frames_closed, 3);
        assert_eq!(summary.frames_written, 3);
        assert_eq!(summary.files_written, 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_finalize_with_no_closed_frames_writes_nothing() {
        let dir = temp_output_dir();
        let mut pipeline = Pipeline::new(&test_config(dir.clone()));

        pipeline.ingest(loc_at(0.0)).unwrap();
        let summary = pipeline.finalize().unwrap();
        assert_eq!(summary.frames_closed, 0);
        assert_eq!(summary.files_written, 0);
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

        std::fs::remove_dir_all(&dir).ok();
    }
}
