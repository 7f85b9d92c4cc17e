//! Frame and window accumulation.
//!
//! The generator owns the open frame and the sliding window of localization
//! samples. Every localization sample updates the open frame's snapshot and
//! grows the window; once the window reaches the label sample interval the
//! frame is labeled, closed, and handed back, and the window slides forward
//! by the configured step so consecutive frames share trailing context.

use crate::core::frame::{Frame, TrajectoryLabelPoint};
use crate::error::ExtractError;
use crate::reader::types::{ChassisSample, LocalizationSample};
use std::collections::VecDeque;
use tracing::debug;

/// Sliding-window frame accumulator.
///
/// Single-threaded and fully synchronous: each ingest call completes, closing
/// at most one frame, before the next sample is accepted. One instance per
/// input stream; nothing here is safe to share.
pub struct FeatureGenerator {
    /// Frame currently accepting feature updates. `None` only after
    /// [`FeatureGenerator::finish`], at which point ingest fails soft.
    current: Option<Frame>,
    /// Recent localization samples, oldest first.
    window: VecDeque<LocalizationSample>,
    /// Window length that triggers a frame close.
    label_sample_interval: usize,
    /// Stride for picking label points out of the window.
    trajectory_point_interval: usize,
    /// Samples evicted from the window front per close.
    move_window_step: usize,
}

impl FeatureGenerator {
    pub fn new(
        label_sample_interval: usize,
        trajectory_point_interval: usize,
        move_window_step: usize,
    ) -> Self {
        Self {
            current: Some(Frame::new()),
            window: VecDeque::with_capacity(label_sample_interval),
            label_sample_interval: label_sample_interval.max(1),
            trajectory_point_interval: trajectory_point_interval.max(1),
            move_window_step,
        }
    }

    /// Current window length.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Whether a frame is currently open.
    pub fn has_open_frame(&self) -> bool {
        self.current.is_some()
    }

    /// Ingest one localization sample.
    ///
    /// Overwrites the open frame's localization snapshot and appends the
    /// sample to the window. Returns the closed frame when this sample
    /// completes a label window.
    pub fn on_localization(
        &mut self,
        sample: LocalizationSample,
    ) -> Result<Option<Frame>, ExtractError> {
        let frame = self.current.as_mut().ok_or(ExtractError::NoOpenFrame)?;
        frame.set_localization(&sample);
        self.window.push_back(sample);

        if self.window.len() < self.label_sample_interval {
            return Ok(None);
        }

        let mut closed = self.current.take().ok_or(ExtractError::NoOpenFrame)?;
        closed.label_trajectory_points = self.sample_label_points();
        self.current = Some(Frame::new());

        // Slide, don't clear: trailing samples seed the next label window.
        let evict = self.move_window_step.min(self.window.len());
        self.window.drain(..evict);

        debug!(
            label_points = closed.label_trajectory_points.len(),
            window_remaining = self.window.len(),
            "frame closed"
        );
        Ok(Some(closed))
    }

    /// Ingest one chassis sample: overwrite the open frame's chassis snapshot.
    pub fn on_chassis(&mut self, sample: &ChassisSample) -> Result<(), ExtractError> {
        let frame = self.current.as_mut().ok_or(ExtractError::NoOpenFrame)?;
        frame.set_chassis(sample);
        Ok(())
    }

    /// End of stream: take the still-open frame out of the generator.
    ///
    /// The returned frame never received label points; callers normally
    /// discard it. Any ingest after this fails with `NoOpenFrame`.
    pub fn finish(&mut self) -> Option<Frame> {
        self.window.clear();
        self.current.take()
    }

    /// Pick every `trajectory_point_interval`-th window sample, front to
    /// back, index 0 always included.
    fn sample_label_points(&self) -> Vec<TrajectoryLabelPoint> {
        self.window
            .iter()
            .step_by(self.trajectory_point_interval)
            .map(TrajectoryLabelPoint::from_localization)
            .collect()
    }
}
