//! Drivelog Extractor - offline feature/label extraction for driving data.
//!
//! This library converts a time-ordered stream of vehicle telemetry samples
//! (localization + chassis) into discretely-batched, file-persisted training
//! records for a downstream learning system.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Drivelog Extractor                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │   Reader   │──▶│  Generator   │──▶│ Batch Writer │──▶ files
//! │  │  (JSONL)   │   │ (window +    │   │ (rotating    │        │
//! │  └────────────┘   │  open frame) │   │  file index) │        │
//! │                   └──────────────┘   └──────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The middle stage owns a sliding window over recent localization samples.
//! When the window reaches the label sample interval, the open frame is
//! stride-sampled into trajectory label points, closed, and queued; the
//! window then slides forward by the move step so consecutive frames share
//! trailing context. Everything is single-threaded and synchronous; use one
//! [`Pipeline`] per input stream.
//!
//! # Example
//!
//! ```no_run
//! use drivelog_extractor::{Config, Pipeline, RecordReader};
//!
//! let config = Config::default();
//! let mut pipeline = Pipeline::new(&config);
//!
//! let mut reader = RecordReader::open("drive.jsonl").expect("record file");
//! while let Some(sample) = reader.next_sample() {
//!     pipeline.ingest(sample).expect("ingest failed");
//! }
//! let summary = pipeline.finalize().expect("finalize failed");
//! println!("wrote {} frames", summary.frames_written);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod stats;
pub mod writer;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{ChassisFeature, FeatureGenerator, Frame, LocalizationFeature, TrajectoryLabelPoint};
pub use error::ExtractError;
pub use pipeline::Pipeline;
pub use reader::{
    ChassisSample, GearPosition, LocalizationSample, RecordReader, TelemetrySample, Vector3,
};
pub use stats::{ExtractionStats, RunSummary};
pub use writer::{BatchFile, BatchWriter, FlushReport, OutputFormat};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
