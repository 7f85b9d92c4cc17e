//! Record input for the extractor.
//!
//! The pipeline consumes already-decoded samples; this module owns the
//! decoding. Channel demultiplexing happens through the tagged
//! [`TelemetrySample`] representation in the record file itself.

pub mod jsonl;
pub mod types;

// Re-export commonly used types
pub use jsonl::RecordReader;
pub use types::{ChassisSample, GearPosition, LocalizationSample, TelemetrySample, Vector3};
