//! Core accumulation logic.
//!
//! This module contains:
//! - The learning frame model and trajectory label derivation
//! - The sliding-window frame generator

pub mod frame;
pub mod generator;

// Re-export commonly used types
pub use frame::{ChassisFeature, Frame, LocalizationFeature, PathPoint, TrajectoryLabelPoint};
pub use generator::FeatureGenerator;
