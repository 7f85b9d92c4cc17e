//! The learning frame: one unit of output.
//!
//! A frame bundles the latest localization and chassis feature snapshots with
//! the trajectory label points derived from the sample window at frame close.

use crate::reader::types::{ChassisSample, GearPosition, LocalizationSample, Vector3};
use serde::{Deserialize, Serialize};

/// A point on the labeled path: position plus heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub theta: f64,
}

/// One trajectory label point, derived from a single localization sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryLabelPoint {
    pub path_point: PathPoint,
    /// Speed magnitude in the ground plane (m/s)
    pub v: f64,
    /// Acceleration magnitude in the ground plane (m/s^2)
    pub a: f64,
}

impl TrajectoryLabelPoint {
    pub fn from_localization(sample: &LocalizationSample) -> Self {
        Self {
            path_point: PathPoint {
                x: sample.position.x,
                y: sample.position.y,
                z: sample.position.z,
                theta: sample.heading,
            },
            v: sample.linear_velocity.planar_magnitude(),
            a: sample.linear_acceleration.planar_magnitude(),
        }
    }
}

/// Latest localization state at frame close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationFeature {
    pub position: Vector3,
    pub heading: f64,
    pub linear_velocity: Vector3,
    pub linear_acceleration: Vector3,
    pub angular_velocity: Vector3,
}

impl LocalizationFeature {
    pub fn from_sample(sample: &LocalizationSample) -> Self {
        Self {
            position: sample.position,
            heading: sample.heading,
            linear_velocity: sample.linear_velocity,
            linear_acceleration: sample.linear_acceleration,
            angular_velocity: sample.angular_velocity,
        }
    }
}

/// Latest chassis state at frame close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisFeature {
    pub speed_mps: f64,
    pub throttle_percentage: f64,
    pub brake_percentage: f64,
    pub steering_percentage: f64,
    pub gear_location: GearPosition,
}

impl ChassisFeature {
    pub fn from_sample(sample: &ChassisSample) -> Self {
        Self {
            speed_mps: sample.speed_mps,
            throttle_percentage: sample.throttle_percentage,
            brake_percentage: sample.brake_percentage,
            steering_percentage: sample.steering_percentage,
            gear_location: sample.gear_location,
        }
    }
}

/// One learning data frame.
///
/// While open, the feature snapshots are overwritten by each incoming sample.
/// Label points are populated exactly once when the frame closes, after which
/// the frame is an immutable value queued for writing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Latest localization snapshot; unset until the first localization sample
    pub localization_feature: Option<LocalizationFeature>,
    /// Latest chassis snapshot; unset until the first chassis sample
    pub chassis_feature: Option<ChassisFeature>,
    /// Trajectory label points, in original time order
    pub label_trajectory_points: Vec<TrajectoryLabelPoint>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the localization snapshot with the latest sample.
    pub fn set_localization(&mut self, sample: &LocalizationSample) {
        self.localization_feature = Some(LocalizationFeature::from_sample(sample));
    }

    /// Overwrite the chassis snapshot with the latest sample.
    pub fn set_chassis(&mut self, sample: &ChassisSample) {
        self.chassis_feature = Some(ChassisFeature::from_sample(sample));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_point_derivation() {
        let sample = LocalizationSample {
            position: Vector3::new(1.0, 2.0, 3.0),
            heading: 0.5,
            linear_velocity: Vector3::new(3.0, 4.0, 99.0),
            linear_acceleration: Vector3::new(0.6, 0.8, -99.0),
            ..Default::default()
        };

        let point = TrajectoryLabelPoint::from_localization(&sample);
        assert_eq!(point.path_point.x, 1.0);
        assert_eq!(point.path_point.y, 2.0);
        assert_eq!(point.path_point.z, 3.0);
        assert_eq!(point.path_point.theta, 0.5);
        // z components must not contribute
        assert!((point.v - 5.0).abs() < 1e-12);
        assert!((point.a - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_overwrite_keeps_latest() {
        let mut frame = Frame::new();

        let first = ChassisSample {
            speed_mps: 1.0,
            ..Default::default()
        };
        let second = ChassisSample {
            speed_mps: 2.0,
            throttle_percentage: 30.0,
            ..Default::default()
        };

        frame.set_chassis(&first);
        frame.set_chassis(&second);

        let snapshot = frame.chassis_feature.unwrap();
        assert_eq!(snapshot.speed_mps, 2.0);
        assert_eq!(snapshot.throttle_percentage, 30.0);
    }

    #[test]
    fn test_new_frame_is_empty() {
        let frame = Frame::new();
        assert!(frame.localization_feature.is_none());
        assert!(frame.chassis_feature.is_none());
        assert!(frame.label_trajectory_points.is_empty());
    }
}
