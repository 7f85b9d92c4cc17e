//! Telemetry sample types delivered by the record reader.
//!
//! These mirror the two input channels of the recorded stream: a localization
//! estimate (pose + motion) and a chassis report (driver inputs + gear).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 3-component vector in the map frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Magnitude in the ground plane (x, y only).
    pub fn planar_magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// One localization estimate: where the vehicle is and how it is moving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationSample {
    /// Timestamp when the estimate was produced
    pub timestamp: DateTime<Utc>,
    /// Position in the map frame (meters)
    pub position: Vector3,
    /// Heading (radians, map frame)
    pub heading: f64,
    /// Linear velocity (m/s)
    pub linear_velocity: Vector3,
    /// Linear acceleration (m/s^2)
    pub linear_acceleration: Vector3,
    /// Angular velocity (rad/s)
    pub angular_velocity: Vector3,
}

/// Transmission gear position reported by the chassis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearPosition {
    #[default]
    Neutral,
    Drive,
    Reverse,
    Parking,
    Low,
    Invalid,
}

/// One chassis report: speed, driver inputs, and gear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisSample {
    /// Timestamp when the report was produced
    pub timestamp: DateTime<Utc>,
    /// Vehicle speed (m/s)
    pub speed_mps: f64,
    /// Throttle pedal position (percent)
    pub throttle_percentage: f64,
    /// Brake pedal position (percent)
    pub brake_percentage: f64,
    /// Steering wheel position (percent, signed)
    pub steering_percentage: f64,
    /// Current gear
    pub gear_location: GearPosition,
}

/// Channel-tagged sample as it appears in a record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum TelemetrySample {
    Localization(LocalizationSample),
    Chassis(ChassisSample),
}

impl TelemetrySample {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TelemetrySample::Localization(s) => s.timestamp,
            TelemetrySample::Chassis(s) => s.timestamp,
        }
    }
}
