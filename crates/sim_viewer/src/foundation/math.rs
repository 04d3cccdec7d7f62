//! Math utilities and types
//!
//! World-space values arrive from the simulation in double precision, so the
//! viewer works in `f64` throughout.

pub use nalgebra::{Matrix3, Quaternion, Rotation3, Unit, UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f64>;

/// Normalized RGB color, each channel in `[0, 1]`
pub type Rgb = Vector3<f64>;

/// Transform representing position, rotation, and uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Uniform scale factor
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position, rotation and scale
    pub fn new(position: Vec3, rotation: Quat, scale: f64) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * (point * self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f64 = 180.0 / std::f64::consts::PI;

    /// Below this magnitude a vector is treated as zero
    pub const EPSILON: f64 = 1e-9;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * constants::RAD_TO_DEG
    }

    /// Heading (yaw about +Z) of an orientation, in radians
    pub fn yaw(rotation: &Quat) -> f64 {
        let (_roll, _pitch, yaw) = rotation.euler_angles();
        yaw
    }

    /// Normalize a vector, or `None` if it is (numerically) zero
    pub fn try_normalize(v: &Vec3) -> Option<Vec3> {
        v.try_normalize(constants::EPSILON)
    }
}
