use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Mul, Neg};

use super::vector::Vec3;
use crate::error::KernelError;

/// A rotation quaternion `(x, y, z, w)`.
///
/// Unit length for pure rotations. `q` and `-q` describe the same rotation,
/// which matters only for interpolation (see [`Quaternion::slerp`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` degrees about `axis`. The angle is reduced modulo
    /// 360 (keeping its sign) before conversion.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Result<Self, KernelError> {
        let axis = axis
            .normalized()
            .ok_or(KernelError::ZeroLengthVector { what: "rotation axis" })?;
        let half = (angle % 360.0).to_radians() * 0.5;
        let v = axis * half.sin();
        Ok(Self::new(v.x, v.y, v.z, half.cos()))
    }

    /// Unit rotation axis. The identity rotation reports `+Y`.
    pub fn axis(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
            .normalized()
            .unwrap_or(Vec3::Y)
    }

    /// Rotation angle in degrees, in `[0, 360]`.
    pub fn angle(&self) -> f64 {
        let sin_half = Vec3::new(self.x, self.y, self.z).length();
        sin_half.atan2(self.w) * (360.0 / PI)
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0 && self.w == 1.0
    }

    pub fn is_normalized(&self) -> bool {
        approx::relative_eq!(self.length_squared(), 1.0, epsilon = 1e-12)
    }

    pub fn normalized(&self) -> Result<Self, KernelError> {
        let len = self.length();
        if len < 1e-15 || !len.is_finite() {
            return Err(KernelError::InvalidArgument {
                name: "quaternion",
                reason: format!("cannot normalize quaternion of length {len}"),
            });
        }
        Ok(self.scaled(1.0 / len))
    }

    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse: the conjugate divided by the squared length.
    pub fn inverse(&self) -> Result<Self, KernelError> {
        let len2 = self.length_squared();
        if len2 == 0.0 || !len2.is_finite() {
            return Err(KernelError::InvalidArgument {
                name: "quaternion",
                reason: "zero quaternion has no inverse".to_string(),
            });
        }
        Ok(self.conjugate().scaled(1.0 / len2))
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    fn scaled(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    /// Spherical interpolation from `from` (t = 0) to `to` (t = 1).
    ///
    /// With `use_shortest_path` the sign of `to` is flipped when needed so the
    /// arc covers at most 180 degrees. Lengths are interpolated
    /// geometrically, so unit inputs give a unit result.
    pub fn slerp(from: &Self, to: &Self, t: f64, use_shortest_path: bool) -> Result<Self, KernelError> {
        const MAX_COSINE: f64 = 1.0 - 1e-6;
        const MIN_COSINE: f64 = 1e-10 - 1.0;

        let length_from = from.length();
        let length_to = to.length();
        if length_from == 0.0 || length_to == 0.0 {
            return Err(KernelError::InvalidArgument {
                name: "quaternion",
                reason: "cannot interpolate a zero quaternion".to_string(),
            });
        }
        let from = from.scaled(1.0 / length_from);
        let mut to = to.scaled(1.0 / length_to);

        let mut cos_omega = from.dot(&to);
        if use_shortest_path && cos_omega < 0.0 {
            cos_omega = -cos_omega;
            to = -to;
        }
        let cos_omega = cos_omega.clamp(-1.0, 1.0);

        let (scale_from, scale_to) = if cos_omega > MAX_COSINE {
            (1.0 - t, t)
        } else if cos_omega < MIN_COSINE {
            // Opposite quaternions: route through a perpendicular one.
            to = Self::new(-from.y, from.x, -from.w, from.z);
            let theta = t * PI;
            (theta.cos(), theta.sin())
        } else {
            let omega = cos_omega.acos();
            let sin_omega = (1.0 - cos_omega * cos_omega).sqrt();
            (
                ((1.0 - t) * omega).sin() / sin_omega,
                (t * omega).sin() / sin_omega,
            )
        };

        let length_out = length_from * (length_to / length_from).powf(t);
        let (scale_from, scale_to) = (scale_from * length_out, scale_to * length_out);
        Ok(Self::new(
            scale_from * from.x + scale_to * to.x,
            scale_from * from.y + scale_to * to.y,
            scale_from * from.z + scale_to * to.z,
            scale_from * from.w + scale_to * to.w,
        ))
    }
}

/// Hamilton product. `a * b` rotates by `b` first, then by `a`.
impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        let (x1, y1, z1, w1) = (self.x, self.y, self.z, self.w);
        let (x2, y2, z2, w2) = (rhs.x, rhs.y, rhs.z, rhs.w);
        Self::new(
            w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
            w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
            w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
            w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_angle_matches_manual_components() {
        let q = Quaternion::from_axis_angle(Vec3::Y, -90.0).unwrap();
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!((q.y + half).abs() < 1e-15);
        assert!((q.w - half).abs() < 1e-15);
        assert_eq!(q.x, 0.0);
        assert_eq!(q.z, 0.0);
    }

    #[test]
    fn test_negative_angle_reports_flipped_axis() {
        let q = Quaternion::from_axis_angle(Vec3::Y, -90.0).unwrap();
        let axis = q.axis();
        assert!((axis.y + 1.0).abs() < 1e-15);
        assert!((q.angle() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_reduced_modulo_360() {
        let a = Quaternion::from_axis_angle(Vec3::Z, 30.0).unwrap();
        let b = Quaternion::from_axis_angle(Vec3::Z, 390.0).unwrap();
        assert!((a.z - b.z).abs() < 1e-12);
        assert!((a.w - b.w).abs() < 1e-12);
    }

    #[test]
    fn test_identity_axis_is_y() {
        assert_eq!(Quaternion::IDENTITY.axis(), Vec3::Y);
        assert_eq!(Quaternion::IDENTITY.angle(), 0.0);
    }

    #[test]
    fn test_zero_axis_rejected() {
        assert!(matches!(
            Quaternion::from_axis_angle(Vec3::ZERO, 10.0),
            Err(KernelError::ZeroLengthVector { .. })
        ));
    }

    #[test]
    fn test_inverse_cancels() {
        let q = Quaternion::new(0.1, -0.7, 0.3, 0.4);
        let r = q * q.inverse().unwrap();
        assert!(r.x.abs() < 1e-12 && r.y.abs() < 1e-12 && r.z.abs() < 1e-12);
        assert!((r.w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(Vec3::Z, 90.0).unwrap();
        let start = Quaternion::slerp(&a, &b, 0.0, true).unwrap();
        let end = Quaternion::slerp(&a, &b, 1.0, true).unwrap();
        let mid = Quaternion::slerp(&a, &b, 0.5, true).unwrap();
        assert!((start.w - 1.0).abs() < 1e-12);
        assert!((end.z - b.z).abs() < 1e-12 && (end.w - b.w).abs() < 1e-12);
        assert!((mid.angle() - 45.0).abs() < 1e-9);
        assert!(mid.is_normalized());
    }

    #[test]
    fn test_slerp_shortest_path_handles_double_cover() {
        let a = Quaternion::from_axis_angle(Vec3::Z, 10.0).unwrap();
        let b = -Quaternion::from_axis_angle(Vec3::Z, 30.0).unwrap();
        let short = Quaternion::slerp(&a, &b, 0.5, true).unwrap();
        assert!((short.angle() - 20.0).abs() < 1e-9);
        let long = Quaternion::slerp(&a, &b, 0.5, false).unwrap();
        assert!((long.angle() - 20.0).abs() > 1.0);
    }
}
