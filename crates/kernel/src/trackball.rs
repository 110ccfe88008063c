//! Arcball-style trackball: turns 2D drags over a viewport into a rotation.
//!
//! A pixel is projected onto a unit hemisphere spanning the viewport; a
//! drag rotates the model by the arc between the previous and current
//! sphere points. Zoom is a uniform scale driven by vertical drags.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::KernelError;
use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::quaternion::Quaternion;
use crate::geometry::transform::{Rotation3D, Transform3D};
use crate::geometry::vector::Vec3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trackball {
    width: f64,
    height: f64,
    orientation: Quaternion,
    zoom: f64,
    previous: Option<Vec3>,
    previous_zoom_y: Option<f64>,
}

impl Trackball {
    pub fn new(width: f64, height: f64) -> Result<Self, KernelError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(KernelError::EmptyViewport { width, height });
        }
        Ok(Self {
            width,
            height,
            orientation: Quaternion::IDENTITY,
            zoom: 1.0,
            previous: None,
            previous_zoom_y: None,
        })
    }

    /// Point on the unit hemisphere under `pixel`; pixels outside the
    /// inscribed circle land on its rim.
    pub fn project_to_sphere(&self, pixel: Point2d) -> Vec3 {
        let x = pixel.x / (self.width / 2.0) - 1.0;
        let y = 1.0 - pixel.y / (self.height / 2.0);
        let z2 = 1.0 - x * x - y * y;
        let z = if z2 > 0.0 { z2.sqrt() } else { 0.0 };
        Vec3::new(x, y, z)
    }

    pub fn begin_rotate(&mut self, pixel: Point2d) {
        self.previous = Some(self.project_to_sphere(pixel));
    }

    /// Rotate by the arc from the last drag position to `pixel` and return
    /// the incremental rotation. A drag without `begin_rotate` only records
    /// the position.
    pub fn drag_rotate(&mut self, pixel: Point2d) -> Quaternion {
        let current = self.project_to_sphere(pixel);
        let Some(previous) = self.previous.replace(current) else {
            return Quaternion::IDENTITY;
        };
        let from = Vector3::new(previous.x, previous.y, previous.z);
        let to = Vector3::new(current.x, current.y, current.z);
        // None for a zero-length arc or exactly opposite points.
        let Some(delta) = UnitQuaternion::rotation_between(&from, &to) else {
            return Quaternion::IDENTITY;
        };
        let delta = Quaternion::new(delta.i, delta.j, delta.k, delta.w);
        self.orientation = delta * self.orientation;
        debug!(angle = delta.angle(), "trackball rotated");
        delta
    }

    pub fn end_rotate(&mut self) {
        self.previous = None;
    }

    pub fn begin_zoom(&mut self, pixel: Point2d) {
        self.previous_zoom_y = Some(pixel.y);
    }

    /// Dragging down by 100 pixels scales by `e`.
    pub fn drag_zoom(&mut self, pixel: Point2d) -> f64 {
        if let Some(previous) = self.previous_zoom_y.replace(pixel.y) {
            self.zoom *= ((pixel.y - previous) / 100.0).exp();
        }
        self.zoom
    }

    pub fn end_zoom(&mut self) {
        self.previous_zoom_y = None;
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Scale, then rotate, both about the origin.
    pub fn transform(&self) -> Transform3D {
        Transform3D::Group(vec![
            Transform3D::scale(self.zoom, self.zoom, self.zoom),
            Transform3D::rotate_at(Rotation3D::Quaternion(self.orientation), Point3d::ORIGIN),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_pole() {
        let tb = Trackball::new(200.0, 100.0).unwrap();
        assert_eq!(tb.project_to_sphere(Point2d::new(100.0, 50.0)), Vec3::new(0.0, 0.0, 1.0));
        let rim = tb.project_to_sphere(Point2d::new(200.0, 0.0));
        assert_eq!(rim.z, 0.0);
    }

    #[test]
    fn test_horizontal_drag_rotates_about_y() {
        let mut tb = Trackball::new(200.0, 200.0).unwrap();
        tb.begin_rotate(Point2d::new(100.0, 100.0));
        let delta = tb.drag_rotate(Point2d::new(150.0, 100.0));
        let axis = delta.axis();
        assert!((axis.y - 1.0).abs() < 1e-12);
        assert!((delta.angle() - 30.0).abs() < 1e-9);
        tb.end_rotate();
        assert_eq!(tb.drag_rotate(Point2d::new(10.0, 10.0)), Quaternion::IDENTITY);
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut tb = Trackball::new(200.0, 200.0).unwrap();
        tb.begin_rotate(Point2d::new(100.0, 100.0));
        tb.drag_rotate(Point2d::new(125.0, 100.0));
        tb.drag_rotate(Point2d::new(150.0, 100.0));
        assert!((tb.orientation().angle() - 30.0).abs() < 1e-9);
        let p = tb.transform().transform_point(&Point3d::new(0.0, 0.0, 1.0));
        assert!((p.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_scales_transform() {
        let mut tb = Trackball::new(100.0, 100.0).unwrap();
        tb.begin_zoom(Point2d::new(0.0, 0.0));
        let zoom = tb.drag_zoom(Point2d::new(0.0, 100.0));
        assert!((zoom - std::f64::consts::E).abs() < 1e-12);
        let p = tb.transform().transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert!((p.x - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_empty_viewport_rejected() {
        assert!(Trackball::new(0.0, 10.0).is_err());
    }
}
