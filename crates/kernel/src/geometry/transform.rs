use serde::{Deserialize, Serialize};

use super::matrix::Matrix4x4;
use super::point::Point3d;
use super::quaternion::Quaternion;
use super::vector::Vec3;

/// The rotation carried by a [`Transform3D::Rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Rotation3D {
    /// `angle` in degrees about `axis`.
    AxisAngle { axis: Vec3, angle: f64 },
    Quaternion(Quaternion),
}

impl Rotation3D {
    pub fn axis_angle(axis: Vec3, angle: f64) -> Self {
        Self::AxisAngle { axis, angle }
    }

    /// The equivalent quaternion. A zero-length axis means "no rotation".
    pub fn quaternion(&self) -> Quaternion {
        match *self {
            Rotation3D::AxisAngle { axis, angle } => {
                Quaternion::from_axis_angle(axis, angle).unwrap_or(Quaternion::IDENTITY)
            }
            Rotation3D::Quaternion(q) => q,
        }
    }
}

/// A scene-graph transform. Its [`value`](Transform3D::value) is the matrix
/// applied (row-vector convention) to everything beneath it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Transform3D {
    #[default]
    Identity,
    Translate(Vec3),
    Scale { scale: Vec3, center: Point3d },
    Rotate { rotation: Rotation3D, center: Point3d },
    Matrix(Matrix4x4),
    /// Children apply in order: the first child is applied first.
    Group(Vec<Transform3D>),
}

impl Transform3D {
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        Self::Translate(Vec3::new(x, y, z))
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self::Scale {
            scale: Vec3::new(x, y, z),
            center: Point3d::ORIGIN,
        }
    }

    pub fn scale_at(scale: Vec3, center: Point3d) -> Self {
        Self::Scale { scale, center }
    }

    pub fn rotate(axis: Vec3, angle: f64) -> Self {
        Self::rotate_at(Rotation3D::axis_angle(axis, angle), Point3d::ORIGIN)
    }

    pub fn rotate_at(rotation: Rotation3D, center: Point3d) -> Self {
        Self::Rotate { rotation, center }
    }

    pub fn value(&self) -> Matrix4x4 {
        match self {
            Transform3D::Identity => Matrix4x4::identity(),
            Transform3D::Translate(offset) => {
                let mut m = Matrix4x4::identity();
                m.translate(*offset);
                m
            }
            Transform3D::Scale { scale, center } => {
                let mut m = Matrix4x4::identity();
                m.scale_at(*scale, *center);
                m
            }
            Transform3D::Rotate { rotation, center } => {
                let mut m = Matrix4x4::identity();
                m.rotate_at(&rotation.quaternion(), *center);
                m
            }
            Transform3D::Matrix(m) => *m,
            Transform3D::Group(children) => {
                children.iter().fold(Matrix4x4::identity(), |mut acc, child| {
                    acc.append(&child.value());
                    acc
                })
            }
        }
    }

    pub fn is_affine(&self) -> bool {
        self.value().is_affine()
    }

    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        self.value().transform_point(p)
    }

    /// The inverse transform, or `None` when the value is singular.
    pub fn inverse(&self) -> Option<Self> {
        self.value().inverse().map(Transform3D::Matrix)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub fn new(min: Point3d, max: Point3d) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3d>) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    /// Grow to include `p`. Non-finite points are ignored.
    pub fn expand_to_include(&mut self, p: &Point3d) {
        if !p.is_finite() {
            return;
        }
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3d::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3d::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn contains_point(&self, p: &Point3d) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn center(&self) -> Point3d {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z)
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: self.min - Vec3::new(margin, margin, margin),
            max: self.max + Vec3::new(margin, margin, margin),
        }
    }

    /// Slab test: does the infinite line `origin + t * direction` cross the
    /// box for some `t`? Touching a face counts.
    pub fn intersects_line(&self, origin: &Point3d, direction: &Vec3) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        let axes = [
            (origin.x, direction.x, self.min.x, self.max.x),
            (origin.y, direction.y, self.min.y, self.max.y),
            (origin.z, direction.z, self.min.z, self.max.z),
        ];
        for (o, d, lo, hi) in axes {
            if d == 0.0 {
                if o < lo || o > hi {
                    return false;
                }
                continue;
            }
            let t0 = (lo - o) / d;
            let t1 = (hi - o) / d;
            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}
