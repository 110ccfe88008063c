//! Cameras: how a viewport maps pixels to rays into the scene.
//!
//! Projection cameras (perspective, orthographic) are described by a
//! position, a look direction and an up vector. The view matrix uses a
//! right-handed look-at basis:
//!
//! - `z = -normalize(look)`
//! - `x = normalize(up × z)`
//! - `y = z × x`
//!
//! with translation row `(-x·pos, -y·pos, -z·pos)`. A [`MatrixCamera`] takes
//! both matrices verbatim.

use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::geometry::matrix::Matrix4x4;
use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::vector::Vec3;
use crate::hit_test::Ray;

/// `+inf` does not survive JSON, so an infinite far plane is written as
/// `null`.
mod far_plane {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(far: &f64, s: S) -> Result<S::Ok, S::Error> {
        if far.is_finite() {
            s.serialize_some(far)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
    }
}

pub const DEFAULT_NEAR_PLANE: f64 = 0.125;
pub const DEFAULT_FIELD_OF_VIEW: f64 = 45.0;
pub const DEFAULT_ORTHOGRAPHIC_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Point3d,
    pub look_direction: Vec3,
    pub up_direction: Vec3,
    pub near_plane_distance: f64,
    #[serde(with = "far_plane")]
    pub far_plane_distance: f64,
    /// Horizontal field of view in degrees.
    pub field_of_view: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Point3d::ORIGIN,
            look_direction: Vec3::new(0.0, 0.0, -1.0),
            up_direction: Vec3::Y,
            near_plane_distance: DEFAULT_NEAR_PLANE,
            far_plane_distance: f64::INFINITY,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(position: Point3d, look_direction: Vec3, up_direction: Vec3, field_of_view: f64) -> Self {
        Self {
            position,
            look_direction,
            up_direction,
            field_of_view,
            ..Self::default()
        }
    }

    pub fn with_planes(mut self, near: f64, far: f64) -> Self {
        self.near_plane_distance = near;
        self.far_plane_distance = far;
        self
    }

    /// Projection with `w = 1/tan(fov/2)`, `h = w·aspect`,
    /// `m33 = zf/(zn-zf)`, `m43 = zn·m33`, `m34 = -1`. An infinite far plane
    /// takes the limit `m33 = -1`, `m43 = -zn`.
    pub fn projection_matrix(&self, aspect: f64) -> Matrix4x4 {
        let zn = self.near_plane_distance;
        let zf = self.far_plane_distance;
        let w = 1.0 / (self.field_of_view.to_radians() / 2.0).tan();
        let h = w * aspect;
        let (m33, m43) = if zf.is_infinite() {
            (-1.0, -zn)
        } else {
            let m33 = zf / (zn - zf);
            (m33, m33 * zn)
        };
        Matrix4x4::from_rows([
            [w, 0.0, 0.0, 0.0],
            [0.0, h, 0.0, 0.0],
            [0.0, 0.0, m33, -1.0],
            [0.0, 0.0, m43, 0.0],
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthographicCamera {
    pub position: Point3d,
    pub look_direction: Vec3,
    pub up_direction: Vec3,
    pub near_plane_distance: f64,
    #[serde(with = "far_plane")]
    pub far_plane_distance: f64,
    /// Width of the view volume in world units.
    pub width: f64,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            position: Point3d::ORIGIN,
            look_direction: Vec3::new(0.0, 0.0, -1.0),
            up_direction: Vec3::Y,
            near_plane_distance: DEFAULT_NEAR_PLANE,
            far_plane_distance: f64::INFINITY,
            width: DEFAULT_ORTHOGRAPHIC_WIDTH,
        }
    }
}

impl OrthographicCamera {
    pub fn new(position: Point3d, look_direction: Vec3, up_direction: Vec3, width: f64) -> Self {
        Self {
            position,
            look_direction,
            up_direction,
            width,
            ..Self::default()
        }
    }

    pub fn with_planes(mut self, near: f64, far: f64) -> Self {
        self.near_plane_distance = near;
        self.far_plane_distance = far;
        self
    }

    /// Projection with `m11 = 2/w`, `m22 = 2/h` (`h = w/aspect`),
    /// `m33 = 1/(zn-zf)`, `m43 = zn·m33`.
    pub fn projection_matrix(&self, aspect: f64) -> Matrix4x4 {
        let zn = self.near_plane_distance;
        let zf = self.far_plane_distance;
        let height = self.width / aspect;
        let m33 = 1.0 / (zn - zf);
        Matrix4x4::from_rows([
            [2.0 / self.width, 0.0, 0.0, 0.0],
            [0.0, 2.0 / height, 0.0, 0.0],
            [0.0, 0.0, m33, 0.0],
            [0.0, 0.0, m33 * zn, 1.0],
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixCamera {
    pub view_matrix: Matrix4x4,
    pub projection_matrix: Matrix4x4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Camera {
    Perspective(PerspectiveCamera),
    Orthographic(OrthographicCamera),
    Matrix(MatrixCamera),
}

impl Default for Camera {
    fn default() -> Self {
        Camera::Perspective(PerspectiveCamera::default())
    }
}

/// Orthonormal camera basis `(x, y, z)`; the camera looks down `-z`.
pub fn look_at_basis(look_direction: Vec3, up_direction: Vec3) -> Result<(Vec3, Vec3, Vec3), KernelError> {
    let z = (-look_direction)
        .normalized()
        .ok_or(KernelError::ZeroLengthVector { what: "look direction" })?;
    let x = up_direction
        .cross(&z)
        .normalized()
        .ok_or_else(|| KernelError::InvalidArgument {
            name: "up_direction",
            reason: "must not be zero or parallel to the look direction".to_string(),
        })?;
    let y = z.cross(&x);
    Ok((x, y, z))
}

pub fn look_at_view_matrix(
    position: Point3d,
    look_direction: Vec3,
    up_direction: Vec3,
) -> Result<Matrix4x4, KernelError> {
    let (x, y, z) = look_at_basis(look_direction, up_direction)?;
    let p = position.to_vec3();
    Ok(Matrix4x4::from_rows([
        [x.x, y.x, z.x, 0.0],
        [x.y, y.y, z.y, 0.0],
        [x.z, y.z, z.z, 0.0],
        [-x.dot(&p), -y.dot(&p), -z.dot(&p), 1.0],
    ]))
}

impl Camera {
    pub fn view_matrix(&self) -> Result<Matrix4x4, KernelError> {
        match self {
            Camera::Perspective(c) => look_at_view_matrix(c.position, c.look_direction, c.up_direction),
            Camera::Orthographic(c) => look_at_view_matrix(c.position, c.look_direction, c.up_direction),
            Camera::Matrix(c) => Ok(c.view_matrix),
        }
    }

    pub fn projection_matrix(&self, aspect: f64) -> Matrix4x4 {
        match self {
            Camera::Perspective(c) => c.projection_matrix(aspect),
            Camera::Orthographic(c) => c.projection_matrix(aspect),
            Camera::Matrix(c) => c.projection_matrix,
        }
    }

    /// `view * projection`.
    pub fn view_projection(&self, aspect: f64) -> Result<Matrix4x4, KernelError> {
        Ok(self.view_matrix()? * self.projection_matrix(aspect))
    }

    /// The ray through a point in normalized device coordinates
    /// (`x`, `y` in `[-1, 1]`, `y` up).
    pub fn ray(&self, ndc: Point2d, aspect: f64) -> Result<Ray, KernelError> {
        match self {
            Camera::Perspective(c) => {
                let (x, y, z) = look_at_basis(c.look_direction, c.up_direction)?;
                let projection = c.projection_matrix(aspect);
                let cx = ndc.x / projection.at(0, 0);
                let cy = ndc.y / projection.at(1, 1);
                Ok(Ray::new(c.position, x * cx + y * cy - z))
            }
            Camera::Orthographic(c) => {
                let (x, y, z) = look_at_basis(c.look_direction, c.up_direction)?;
                let half_width = c.width / 2.0;
                let half_height = half_width / aspect;
                let origin = c.position + x * (ndc.x * half_width) + y * (ndc.y * half_height);
                Ok(Ray::new(origin, -z))
            }
            Camera::Matrix(c) => {
                let view_projection = c.view_matrix * c.projection_matrix;
                let inverse = view_projection
                    .inverse()
                    .ok_or(KernelError::SingularMatrix {
                        determinant: view_projection.determinant(),
                    })?;
                let near = inverse.transform_point(&Point3d::new(ndc.x, ndc.y, 0.0));
                let far = inverse.transform_point(&Point3d::new(ndc.x, ndc.y, 1.0));
                Ok(Ray::new(near, far - near))
            }
        }
    }

    /// Whether a world-space point lies between the near and far planes.
    pub fn depth_contains(&self, point: &Point3d, aspect: f64) -> Result<bool, KernelError> {
        let depth_range = |position: Point3d, look: Vec3, near: f64, far: f64| {
            let look = look
                .normalized()
                .ok_or(KernelError::ZeroLengthVector { what: "look direction" })?;
            let depth = (*point - position).dot(&look);
            Ok::<bool, KernelError>(near <= depth && depth <= far)
        };
        match self {
            Camera::Perspective(c) => depth_range(
                c.position,
                c.look_direction,
                c.near_plane_distance,
                c.far_plane_distance,
            ),
            Camera::Orthographic(c) => depth_range(
                c.position,
                c.look_direction,
                c.near_plane_distance,
                c.far_plane_distance,
            ),
            Camera::Matrix(c) => {
                let clip = (c.view_matrix * c.projection_matrix)
                    .transform_homogeneous([point.x, point.y, point.z, 1.0]);
                let w = clip[3];
                let z = clip[2] / w;
                Ok(w > 0.0 && (0.0..=1.0).contains(&z))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPECT: f64 = 392.0 / 490.0;

    #[test]
    fn test_default_camera() {
        let Camera::Perspective(c) = Camera::default() else {
            panic!("default camera should be perspective");
        };
        assert_eq!(c.near_plane_distance, 0.125);
        assert!(c.far_plane_distance.is_infinite());
        assert_eq!(c.field_of_view, 45.0);
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let camera = Camera::Perspective(PerspectiveCamera::new(
            Point3d::new(3.0, -5.0, 1.0),
            Vec3::new(-3.0, 5.0, -1.0),
            Vec3::Y,
            30.0,
        ));
        let view = camera.view_matrix().unwrap();
        let eye = view.transform_point(&Point3d::new(3.0, -5.0, 1.0));
        assert!(eye.distance_to(&Point3d::ORIGIN) < 1e-12);
        let target = view.transform_point(&Point3d::ORIGIN);
        assert!(target.x.abs() < 1e-12 && target.y.abs() < 1e-12);
        assert!(target.z < 0.0);
    }

    #[test]
    fn test_up_parallel_to_look_is_rejected() {
        let camera = Camera::Perspective(PerspectiveCamera::new(
            Point3d::ORIGIN,
            Vec3::Y,
            Vec3::Y,
            45.0,
        ));
        assert!(matches!(
            camera.view_matrix(),
            Err(KernelError::InvalidArgument { name: "up_direction", .. })
        ));
    }

    #[test]
    fn test_perspective_ray_through_center_follows_look() {
        let camera = Camera::default();
        let ray = camera.ray(Point2d::new(0.0, 0.0), ASPECT).unwrap();
        assert_eq!(ray.origin, Point3d::ORIGIN);
        assert_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_perspective_edge_ray_matches_field_of_view() {
        let camera = Camera::Perspective(PerspectiveCamera::new(
            Point3d::ORIGIN,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            90.0,
        ));
        let ray = camera.ray(Point2d::new(1.0, 0.0), ASPECT).unwrap();
        assert!((ray.direction.x - 1.0).abs() < 1e-12);
        assert!((ray.direction.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = Camera::Orthographic(OrthographicCamera::default());
        let ray = camera.ray(Point2d::new(1.0, -1.0), ASPECT).unwrap();
        assert_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0));
        assert!((ray.origin.x - 1.0).abs() < 1e-12);
        assert!((ray.origin.y + 1.0 / ASPECT).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_camera_matches_perspective_ray() {
        let perspective = PerspectiveCamera::new(
            Point3d::new(0.5, 0.5, 2.5),
            Vec3::new(-0.5, -0.5, -2.5),
            Vec3::Y,
            40.0,
        )
        .with_planes(0.24, 10.0);
        let left = Camera::Perspective(perspective.clone());
        let right = Camera::Matrix(MatrixCamera {
            view_matrix: left.view_matrix().unwrap(),
            projection_matrix: perspective.projection_matrix(ASPECT),
        });
        let ndc = Point2d::new(0.3, -0.2);
        let a = left.ray(ndc, ASPECT).unwrap();
        let b = right.ray(ndc, ASPECT).unwrap();
        let da = a.direction.normalized().unwrap();
        let db = b.direction.normalized().unwrap();
        assert!((da - db).length() < 1e-9);
        // The matrix ray starts on the near plane, along the same line.
        let offset = b.origin - a.origin;
        assert!(offset.cross(&da).length() < 1e-9);
    }

    #[test]
    fn test_depth_range() {
        let camera = Camera::Perspective(PerspectiveCamera::default().with_planes(1.0, 2.0));
        assert!(!camera.depth_contains(&Point3d::new(0.0, 0.0, -0.5), ASPECT).unwrap());
        assert!(camera.depth_contains(&Point3d::new(0.0, 0.0, -1.5), ASPECT).unwrap());
        assert!(!camera.depth_contains(&Point3d::new(0.0, 0.0, -2.5), ASPECT).unwrap());
    }

    #[test]
    fn test_infinite_far_plane_survives_json() {
        let camera = Camera::Orthographic(OrthographicCamera::default());
        let json = serde_json::to_string(&camera).unwrap();
        let back: Camera = serde_json::from_str(&json).unwrap();
        assert_eq!(back, camera);
    }
}
