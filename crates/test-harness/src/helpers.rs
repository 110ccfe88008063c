//! Helper functions: the harness error type, shared cameras and lights, and
//! pixel grids.

use basic3d_kernel::{
    Camera, Color, KernelError, Light, Material, PerspectiveCamera, Point2d, Point3d, Vec3,
};
use basic3d_tessellation::GeometryError;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("hit-test contract violated: {detail}")]
    ContractViolation { detail: String },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("case `{case}` panicked: {message}")]
    CasePanicked { case: String, message: String },

    #[error("no test case named `{name}`")]
    UnknownCase { name: String },

    #[error("invalid argument `{flag}`: {reason}")]
    InvalidArgument { flag: String, reason: String },

    #[error("scene round trip changed {case} ({side}): {detail}")]
    RoundTripMismatch {
        case: String,
        side: String,
        detail: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Viewport ────────────────────────────────────────────────────────────────

pub const VIEWPORT_WIDTH: f64 = 392.0;
pub const VIEWPORT_HEIGHT: f64 = 490.0;

pub fn pixel(x: f64, y: f64) -> Point2d {
    Point2d::new(x, y)
}

pub fn pixels(points: &[(f64, f64)]) -> Vec<Point2d> {
    points.iter().map(|&(x, y)| Point2d::new(x, y)).collect()
}

/// Pixel centres of a `step`-spaced grid covering `width x height`,
/// row by row.
pub fn pixel_grid(width: f64, height: f64, step: usize) -> Vec<Point2d> {
    let step = step.max(1) as f64;
    let mut grid = Vec::new();
    let mut y = step / 2.0;
    while y < height {
        let mut x = step / 2.0;
        while x < width {
            grid.push(Point2d::new(x, y));
            x += step;
        }
        y += step;
    }
    grid
}

// ── Cameras and Lights ──────────────────────────────────────────────────────

/// Perspective camera at `(0.5, 0.5, 2.5)` looking back at the origin.
pub fn default_camera() -> Camera {
    Camera::Perspective(
        PerspectiveCamera::new(
            Point3d::new(0.5, 0.5, 2.5),
            Vec3::new(-0.5, -0.5, -2.5),
            Vec3::Y,
            40.0,
        )
        .with_planes(0.25, 10.0),
    )
}

/// Perspective camera straight down the Z axis.
pub fn camera_on_z(distance: f64, field_of_view: f64) -> Camera {
    Camera::Perspective(PerspectiveCamera::new(
        Point3d::new(0.0, 0.0, distance),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::Y,
        field_of_view,
    ))
}

/// White light shining down `-Z`.
pub fn default_lights() -> Vec<Light> {
    vec![Light::Directional {
        color: Color::WHITE,
        direction: Vec3::new(0.0, 0.0, -1.0),
    }]
}

pub fn white() -> Material {
    Material::diffuse(Color::WHITE)
}

pub fn blue() -> Material {
    Material::diffuse(Color::BLUE)
}

// ── Pyramid ─────────────────────────────────────────────────────────────────

/// Apex and base corners of the square pyramid used by the material and
/// non-indexed cases: `+Y`, `+X`, `+Z`, `-Z`, `-X`.
pub fn pyramid_points() -> [Point3d; 5] {
    [
        Point3d::new(0.0, 1.0, 0.0),
        Point3d::new(1.0, 0.0, 0.0),
        Point3d::new(0.0, 0.0, 1.0),
        Point3d::new(0.0, 0.0, -1.0),
        Point3d::new(-1.0, 0.0, 0.0),
    ]
}

/// Perspective camera backed off to `(0.5, 0.5, 4.5)` for the pyramid.
pub fn pyramid_camera() -> Camera {
    Camera::Perspective(PerspectiveCamera::new(
        Point3d::new(0.5, 0.5, 4.5),
        Vec3::new(-0.5, -0.5, -4.5),
        Vec3::Y,
        40.0,
    ))
}
