//! Closed-form reference formulas, derived by hand and independent of the
//! kernel's implementations, for the numeric checks.
//!
//! Matrices use the kernel's row-vector layout: `m41..m43` hold the
//! translation, written `ox`, `oy`, `oz` below.

use basic3d_kernel::{Matrix4x4, Point3d, Quaternion, Vec3};

/// `a * b` written out term by term.
pub fn multiply(a: &Matrix4x4, b: &Matrix4x4) -> Matrix4x4 {
    let [a11, a12, a13, a14, a21, a22, a23, a24, a31, a32, a33, a34, a41, a42, a43, a44] = a.m;
    let [b11, b12, b13, b14, b21, b22, b23, b24, b31, b32, b33, b34, b41, b42, b43, b44] = b.m;
    Matrix4x4 {
        m: [
            a11 * b11 + a12 * b21 + a13 * b31 + a14 * b41,
            a11 * b12 + a12 * b22 + a13 * b32 + a14 * b42,
            a11 * b13 + a12 * b23 + a13 * b33 + a14 * b43,
            a11 * b14 + a12 * b24 + a13 * b34 + a14 * b44,
            a21 * b11 + a22 * b21 + a23 * b31 + a24 * b41,
            a21 * b12 + a22 * b22 + a23 * b32 + a24 * b42,
            a21 * b13 + a22 * b23 + a23 * b33 + a24 * b43,
            a21 * b14 + a22 * b24 + a23 * b34 + a24 * b44,
            a31 * b11 + a32 * b21 + a33 * b31 + a34 * b41,
            a31 * b12 + a32 * b22 + a33 * b32 + a34 * b42,
            a31 * b13 + a32 * b23 + a33 * b33 + a34 * b43,
            a31 * b14 + a32 * b24 + a33 * b34 + a34 * b44,
            a41 * b11 + a42 * b21 + a43 * b31 + a44 * b41,
            a41 * b12 + a42 * b22 + a43 * b32 + a44 * b42,
            a41 * b13 + a42 * b23 + a43 * b33 + a44 * b43,
            a41 * b14 + a42 * b24 + a43 * b34 + a44 * b44,
        ],
    }
}

pub fn translation(offset: Vec3) -> Matrix4x4 {
    Matrix4x4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [offset.x, offset.y, offset.z, 1.0],
    ])
}

pub fn scaling(scale: Vec3) -> Matrix4x4 {
    Matrix4x4::from_rows([
        [scale.x, 0.0, 0.0, 0.0],
        [0.0, scale.y, 0.0, 0.0],
        [0.0, 0.0, scale.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Homogeneous rotation matrix of `q`; `m44 = w² + x² + y² + z²`.
pub fn rotation(q: &Quaternion) -> Matrix4x4 {
    let Quaternion { x, y, z, w } = *q;
    Matrix4x4::from_rows([
        [
            w * w + x * x - y * y - z * z,
            2.0 * x * y + 2.0 * w * z,
            2.0 * x * z - 2.0 * w * y,
            0.0,
        ],
        [
            2.0 * x * y - 2.0 * w * z,
            w * w - x * x + y * y - z * z,
            2.0 * y * z + 2.0 * w * x,
            0.0,
        ],
        [
            2.0 * x * z + 2.0 * w * y,
            2.0 * y * z - 2.0 * w * x,
            w * w - x * x - y * y + z * z,
            0.0,
        ],
        [0.0, 0.0, 0.0, w * w + x * x + y * y + z * z],
    ])
}

/// `T(-center) * m * T(center)`.
pub fn about(m: &Matrix4x4, center: Point3d) -> Matrix4x4 {
    let c = center.to_vec3();
    multiply(&multiply(&translation(-c), m), &translation(c))
}

pub fn rotation_at(q: &Quaternion, center: Point3d) -> Matrix4x4 {
    about(&rotation(q), center)
}

pub fn scaling_at(scale: Vec3, center: Point3d) -> Matrix4x4 {
    about(&scaling(scale), center)
}

/// Rotation of `angle` degrees about `axis` by the Rodrigues formula, in
/// row-vector form.
pub fn rodrigues(axis: Vec3, angle: f64) -> Option<Matrix4x4> {
    let n = axis.normalized()?;
    let (u, v, w) = (n.x, n.y, n.z);
    let (sin, cos) = angle.to_radians().sin_cos();
    let k = 1.0 - cos;
    Some(Matrix4x4::from_rows([
        [u * u + (v * v + w * w) * cos, k * u * v + w * sin, k * u * w - v * sin, 0.0],
        [k * u * v - w * sin, v * v + (u * u + w * w) * cos, k * v * w + u * sin, 0.0],
        [k * u * w + v * sin, k * v * w - u * sin, w * w + (u * u + v * v) * cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]))
}

/// Determinant by full cofactor expansion.
pub fn determinant(m: &Matrix4x4) -> f64 {
    let [m11, m12, m13, m14, m21, m22, m23, m24, m31, m32, m33, m34, ox, oy, oz, m44] = m.m;
    m11 * m22 * m33 * m44 - m11 * m22 * m34 * oz - m11 * m32 * m23 * m44 + m11 * m32 * m24 * oz
        + m11 * oy * m23 * m34 - m11 * oy * m24 * m33 - m21 * m12 * m33 * m44 + m21 * m12 * m34 * oz
        + m21 * m32 * m13 * m44 - m21 * m32 * m14 * oz - m21 * oy * m13 * m34 + m21 * oy * m14 * m33
        + m31 * m12 * m23 * m44 - m31 * m12 * m24 * oz - m31 * m22 * m13 * m44 + m31 * m22 * m14 * oz
        + m31 * oy * m13 * m24 - m31 * oy * m14 * m23 - ox * m12 * m23 * m34 + ox * m12 * m24 * m33
        + ox * m22 * m13 * m34 - ox * m22 * m14 * m33 - ox * m32 * m13 * m24 + ox * m32 * m14 * m23
}

/// Adjugate over the determinant, entry by entry. `None` when singular.
pub fn inverse(m: &Matrix4x4) -> Option<Matrix4x4> {
    let [m11, m12, m13, m14, m21, m22, m23, m24, m31, m32, m33, m34, ox, oy, oz, m44] = m.m;
    // The negated determinant; the numerators carry the matching sign.
    let d = -m11 * m22 * m33 * m44 + m11 * m22 * m34 * oz + m11 * m32 * m23 * m44 - m11 * m32 * m24 * oz
        - m11 * oy * m23 * m34 + m11 * oy * m24 * m33 + m21 * m12 * m33 * m44 - m21 * m12 * m34 * oz
        - m21 * m32 * m13 * m44 + m21 * m32 * m14 * oz + m21 * oy * m13 * m34 - m21 * oy * m14 * m33
        - m31 * m12 * m23 * m44 + m31 * m12 * m24 * oz + m31 * m22 * m13 * m44 - m31 * m22 * m14 * oz
        - m31 * oy * m13 * m24 + m31 * oy * m14 * m23 + ox * m12 * m23 * m34 - ox * m12 * m24 * m33
        - ox * m22 * m13 * m34 + ox * m22 * m14 * m33 + ox * m32 * m13 * m24 - ox * m32 * m14 * m23;
    if d == 0.0 || !d.is_finite() {
        return None;
    }
    #[rustfmt::skip]
    let inv = [
        (-m22 * m33 * m44 + m22 * m34 * oz + m32 * m23 * m44 - m32 * m24 * oz - oy * m23 * m34
            + oy * m24 * m33) / d,
        -(-m12 * m33 * m44 + m12 * m34 * oz + m32 * m13 * m44 - m32 * m14 * oz - oy * m13 * m34
            + oy * m14 * m33) / d,
        (-m12 * m23 * m44 + m12 * m24 * oz + m22 * m13 * m44 - m22 * m14 * oz - oy * m13 * m24
            + oy * m14 * m23) / d,
        (m12 * m23 * m34 - m12 * m24 * m33 - m22 * m13 * m34 + m22 * m14 * m33 + m32 * m13 * m24
            - m32 * m14 * m23) / d,
        (m21 * m33 * m44 - m21 * m34 * oz - m31 * m23 * m44 + m31 * m24 * oz + ox * m23 * m34
            - ox * m24 * m33) / d,
        (-m11 * m33 * m44 + m11 * m34 * oz + m31 * m13 * m44 - m31 * m14 * oz - ox * m13 * m34
            + ox * m14 * m33) / d,
        -(-m11 * m23 * m44 + m11 * m24 * oz + m21 * m13 * m44 - m21 * m14 * oz - ox * m13 * m24
            + ox * m14 * m23) / d,
        -(m11 * m23 * m34 - m11 * m24 * m33 - m21 * m13 * m34 + m21 * m14 * m33 + m31 * m13 * m24
            - m31 * m14 * m23) / d,
        -(m21 * m32 * m44 - m21 * m34 * oy - m31 * m22 * m44 + m31 * m24 * oy + ox * m22 * m34
            - ox * m24 * m32) / d,
        -(-m11 * m32 * m44 + m11 * m34 * oy + m31 * m12 * m44 - m31 * m14 * oy - ox * m12 * m34
            + ox * m14 * m32) / d,
        (-m11 * m22 * m44 + m11 * m24 * oy + m21 * m12 * m44 - m21 * m14 * oy - ox * m12 * m24
            + ox * m14 * m22) / d,
        (m11 * m22 * m34 - m11 * m24 * m32 - m21 * m12 * m34 + m21 * m14 * m32 + m31 * m12 * m24
            - m31 * m14 * m22) / d,
        -(-m21 * m32 * oz + m21 * m33 * oy + m31 * m22 * oz - m31 * m23 * oy - ox * m22 * m33
            + ox * m23 * m32) / d,
        -(m11 * m32 * oz - m11 * m33 * oy - m31 * m12 * oz + m31 * m13 * oy + ox * m12 * m33
            - ox * m13 * m32) / d,
        (m11 * m22 * oz - m11 * m23 * oy - m21 * m12 * oz + m21 * m13 * oy + ox * m12 * m23
            - ox * m13 * m22) / d,
        -(m11 * m22 * m33 - m11 * m23 * m32 - m21 * m12 * m33 + m21 * m13 * m32 + m31 * m12 * m23
            - m31 * m13 * m22) / d,
    ];
    Some(Matrix4x4 { m: inv })
}

// ── Cameras ─────────────────────────────────────────────────────────────────

/// View matrix for a camera at `position`: `z = -look`, `x = up × z`,
/// `y = z × x`, translation row `(-x·p, -y·p, -z·p)`.
pub fn view_matrix(position: Point3d, look: Vec3, up: Vec3) -> Option<Matrix4x4> {
    let z = (-look).normalized()?;
    let x = up.cross(&z).normalized()?;
    let y = z.cross(&x);
    let p = position.to_vec3();
    Some(Matrix4x4::from_rows([
        [x.x, y.x, z.x, 0.0],
        [x.y, y.y, z.y, 0.0],
        [x.z, y.z, z.z, 0.0],
        [-x.dot(&p), -y.dot(&p), -z.dot(&p), 1.0],
    ]))
}

/// Perspective projection for a horizontal field of view in degrees:
/// `w = 1/tan(fov/2)`, `h = w·aspect`, `m33 = zf/(zn-zf)`, `m43 = zn·m33`,
/// `m34 = -1`.
pub fn perspective_projection(field_of_view: f64, aspect: f64, near: f64, far: f64) -> Matrix4x4 {
    let w = 1.0 / (field_of_view.to_radians() / 2.0).tan();
    let h = w * aspect;
    let m33 = far / (near - far);
    Matrix4x4::from_rows([
        [w, 0.0, 0.0, 0.0],
        [0.0, h, 0.0, 0.0],
        [0.0, 0.0, m33, -1.0],
        [0.0, 0.0, near * m33, 0.0],
    ])
}

/// Orthographic projection for a view `width` wide.
pub fn orthographic_projection(width: f64, aspect: f64, near: f64, far: f64) -> Matrix4x4 {
    let height = width / aspect;
    let m33 = 1.0 / (near - far);
    Matrix4x4::from_rows([
        [2.0 / width, 0.0, 0.0, 0.0],
        [0.0, 2.0 / height, 0.0, 0.0],
        [0.0, 0.0, m33, 0.0],
        [0.0, 0.0, m33 * near, 1.0],
    ])
}
