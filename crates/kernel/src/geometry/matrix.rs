use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::point::Point3d;
use super::quaternion::Quaternion;
use super::vector::Vec3;
use crate::error::KernelError;

/// A 4x4 matrix stored row-major, used with row vectors (`p' = p * M`).
///
/// The translation lives in the fourth row (`m[12..15]`). Affine matrices
/// have `(0, 0, 0, 1)` as their last column; anything else is a projective
/// transform and [`Matrix4x4::transform_point`] performs the homogeneous
/// divide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4x4 {
    pub m: [f64; 16],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4x4 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut m = [0.0; 16];
        for (r, row) in rows.iter().enumerate() {
            m[r * 4..r * 4 + 4].copy_from_slice(row);
        }
        Self { m }
    }

    /// Element at 0-based `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.m[row * 4 + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.m[row * 4 + col] = value;
    }

    pub fn offset(&self) -> Vec3 {
        Vec3::new(self.m[12], self.m[13], self.m[14])
    }

    pub fn translation(offset: Vec3) -> Self {
        let mut t = Self::IDENTITY;
        t.m[12] = offset.x;
        t.m[13] = offset.y;
        t.m[14] = offset.z;
        t
    }

    pub fn scaling(scale: Vec3) -> Self {
        let mut s = Self::IDENTITY;
        s.m[0] = scale.x;
        s.m[5] = scale.y;
        s.m[10] = scale.z;
        s
    }

    /// Scale about `center`: the diagonal scale with offset `c - s*c`.
    pub fn scaling_at(scale: Vec3, center: Point3d) -> Self {
        let mut s = Self::scaling(scale);
        s.m[12] = center.x - scale.x * center.x;
        s.m[13] = center.y - scale.y * center.y;
        s.m[14] = center.z - scale.z * center.z;
        s
    }

    /// Rotation matrix of `q` in homogeneous form.
    ///
    /// The quaternion need not be unit length: the rotation block is scaled
    /// by `|q|²` and `m44 = |q|²` compensates, so points still transform
    /// correctly after the homogeneous divide.
    pub fn rotation(q: &Quaternion) -> Self {
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        let (x2, y2, z2, w2) = (x + x, y + y, z + z, w + w);
        #[rustfmt::skip]
        let m = [
            w * w + x * x - y * y - z * z, x2 * y + w2 * z,               x2 * z - w2 * y,               0.0,
            x2 * y - w2 * z,               w * w - x * x + y * y - z * z, y2 * z + w2 * x,               0.0,
            x2 * z + w2 * y,               y2 * z - w2 * x,               w * w - x * x - y * y + z * z, 0.0,
            0.0,                           0.0,                           0.0,                           w * w + x * x + y * y + z * z,
        ];
        Self { m }
    }

    /// Rotation about `center`: `T(-c) * R * T(c)`.
    pub fn rotation_at(q: &Quaternion, center: Point3d) -> Self {
        let to_origin = Self::translation(-center.to_vec3());
        let back = Self::translation(center.to_vec3());
        to_origin * Self::rotation(q) * back
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn is_affine(&self) -> bool {
        self.m[3] == 0.0 && self.m[7] == 0.0 && self.m[11] == 0.0 && self.m[15] == 1.0
    }

    /// Cofactors of the first row, i.e. the first column of the adjugate.
    fn first_column_cofactors(&self) -> [f64; 4] {
        let m = &self.m;
        [
            m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
                + m[9] * m[7] * m[14]
                + m[13] * m[6] * m[11]
                - m[13] * m[7] * m[10],
            -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
                - m[8] * m[7] * m[14]
                - m[12] * m[6] * m[11]
                + m[12] * m[7] * m[10],
            m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
                + m[8] * m[7] * m[13]
                + m[12] * m[5] * m[11]
                - m[12] * m[7] * m[9],
            -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
                - m[8] * m[6] * m[13]
                - m[12] * m[5] * m[10]
                + m[12] * m[6] * m[9],
        ]
    }

    pub fn determinant(&self) -> f64 {
        let c = self.first_column_cofactors();
        self.m[0] * c[0] + self.m[1] * c[1] + self.m[2] * c[2] + self.m[3] * c[3]
    }

    pub fn has_inverse(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() >= 1e-15
    }

    /// The inverse matrix, or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.m;
        let mut inv = [0.0f64; 16];
        let [c0, c4, c8, c12] = self.first_column_cofactors();
        inv[0] = c0;
        inv[4] = c4;
        inv[8] = c8;
        inv[12] = c12;

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if !det.is_finite() || det.abs() < 1e-15 {
            return None;
        }

        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];

        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];

        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];

        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];

        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];

        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];

        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];

        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];

        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];

        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];

        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];

        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        for val in &mut inv {
            *val /= det;
        }

        Some(Self { m: inv })
    }

    /// Invert in place.
    pub fn invert(&mut self) -> Result<(), KernelError> {
        match self.inverse() {
            Some(inv) => {
                *self = inv;
                Ok(())
            }
            None => Err(KernelError::SingularMatrix {
                determinant: self.determinant(),
            }),
        }
    }

    pub fn multiply(a: &Self, b: &Self) -> Self {
        let mut result = [0.0f64; 16];
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a.at(row, k) * b.at(k, col);
                }
                result[row * 4 + col] = sum;
            }
        }
        Self { m: result }
    }

    /// `self = self * other`: `other` is applied after the current transform.
    pub fn append(&mut self, other: &Self) {
        *self = Self::multiply(self, other);
    }

    /// `self = other * self`: `other` is applied before the current transform.
    pub fn prepend(&mut self, other: &Self) {
        *self = Self::multiply(other, self);
    }

    pub fn rotate(&mut self, q: &Quaternion) {
        self.append(&Self::rotation(q));
    }

    pub fn rotate_prepend(&mut self, q: &Quaternion) {
        self.prepend(&Self::rotation(q));
    }

    pub fn rotate_at(&mut self, q: &Quaternion, center: Point3d) {
        self.append(&Self::rotation_at(q, center));
    }

    pub fn rotate_at_prepend(&mut self, q: &Quaternion, center: Point3d) {
        self.prepend(&Self::rotation_at(q, center));
    }

    pub fn scale(&mut self, scale: Vec3) {
        self.append(&Self::scaling(scale));
    }

    pub fn scale_prepend(&mut self, scale: Vec3) {
        self.prepend(&Self::scaling(scale));
    }

    pub fn scale_at(&mut self, scale: Vec3, center: Point3d) {
        self.append(&Self::scaling_at(scale, center));
    }

    pub fn scale_at_prepend(&mut self, scale: Vec3, center: Point3d) {
        self.prepend(&Self::scaling_at(scale, center));
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.append(&Self::translation(offset));
    }

    pub fn translate_prepend(&mut self, offset: Vec3) {
        self.prepend(&Self::translation(offset));
    }

    /// `[x, y, z, w] * M`.
    pub fn transform_homogeneous(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (col, o) in out.iter_mut().enumerate() {
            *o = v[0] * self.at(0, col)
                + v[1] * self.at(1, col)
                + v[2] * self.at(2, col)
                + v[3] * self.at(3, col);
        }
        out
    }

    /// Transform a point, dividing by `w` when the matrix is not affine.
    /// A point that lands on `w = 0` yields non-finite coordinates.
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let [x, y, z, w] = self.transform_homogeneous([p.x, p.y, p.z, 1.0]);
        if w == 1.0 {
            Point3d::new(x, y, z)
        } else {
            Point3d::new(x / w, y / w, z / w)
        }
    }

    /// Transform a direction (ignores the translation row).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let [x, y, z, _] = self.transform_homogeneous([v.x, v.y, v.z, 0.0]);
        Vec3::new(x, y, z)
    }
}

impl Mul for Matrix4x4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::multiply(&self, &rhs)
    }
}
