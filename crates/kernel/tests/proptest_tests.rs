//! Property-based tests for kernel math invariants using the `proptest` crate.

use approx::relative_eq;
use proptest::prelude::*;

use basic3d_kernel::geometry::{BoundingBox, Matrix4x4, Point3d, Quaternion, Transform3D, Vec3};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary 3D coordinate tuple in a reasonable floating-point range.
fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0)
}

/// Arbitrary axis that is safely away from zero length.
fn arb_axis() -> impl Strategy<Value = Vec3> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("axis must not be near zero", |(x, y, z)| x * x + y * y + z * z > 1e-3)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Arbitrary non-degenerate scale factor.
fn arb_scale() -> impl Strategy<Value = f64> {
    prop_oneof![0.1f64..10.0, -10.0f64..-0.1]
}

/// An invertible affine matrix built from rotate/scale/translate.
fn arb_invertible() -> impl Strategy<Value = Matrix4x4> {
    (arb_axis(), -360.0f64..360.0, arb_scale(), arb_scale(), arb_scale(), arb_point()).prop_map(
        |(axis, angle, sx, sy, sz, (tx, ty, tz))| {
            Transform3D::Group(vec![
                Transform3D::rotate(axis, angle),
                Transform3D::scale(sx, sy, sz),
                Transform3D::translate(tx, ty, tz),
            ])
            .value()
        },
    )
}

/// Any 16 coefficients.
fn arb_matrix() -> impl Strategy<Value = Matrix4x4> {
    proptest::array::uniform16(-50.0f64..50.0).prop_map(|m| Matrix4x4 { m })
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 1. Identity laws: I * M == M == M * I
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn identity_is_neutral(m in arb_matrix()) {
        prop_assert_eq!(Matrix4x4::identity() * m, m);
        prop_assert_eq!(m * Matrix4x4::identity(), m);
    }
}

// ---------------------------------------------------------------------------
// 2. append(N) == self * N, prepend(N) == N * self
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn append_and_prepend_order(a in arb_matrix(), b in arb_matrix()) {
        let mut appended = a;
        appended.append(&b);
        let mut prepended = a;
        prepended.prepend(&b);
        prop_assert_eq!(appended, a * b);
        prop_assert_eq!(prepended, b * a);
    }
}

// ---------------------------------------------------------------------------
// 3. Inverse round trip: M * M^-1 == I
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn inverse_round_trip(m in arb_invertible()) {
        let inv = m.inverse().expect("constructed matrix is invertible");
        let product = m * inv;
        for (i, v) in product.m.iter().enumerate() {
            let expected = if i % 5 == 0 { 1.0 } else { 0.0 };
            prop_assert!((v - expected).abs() < 1e-6,
                "component {} of M * M^-1 is {}", i, v);
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Cofactor inverse agrees with nalgebra's LU-based inverse
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn inverse_matches_nalgebra(m in arb_invertible()) {
        let ours = m.inverse().expect("constructed matrix is invertible");
        let theirs = nalgebra::Matrix4::from_row_slice(&m.m)
            .try_inverse()
            .expect("nalgebra agrees the matrix is invertible");
        for row in 0..4 {
            for col in 0..4 {
                let a = ours.at(row, col);
                let b = theirs[(row, col)];
                prop_assert!(relative_eq!(a, b, epsilon = 1e-9, max_relative = 1e-7),
                    "inverse ({}, {}): {} vs {}", row, col, a, b);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Determinant of a product is the product of determinants
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn determinant_is_multiplicative(a in arb_invertible(), b in arb_invertible()) {
        let lhs = (a * b).determinant();
        let rhs = a.determinant() * b.determinant();
        prop_assert!(relative_eq!(lhs, rhs, epsilon = 1e-9, max_relative = 1e-6),
            "det(AB)={} det(A)det(B)={}", lhs, rhs);
    }
}

// ---------------------------------------------------------------------------
// 6. Quaternion axis/angle round trip
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn quaternion_axis_angle_round_trip(axis in arb_axis(), angle in 1.0f64..359.0) {
        let q = Quaternion::from_axis_angle(axis, angle).unwrap();
        let unit = axis.normalized().unwrap();
        prop_assert!(q.is_normalized());
        prop_assert!((q.angle() - angle).abs() < TOL, "angle {} vs {}", q.angle(), angle);
        prop_assert!((q.axis() - unit).length() < TOL, "axis {:?} vs {:?}", q.axis(), unit);
    }
}

// ---------------------------------------------------------------------------
// 7. Rotation preserves lengths and keeps its axis fixed
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn rotation_is_rigid(axis in arb_axis(), angle in -720.0f64..720.0, (x, y, z) in arb_point()) {
        let q = Quaternion::from_axis_angle(axis, angle).unwrap();
        let r = Matrix4x4::rotation(&q);
        let p = Point3d::new(x, y, z);
        let rotated = r.transform_point(&p);
        prop_assert!((rotated.to_vec3().length() - p.to_vec3().length()).abs() < 1e-9);
        let on_axis = Point3d::from_vec3(axis);
        prop_assert!(r.transform_point(&on_axis).distance_to(&on_axis) < 1e-12);
    }
}

// ---------------------------------------------------------------------------
// 8. Quaternion product composes rotations right-to-left
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn quaternion_product_composes(
        a in arb_axis(), alpha in -180.0f64..180.0,
        b in arb_axis(), beta in -180.0f64..180.0,
        (x, y, z) in arb_point(),
    ) {
        let qa = Quaternion::from_axis_angle(a, alpha).unwrap();
        let qb = Quaternion::from_axis_angle(b, beta).unwrap();
        let p = Point3d::new(x, y, z);
        let combined = Matrix4x4::rotation(&(qa * qb)).transform_point(&p);
        let stepwise = Matrix4x4::rotation(&qa).transform_point(&Matrix4x4::rotation(&qb).transform_point(&p));
        prop_assert!(combined.distance_to(&stepwise) < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// 9. Angle between is symmetric and within [0, 180]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn angle_between_symmetric(a in arb_axis(), b in arb_axis()) {
        let ab = a.angle_between(&b);
        let ba = b.angle_between(&a);
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((0.0..=180.0).contains(&ab));
        let via_acos = (a.dot(&b) / (a.length() * b.length())).clamp(-1.0, 1.0).acos().to_degrees();
        prop_assert!((ab - via_acos).abs() < 1e-5);
    }
}

// ---------------------------------------------------------------------------
// 10. Group value equals the ordered product of child values
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn group_value_is_ordered_product(
        axis in arb_axis(), angle in -180.0f64..180.0,
        s in arb_scale(), (tx, ty, tz) in arb_point(),
    ) {
        let children = vec![
            Transform3D::rotate(axis, angle),
            Transform3D::scale(s, s, s),
            Transform3D::translate(tx, ty, tz),
        ];
        let expected = children[0].value() * children[1].value() * children[2].value();
        prop_assert_eq!(Transform3D::Group(children).value(), expected);
    }
}

// ---------------------------------------------------------------------------
// 11. Bounding box contains every source point
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bbox_contains_points(points in proptest::collection::vec(arb_point(), 1..20)) {
        let pts: Vec<Point3d> = points.iter().map(|&(x, y, z)| Point3d::new(x, y, z)).collect();
        let bb = BoundingBox::from_points(&pts);
        for p in &pts {
            prop_assert!(bb.contains_point(p));
        }
    }
}
