//! Matrix, quaternion and vector arithmetic checked against closed-form
//! formulas. No scene is involved.

use std::f64::consts::PI;

use basic3d_kernel::{
    Camera, Matrix4x4, ModelId, Point3d, Quaternion, Rotation3D, SceneStore, Transform3D, Vec3,
};

use crate::assertions::Verifier;
use crate::case::{ScenePair, Side, TestCase};
use crate::config::{ComparisonMode, HarnessConfig};
use crate::helpers::{default_camera, HarnessError};
use crate::reference;

pub struct Math;

/// Rows of 16 distinct primes; determinant `-448`.
pub fn prime1() -> Matrix4x4 {
    Matrix4x4::from_rows([
        [3.0, 5.0, 7.0, 11.0],
        [13.0, 17.0, 19.0, 23.0],
        [29.0, 31.0, 37.0, 41.0],
        [43.0, 47.0, 53.0, 59.0],
    ])
}

/// The next 16 primes; determinant `-14928`.
pub fn prime2() -> Matrix4x4 {
    Matrix4x4::from_rows([
        [61.0, 67.0, 71.0, 73.0],
        [79.0, 83.0, 97.0, 101.0],
        [103.0, 107.0, 109.0, 113.0],
        [127.0, 131.0, 137.0, 139.0],
    ])
}

const CENTER: Point3d = Point3d {
    x: 5.0,
    y: 13.0,
    z: 19.0,
};
const SCALE: Vec3 = Vec3 {
    x: 3.0,
    y: 7.0,
    z: 11.0,
};

fn rotation() -> Result<Quaternion, HarnessError> {
    Ok(Quaternion::from_axis_angle(
        Vec3::new(0.1610484381, 0.3757796889, 0.912678161),
        29.0,
    )?)
}

impl Math {
    fn check_angle_between(v: &mut Verifier) {
        let step = PI / 12.0;
        for i in 0..24 {
            for j in 0..24 {
                let (t1, t2) = (i as f64 * step, j as f64 * step);
                let u = Vec3::new(t1.cos(), t1.sin(), 0.0);
                let w = Vec3::new(t2.cos(), t2.sin(), 0.0);
                let expected = u.angle_between(&w);

                let ratio = u.dot(&w).clamp(-1.0, 1.0);
                v.low_precision(&format!("acos angle {i}x{j}"), expected, ratio.acos().to_degrees());

                let half_chords = 2.0 * (u - w).length().atan2((u + w).length());
                v.within(
                    &format!("atan2 angle {i}x{j}"),
                    expected,
                    half_chords.to_degrees(),
                    ComparisonMode::ABSOLUTE_TOLERANCE,
                );
            }
        }
    }

    fn check_quaternions(v: &mut Verifier) -> Result<(), HarnessError> {
        v.vector(
            "identity axis",
            Quaternion::default().axis(),
            Quaternion::new(0.0, 0.0, 0.0, 1.0).axis(),
        );

        let q1 = Quaternion::from_axis_angle(Vec3::Y, -90.0)?;
        let half = 2f64.sqrt() / 2.0;
        let q2 = Quaternion::new(0.0, -half, 0.0, half);
        v.vector("quarter turn axis", q2.axis(), q1.axis());
        v.scalar("quarter turn angle", q2.angle(), q1.angle());
        Ok(())
    }

    fn check_products(v: &mut Verifier) {
        let (p1, p2, id) = (prime1(), prime2(), Matrix4x4::identity());
        for (name, a, b) in [("p1 * p2", p1, p2), ("I * p2", id, p2), ("p1 * I", p1, id)] {
            v.matrix(&format!("multiply {name}"), &reference::multiply(&a, &b), &(a * b));
        }

        let mut appended = p1;
        appended.append(&p2);
        v.matrix("append", &reference::multiply(&p1, &p2), &appended);

        let mut prepended = p1;
        prepended.prepend(&p2);
        v.matrix("prepend", &reference::multiply(&p2, &p1), &prepended);
        v.expect("append and prepend differ", appended != prepended);
    }

    fn check_rotate(v: &mut Verifier, m1: Matrix4x4, q: &Quaternion) {
        let about_origin = reference::rotation(q);
        let about_center = reference::rotation_at(q, CENTER);

        let mut m = m1;
        m.rotate(q);
        v.matrix("rotate", &reference::multiply(&m1, &about_origin), &m);

        let mut m = m1;
        m.rotate_at(q, CENTER);
        v.matrix("rotate at", &reference::multiply(&m1, &about_center), &m);

        let mut m = m1;
        m.rotate_prepend(q);
        v.matrix("rotate prepend", &reference::multiply(&about_origin, &m1), &m);

        let mut m = m1;
        m.rotate_at_prepend(q, CENTER);
        v.matrix("rotate at prepend", &reference::multiply(&about_center, &m1), &m);
    }

    fn check_scale(v: &mut Verifier, m1: Matrix4x4) {
        let about_origin = reference::scaling(SCALE);
        let about_center = reference::scaling_at(SCALE, CENTER);

        let mut m = m1;
        m.scale(SCALE);
        v.matrix("scale", &reference::multiply(&m1, &about_origin), &m);

        let mut m = m1;
        m.scale_at(SCALE, CENTER);
        v.matrix("scale at", &reference::multiply(&m1, &about_center), &m);

        let mut m = m1;
        m.scale_prepend(SCALE);
        v.matrix("scale prepend", &reference::multiply(&about_origin, &m1), &m);

        let mut m = m1;
        m.scale_at_prepend(SCALE, CENTER);
        v.matrix("scale at prepend", &reference::multiply(&about_center, &m1), &m);
    }

    fn check_translate(v: &mut Verifier, m1: Matrix4x4) {
        let offset = reference::translation(SCALE);

        let mut m = m1;
        m.translate(SCALE);
        v.matrix("translate", &reference::multiply(&m1, &offset), &m);

        let mut m = m1;
        m.translate_prepend(SCALE);
        v.matrix("translate prepend", &reference::multiply(&offset, &m1), &m);
    }

    fn check_transforms(v: &mut Verifier, q: &Quaternion) {
        let rotate = Transform3D::rotate_at(
            Rotation3D::axis_angle(q.axis(), q.angle()),
            CENTER,
        );
        let rotate_m = reference::rotation_at(q, CENTER);
        v.matrix("rotate transform", &rotate_m, &rotate.value());

        let scale = Transform3D::scale_at(SCALE, CENTER);
        let scale_m = reference::scaling_at(SCALE, CENTER);
        v.matrix("scale transform", &scale_m, &scale.value());

        let translate = Transform3D::Translate(SCALE);
        let translate_m = reference::translation(SCALE);
        v.matrix("translate transform", &translate_m, &translate.value());

        let group = Transform3D::Group(vec![rotate, scale, translate]);
        let expected = reference::multiply(&reference::multiply(&rotate_m, &scale_m), &translate_m);
        v.matrix("transform group", &expected, &group.value());
    }

    fn check_determinant_and_inverse(v: &mut Verifier, name: &str, m: Matrix4x4) -> Result<(), HarnessError> {
        v.within(
            &format!("{name} determinant"),
            reference::determinant(&m),
            m.determinant(),
            ComparisonMode::ABSOLUTE_TOLERANCE,
        );

        let mut actual = m;
        actual.invert()?;
        match reference::inverse(&m) {
            Some(expected) => {
                for i in 0..16 {
                    v.scalar(&format!("{name} inverse[{i}]"), expected.m[i], actual.m[i]);
                }
            }
            None => {
                v.expect(&format!("{name} cofactor inverse exists"), false);
            }
        }
        Ok(())
    }

    fn check_rodrigues(v: &mut Verifier) -> Result<(), HarnessError> {
        let axis = Vec3::new(1.0, 1.0, 1.0);
        let kernel = Matrix4x4::rotation(&Quaternion::from_axis_angle(axis, 30.0)?);
        match reference::rodrigues(axis, 30.0) {
            Some(expected) => v.matrix("Rodrigues rotation", &expected, &kernel),
            None => v.expect("Rodrigues axis is non-zero", false),
        };
        Ok(())
    }
}

impl TestCase for Math {
    fn name(&self) -> &'static str {
        "Math"
    }

    fn camera(&self, _side: Side, _aspect: f64) -> Result<Camera, HarnessError> {
        Ok(default_camera())
    }

    fn geometry(&self, _side: Side, _store: &mut SceneStore) -> Result<Vec<ModelId>, HarnessError> {
        Ok(Vec::new())
    }

    fn round_trip(&self) -> bool {
        false
    }

    fn check(&self, _scenes: &ScenePair, _config: &HarnessConfig, v: &mut Verifier) -> Result<(), HarnessError> {
        let q = rotation()?;

        Self::check_angle_between(v);
        Self::check_quaternions(v)?;
        Self::check_products(v);

        for m1 in [Matrix4x4::identity(), prime1()] {
            Self::check_rotate(v, m1, &q);
            Self::check_scale(v, m1);
            Self::check_translate(v, m1);
        }
        Self::check_transforms(v, &q);

        Self::check_determinant_and_inverse(v, "prime1", prime1())?;
        Self::check_determinant_and_inverse(v, "prime2", prime2())?;
        Self::check_rodrigues(v)
    }
}
