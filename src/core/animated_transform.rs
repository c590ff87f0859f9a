use crate::core::error::Result;
use crate::core::geometry::{Bounds3f, Point3f, Ray, RayDifferential, Vector3f};
use crate::core::interval::{interval_find_zeros, Interval};
use crate::core::pbrt::{clamp, lerp, Float};
use crate::core::quaternion::{Quaternion, SLERP_LINEAR_THRESHOLD};
use crate::core::transform::{Matrix4x4, Transform};
use std::convert::TryFrom;

/// Upper bound on polar decomposition iterations.
pub const DECOMPOSE_MAX_ITERATIONS: usize = 100;
/// Polar decomposition stops once no row of the rotation estimate moves by
/// more than this (sum of absolute differences).
pub const DECOMPOSE_TOLERANCE: Float = 1e-4;

/// Tuning of the root isolation used by [`AnimatedTransform::motion_bounds`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MotionBoundsConfig {
    /// Number of interval bisections before Newton refinement.
    pub depth: u32,
    pub newton_iterations: u32,
}

impl Default for MotionBoundsConfig {
    fn default() -> Self {
        Self {
            depth: 8,
            newton_iterations: 4,
        }
    }
}

/// One coordinate of a motion-derivative coefficient as an affine function of
/// the moving point: `kc + kx·x + ky·y + kz·z`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DerivativeTerm {
    pub kc: Float,
    pub kx: Float,
    pub ky: Float,
    pub kz: Float,
}

impl DerivativeTerm {
    pub fn new(kc: Float, kx: Float, ky: Float, kz: Float) -> Self {
        Self { kc, kx, ky, kz }
    }

    pub fn eval(&self, p: &Point3f) -> Float {
        self.kc + self.kx * p.x + self.ky * p.y + self.kz * p.z
    }
}

/// Translation, rotation and scale/shear factors of a matrix, `M = T·R·S`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Decomposition {
    pub translation: Vector3f,
    pub rotation: Quaternion,
    pub scale: Matrix4x4,
}

/// Splits `m` into `T·R·S`. The rotation is the orthogonal polar factor,
/// found by repeatedly averaging the estimate with its inverse transpose.
///
/// Non-convergence is not an error: after [`DECOMPOSE_MAX_ITERATIONS`] the
/// current estimate is used and a warning is logged.
pub fn decompose(m: &Matrix4x4) -> Result<Decomposition> {
    let translation = Vector3f::new(m.m[0][3], m.m[1][3], m.m[2][3]);

    let mut mm = *m;
    for i in 0..3 {
        mm.m[i][3] = 0.0;
        mm.m[3][i] = 0.0;
    }
    mm.m[3][3] = 1.0;

    let mut r = mm;
    let mut count = 0;
    loop {
        let rit = r.transpose().inverse()?;
        let mut r_next = Matrix4x4::identity();
        for i in 0..4 {
            for j in 0..4 {
                r_next.m[i][j] = 0.5 * (r.m[i][j] + rit.m[i][j]);
            }
        }

        let mut norm: Float = 0.0;
        for i in 0..3 {
            let n = (r.m[i][0] - r_next.m[i][0]).abs()
                + (r.m[i][1] - r_next.m[i][1]).abs()
                + (r.m[i][2] - r_next.m[i][2]).abs();
            norm = norm.max(n);
        }
        r = r_next;
        count += 1;
        if norm <= DECOMPOSE_TOLERANCE {
            break;
        }
        if count >= DECOMPOSE_MAX_ITERATIONS {
            log::warn!(
                "polar decomposition did not converge after {} iterations (residual {})",
                count, norm
            );
            break;
        }
    }

    let rotation = Quaternion::from(&r);
    let scale = r.inverse()? * mm;
    Ok(Decomposition {
        translation,
        rotation,
        scale,
    })
}

type Matrix3 = [[Float; 3]; 3];

/// Rotation matrix of `q` written as a homogeneous quadratic form, so it is
/// also meaningful for quaternions that are not unit length.
fn rotation_form(q: &Quaternion) -> Matrix3 {
    let (x, y, z, w) = (q.v.x, q.v.y, q.v.z, q.w);
    [
        [
            w * w + x * x - y * y - z * z,
            2.0 * (x * y - w * z),
            2.0 * (x * z + w * y),
        ],
        [
            2.0 * (x * y + w * z),
            w * w - x * x + y * y - z * z,
            2.0 * (y * z - w * x),
        ],
        [
            2.0 * (x * z - w * y),
            2.0 * (y * z + w * x),
            w * w - x * x - y * y + z * z,
        ],
    ]
}

fn upper3x3(m: &Matrix4x4) -> Matrix3 {
    let mut r = [[0.0; 3]; 3];
    for i in 0..3 {
        r[i].copy_from_slice(&m.m[i][..3]);
    }
    r
}

fn mul3(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut r = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            r[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    r
}

/// `sa·a + sb·b`
fn combine(a: &Matrix3, sa: Float, b: &Matrix3, sb: Float) -> Matrix3 {
    let mut r = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            r[i][j] = sa * a[i][j] + sb * b[i][j];
        }
    }
    r
}

fn scale3(a: &Matrix3, s: Float) -> Matrix3 {
    let mut r = *a;
    for row in r.iter_mut() {
        for v in row.iter_mut() {
            *v *= s;
        }
    }
    r
}

/// Coefficients `c1..c5` of the derivative of a point's path,
///
/// dp/dt = c1 + (c2 + c3·t)·cos(2θt) + (c4 + c5·t)·sin(2θt)
///
/// indexed as `[axis][term]`. With `q(t) = q0·cos(θt) + q⊥·sin(θt)` the
/// rotation is `A + B·cos(2θt) + C·sin(2θt)`, and scale and translation are
/// linear in `t`, which gives the five terms below.
fn derivative_terms(
    t: &[Vector3f; 2],
    r: &[Quaternion; 2],
    s: &[Matrix4x4; 2],
) -> [[DerivativeTerm; 5]; 3] {
    let cos_theta = r[0].dot(&r[1]);
    let theta = clamp(cos_theta, -1.0, 1.0).acos();
    let qperp = (r[1] - r[0] * cos_theta).normalize();

    let ra = rotation_form(&r[0]);
    let rb = rotation_form(&qperp);
    let rab = rotation_form(&(r[0] + qperp));
    let a = combine(&ra, 0.5, &rb, 0.5);
    let b = combine(&ra, 0.5, &rb, -0.5);
    let c = combine(&combine(&rab, 0.5, &ra, -0.5), 1.0, &rb, -0.5);

    let s0 = upper3x3(&s[0]);
    let ds = combine(&upper3x3(&s[1]), 1.0, &s0, -1.0);
    let dt = t[1] - t[0];

    let a_ds = mul3(&a, &ds);
    let b_ds = mul3(&b, &ds);
    let c_ds = mul3(&c, &ds);
    let b_s0 = mul3(&b, &s0);
    let c_s0 = mul3(&c, &s0);

    let two_theta = 2.0 * theta;
    let c2 = combine(&b_ds, 1.0, &c_s0, two_theta);
    let c3 = scale3(&c_ds, two_theta);
    let c4 = combine(&c_ds, 1.0, &b_s0, -two_theta);
    let c5 = scale3(&b_ds, -two_theta);

    let row = |kc: Float, m: &Matrix3, axis: usize| {
        DerivativeTerm::new(kc, m[axis][0], m[axis][1], m[axis][2])
    };
    let mut terms = [[DerivativeTerm::default(); 5]; 3];
    for (axis, axis_terms) in terms.iter_mut().enumerate() {
        *axis_terms = [
            row(dt[axis], &a_ds, axis),
            row(0.0, &c2, axis),
            row(0.0, &c3, axis),
            row(0.0, &c4, axis),
            row(0.0, &c5, axis),
        ];
    }
    terms
}

/// A transform that varies between two keyframes over `[start_time, end_time]`.
///
/// Both keyframes are decomposed into translation, rotation and scale once, at
/// construction; intermediate times blend translation and scale linearly and
/// slerp the rotation.
#[derive(Debug, Clone, Copy)]
pub struct AnimatedTransform {
    start_transform: Transform,
    end_transform: Transform,
    start_time: Float,
    end_time: Float,
    actually_animated: bool,
    t: [Vector3f; 2],
    r: [Quaternion; 2],
    s: [Matrix4x4; 2],
    has_rotation: bool,
    c: [[DerivativeTerm; 5]; 3],
}

impl AnimatedTransform {
    pub fn new(
        start_transform: Transform,
        start_time: Float,
        end_transform: Transform,
        end_time: Float,
    ) -> Result<Self> {
        let actually_animated = start_transform != end_transform;
        let mut at = AnimatedTransform {
            start_transform,
            end_transform,
            start_time,
            end_time,
            actually_animated,
            t: [Vector3f::default(); 2],
            r: [Quaternion::default(); 2],
            s: [Matrix4x4::identity(); 2],
            has_rotation: false,
            c: [[DerivativeTerm::default(); 5]; 3],
        };
        if !actually_animated {
            log::debug!("static transform over [{}, {}]", start_time, end_time);
            return Ok(at);
        }

        let d0 = decompose(start_transform.matrix())?;
        let d1 = decompose(end_transform.matrix())?;
        at.t = [d0.translation, d1.translation];
        at.r = [d0.rotation, d1.rotation];
        at.s = [d0.scale, d1.scale];

        // q and -q are the same rotation; take the short way round
        if at.r[0].dot(&at.r[1]) < 0.0 {
            at.r[1] = -at.r[1];
        }
        at.has_rotation = at.r[0].dot(&at.r[1]) < SLERP_LINEAR_THRESHOLD;
        if at.has_rotation {
            at.c = derivative_terms(&at.t, &at.r, &at.s);
        }
        log::debug!(
            "animated transform over [{}, {}], rotating: {}",
            start_time, end_time, at.has_rotation
        );
        Ok(at)
    }

    pub fn start_transform(&self) -> &Transform {
        &self.start_transform
    }

    pub fn end_transform(&self) -> &Transform {
        &self.end_transform
    }

    pub fn is_animated(&self) -> bool {
        self.actually_animated
    }

    pub fn has_rotation(&self) -> bool {
        self.has_rotation
    }

    pub fn has_scale(&self) -> bool {
        self.start_transform.has_scale() || self.end_transform.has_scale()
    }

    /// The transform in effect at `time`, clamped to the keyframes outside
    /// the time range.
    pub fn interpolate(&self, time: Float) -> Result<Transform> {
        if !self.actually_animated || time <= self.start_time {
            return Ok(self.start_transform);
        }
        if time >= self.end_time {
            return Ok(self.end_transform);
        }
        let dt = (time - self.start_time) / (self.end_time - self.start_time);
        let trans = self.t[0] * (1.0 - dt) + self.t[1] * dt;
        let rotate = self.r[0].slerp(dt, &self.r[1]);
        let mut scale = Matrix4x4::identity();
        for i in 0..3 {
            for j in 0..3 {
                scale.m[i][j] = lerp(dt, self.s[0].m[i][j], self.s[1].m[i][j]);
            }
        }
        Ok(&(&Transform::translate(&trans) * &rotate.to_transform()) * &Transform::try_from(scale)?)
    }

    pub fn apply_point(&self, time: Float, p: &Point3f) -> Result<Point3f> {
        Ok(&self.interpolate(time)? * p)
    }

    pub fn apply_vector(&self, time: Float, v: &Vector3f) -> Result<Vector3f> {
        Ok(&self.interpolate(time)? * v)
    }

    /// Transforms `r` by the transform at `r.time`.
    pub fn apply_ray(&self, r: &Ray) -> Result<Ray> {
        let mut tr = &self.interpolate(r.time)? * r;
        tr.time = r.time;
        Ok(tr)
    }

    pub fn apply_ray_differential(&self, r: &RayDifferential) -> Result<RayDifferential> {
        let mut tr = &self.interpolate(r.time)? * r;
        tr.time = r.time;
        Ok(tr)
    }

    /// Bounds of `b` over the whole time range, using the default root
    /// isolation settings.
    pub fn motion_bounds(&self, b: &Bounds3f) -> Result<Bounds3f> {
        self.motion_bounds_with(b, MotionBoundsConfig::default())
    }

    pub fn motion_bounds_with(&self, b: &Bounds3f, config: MotionBoundsConfig) -> Result<Bounds3f> {
        if !self.actually_animated {
            return Ok(&self.start_transform * b);
        }
        if !self.has_rotation {
            return Ok((&self.start_transform * b).union(&(&self.end_transform * b)));
        }
        let mut bounds = self.bound_point_motion_with(&b.corner(0), config)?;
        for corner in 1..8 {
            bounds = bounds.union(&self.bound_point_motion_with(&b.corner(corner), config)?);
        }
        Ok(bounds)
    }

    pub fn bound_point_motion(&self, p: &Point3f) -> Result<Bounds3f> {
        self.bound_point_motion_with(p, MotionBoundsConfig::default())
    }

    /// Bounds the path of `p` by its two endpoints plus every time at which
    /// the path reaches an extremum along some axis.
    pub fn bound_point_motion_with(&self, p: &Point3f, config: MotionBoundsConfig) -> Result<Bounds3f> {
        if !self.actually_animated {
            return Ok(Bounds3f::from(&self.start_transform * p));
        }
        let mut bounds = Bounds3f::new(&self.start_transform * p, &self.end_transform * p);
        if !self.has_rotation {
            return Ok(bounds);
        }
        let cos_theta = self.r[0].dot(&self.r[1]);
        let theta = clamp(cos_theta, -1.0, 1.0).acos();
        for (axis, terms) in self.c.iter().enumerate() {
            let c = [
                terms[0].eval(p),
                terms[1].eval(p),
                terms[2].eval(p),
                terms[3].eval(p),
                terms[4].eval(p),
            ];
            let zeros = interval_find_zeros(
                c,
                theta,
                Interval::new(0.0, 1.0),
                config.depth,
                config.newton_iterations,
            );
            log::trace!("axis {}: {} extrema found", axis, zeros.len());
            for zero in zeros {
                let pz = self.apply_point(lerp(zero, self.start_time, self.end_time), p)?;
                bounds = bounds.union_point(&pz);
            }
        }
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::{approx_eq, assert_approx_eq};

    fn assert_matrix_eq(a: &Matrix4x4, b: &Matrix4x4) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    approx_eq!(Float, a.m[i][j], b.m[i][j], epsilon = 1e-6),
                    "\n{:?}\n!=\n{:?}",
                    a,
                    b
                );
            }
        }
    }

    fn trs(t: Vector3f, rot_z: Float, s: Float) -> Transform {
        &(&Transform::translate(&t) * &Transform::rotate_z(rot_z)) * &Transform::scale(s, s, s)
    }

    #[test]
    fn derivative_term_is_affine_in_the_point() {
        let d = DerivativeTerm::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(d.eval(&Point3f::new(1.0, 1.0, 1.0)), 10.0);
        assert_eq!(d.eval(&Point3f::new(0.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn decompose_translate_rotate_scale() {
        let m = trs(Vector3f::new(1.0, 2.0, 3.0), 180.0, 2.0);
        let d = decompose(m.matrix()).unwrap();
        assert_approx_eq!(Float, d.translation.x, 1.0);
        assert_approx_eq!(Float, d.translation.y, 2.0);
        assert_approx_eq!(Float, d.translation.z, 3.0);
        assert_approx_eq!(Float, d.rotation.v.x, 0.0, epsilon = 1e-6);
        assert_approx_eq!(Float, d.rotation.v.y, 0.0, epsilon = 1e-6);
        assert_approx_eq!(Float, d.rotation.v.z.abs(), 1.0, epsilon = 1e-6);
        assert_approx_eq!(Float, d.rotation.w, 0.0, epsilon = 1e-6);
        assert_matrix_eq(&d.scale, Transform::scale(2.0, 2.0, 2.0).matrix());
    }

    #[test]
    fn decompose_pure_translation() {
        let m = Transform::translate(&Vector3f::new(-4.0, 5.0, 6.0));
        let d = decompose(m.matrix()).unwrap();
        assert_eq!(d.translation, Vector3f::new(-4.0, 5.0, 6.0));
        assert_eq!(d.rotation, Quaternion::default());
        assert_matrix_eq(&d.scale, &Matrix4x4::identity());
    }

    #[test]
    fn decompose_recomposes() {
        let m = &(&Transform::translate(&Vector3f::new(0.5, -1.0, 2.0))
            * &Transform::rotate(70.0, &Vector3f::new(1.0, -2.0, 0.5)))
            * &Transform::scale(1.5, 0.5, 3.0);
        let d = decompose(m.matrix()).unwrap();
        let back = &(&Transform::translate(&d.translation) * &d.rotation.to_transform())
            * &Transform::try_from(d.scale).unwrap();
        assert_matrix_eq(back.matrix(), m.matrix());
    }

    #[test]
    fn decompose_singular_matrix_fails() {
        let m = Transform::scale(1.0, 0.0, 1.0);
        assert!(decompose(m.matrix()).is_err());
    }

    #[test]
    fn interpolation_clamps_to_keyframes() {
        let end = Transform::translate(&Vector3f::new(1.0, 2.0, 3.0));
        let at = AnimatedTransform::new(Transform::identity(), 0.0, end, 10.0).unwrap();
        assert!(at.is_animated());
        assert!(!at.has_rotation());
        assert_eq!(at.interpolate(-1.0).unwrap(), Transform::identity());
        assert_eq!(at.interpolate(0.0).unwrap(), Transform::identity());
        assert_eq!(at.interpolate(10.0).unwrap(), end);
        assert_eq!(at.interpolate(11.0).unwrap(), end);
        assert_matrix_eq(
            at.interpolate(5.0).unwrap().matrix(),
            Transform::translate(&Vector3f::new(0.5, 1.0, 1.5)).matrix(),
        );
    }

    #[test]
    fn interpolation_blends_each_factor() {
        let end = trs(Vector3f::new(1.0, 2.0, 3.0), 90.0, 3.0);
        let at = AnimatedTransform::new(Transform::identity(), 0.0, end, 10.0).unwrap();
        assert!(at.has_rotation());
        assert!(at.has_scale());
        assert_matrix_eq(
            at.interpolate(5.0).unwrap().matrix(),
            trs(Vector3f::new(0.5, 1.0, 1.5), 45.0, 2.0).matrix(),
        );

        let rot = AnimatedTransform::new(Transform::identity(), 0.0, Transform::rotate_z(90.0), 10.0)
            .unwrap();
        assert_matrix_eq(
            rot.interpolate(5.0).unwrap().matrix(),
            Transform::rotate_z(45.0).matrix(),
        );

        let scale = AnimatedTransform::new(Transform::identity(), 0.0, Transform::scale(3.0, 3.0, 3.0), 10.0)
            .unwrap();
        assert!(!scale.has_rotation());
        assert_matrix_eq(
            scale.interpolate(5.0).unwrap().matrix(),
            Transform::scale(2.0, 2.0, 2.0).matrix(),
        );
    }

    #[test]
    fn rotation_takes_the_short_way() {
        // 270° one way is 90° the other
        let at = AnimatedTransform::new(Transform::identity(), 0.0, Transform::rotate_z(270.0), 1.0).unwrap();
        assert_matrix_eq(
            at.interpolate(0.5).unwrap().matrix(),
            Transform::rotate_z(-45.0).matrix(),
        );
    }

    #[test]
    fn applies_at_ray_time() {
        let at = AnimatedTransform::new(
            Transform::identity(),
            0.0,
            Transform::translate(&Vector3f::new(1.0, 2.0, 3.0)),
            10.0,
        )
        .unwrap();
        let r = Ray::new(Point3f::default(), Vector3f::new(0.0, 0.0, 1.0), 100.0, 5.0);
        let tr = at.apply_ray(&r).unwrap();
        assert_approx_eq!(Float, tr.o.x, 0.5, epsilon = 1e-9);
        assert_approx_eq!(Float, tr.o.y, 1.0, epsilon = 1e-9);
        assert_approx_eq!(Float, tr.o.z, 1.5, epsilon = 1e-9);
        assert_eq!(tr.time, 5.0);

        let rd = at.apply_ray_differential(&RayDifferential::from(r)).unwrap();
        assert_eq!(rd.ray, tr);

        assert_eq!(
            at.apply_point(20.0, &Point3f::default()).unwrap(),
            Point3f::new(1.0, 2.0, 3.0)
        );
        assert_eq!(
            at.apply_vector(5.0, &Vector3f::new(1.0, 0.0, 0.0)).unwrap(),
            Vector3f::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn static_transform_skips_decomposition() {
        let t = Transform::rotate_x(30.0);
        let at = AnimatedTransform::new(t, 0.0, t, 1.0).unwrap();
        assert!(!at.is_animated());
        assert!(!at.has_rotation());
        let b = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        assert_eq!(at.motion_bounds(&b).unwrap(), &t * &b);
        assert_eq!(at.interpolate(0.5).unwrap(), t);
    }

    #[test]
    fn translation_only_motion_is_the_union_of_keyframes() {
        let start = Transform::identity();
        let end = Transform::translate(&Vector3f::new(5.0, 0.0, 0.0));
        let at = AnimatedTransform::new(start, 0.0, end, 1.0).unwrap();
        let b = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        let mb = at.motion_bounds(&b).unwrap();
        assert_eq!(mb, b.union(&(&end * &b)));
    }

    #[test]
    fn rotating_motion_bounds_contain_swept_box() {
        let at = AnimatedTransform::new(Transform::identity(), 0.0, Transform::rotate_z(90.0), 1.0).unwrap();
        assert!(at.has_rotation());
        let b = Bounds3f::new(Point3f::new(1.0, -0.5, 0.0), Point3f::new(2.0, 0.5, 1.0));
        let mb = at.motion_bounds(&b).unwrap();

        // the far corner (2, 0.5) sweeps through radius √4.25 at 45°-ish
        let radius = (4.25 as Float).sqrt();
        assert!(mb.p_max.x > 2.05 && mb.p_max.x <= radius + 1e-6);
        assert!(mb.p_max.y > 2.05 && mb.p_max.y <= radius + 1e-6);

        let slack = mb.expand(1e-6);
        for i in 0..=100 {
            let time = i as Float / 100.0;
            let t = at.interpolate(time).unwrap();
            for corner in 0..8 {
                let p = &t * &b.corner(corner);
                assert!(slack.inside(&p), "{:?} at t={} outside {:?}", p, time, mb);
            }
        }
    }

    #[test]
    fn rotating_point_hits_axis_extremum() {
        // (1, 0, 0) rotating 180° about z passes through (0, 1, 0)
        let at = AnimatedTransform::new(Transform::identity(), 0.0, Transform::rotate_z(180.0), 1.0).unwrap();
        let pb = at.bound_point_motion(&Point3f::new(1.0, 0.0, 0.0)).unwrap();
        assert_approx_eq!(Float, pb.p_max.y, 1.0, epsilon = 1e-6);
        assert_approx_eq!(Float, pb.p_min.x, -1.0, epsilon = 1e-6);
        assert_approx_eq!(Float, pb.p_max.x, 1.0, epsilon = 1e-6);

        let shallow = at
            .bound_point_motion_with(
                &Point3f::new(1.0, 0.0, 0.0),
                MotionBoundsConfig {
                    depth: 4,
                    newton_iterations: 8,
                },
            )
            .unwrap();
        assert_approx_eq!(Float, shallow.p_max.y, 1.0, epsilon = 1e-6);
    }
}
