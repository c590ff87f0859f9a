use crate::core::error::{Error, Result};
use crate::core::geometry::{Bounds3f, Normal3f, Point3f, Ray, RayDifferential, Vector3f};
use crate::core::interaction::{Shading, SurfaceInteraction};
use crate::core::pbrt::{radians, Float, GAMMA3};
use std::convert::TryFrom;
use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4x4 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        t00: Float,
        t01: Float,
        t02: Float,
        t03: Float,
        t10: Float,
        t11: Float,
        t12: Float,
        t13: Float,
        t20: Float,
        t21: Float,
        t22: Float,
        t23: Float,
        t30: Float,
        t31: Float,
        t32: Float,
        t33: Float,
    ) -> Self {
        Self {
            m: [
                [t00, t01, t02, t03],
                [t10, t11, t12, t13],
                [t20, t21, t22, t23],
                [t30, t31, t32, t33],
            ],
        }
    }

    pub fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn is_identity(&self) -> bool {
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                if self.m[i][j] != expected {
                    return false;
                }
            }
        }
        true
    }

    /// Gauss-Jordan elimination with full pivoting: each step picks the
    /// largest remaining entry of the unreduced submatrix as the pivot, and the
    /// column permutation is undone once the elimination is finished.
    pub fn inverse(&self) -> Result<Matrix4x4> {
        let mut indexc = [0usize; 4];
        let mut indexr = [0usize; 4];
        let mut ipiv = [0usize; 4];
        let mut minv = self.m;
        for i in 0..4 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for k in 0..4 {
                        if ipiv[k] == 0 {
                            if minv[j][k].abs() >= big {
                                big = minv[j][k].abs();
                                irow = j;
                                icol = k;
                            }
                        } else if ipiv[k] > 1 {
                            return Err(Error::SingularMatrix);
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            if irow != icol {
                minv.swap(irow, icol);
            }

            indexr[i] = irow;
            indexc[i] = icol;
            if minv[icol][icol] == 0.0 {
                return Err(Error::SingularMatrix);
            }

            let pivinv = 1.0 / minv[icol][icol];
            minv[icol][icol] = 1.0;
            for j in 0..4 {
                minv[icol][j] *= pivinv;
            }

            for j in 0..4 {
                if j != icol {
                    let save = minv[j][icol];
                    minv[j][icol] = 0.0;
                    for k in 0..4 {
                        minv[j][k] -= minv[icol][k] * save;
                    }
                }
            }
        }

        for j in (0..4).rev() {
            if indexr[j] != indexc[j] {
                for row in minv.iter_mut() {
                    row.swap(indexr[j], indexc[j]);
                }
            }
        }

        Ok(minv.into())
    }

    pub fn transpose(&self) -> Matrix4x4 {
        let mut r = *self;
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = self.m[j][i];
            }
        }
        r
    }

    /// Determinant of the upper-left 3×3 block.
    pub fn determinant3x3(&self) -> Float {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }
}

impl From<[[Float; 4]; 4]> for Matrix4x4 {
    fn from(m: [[Float; 4]; 4]) -> Self {
        Self { m }
    }
}

impl Mul for &Matrix4x4 {
    type Output = Matrix4x4;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut r = Matrix4x4::identity();
        for i in 0..4 {
            for j in 0..4 {
                r.m[i][j] = self.m[i][0] * rhs.m[0][j]
                    + self.m[i][1] * rhs.m[1][j]
                    + self.m[i][2] * rhs.m[2][j]
                    + self.m[i][3] * rhs.m[3][j];
            }
        }
        r
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

/// An affine (or projective) map stored together with its inverse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    m: Matrix4x4,
    m_inv: Matrix4x4,
}

impl Transform {
    /// Builds a transform from a matrix and its already known inverse.
    pub fn new(m: Matrix4x4, m_inv: Matrix4x4) -> Transform {
        Transform { m, m_inv }
    }

    pub fn identity() -> Transform {
        Transform::default()
    }

    pub fn inverse(&self) -> Transform {
        Self {
            m: self.m_inv,
            m_inv: self.m,
        }
    }

    pub fn transpose(&self) -> Transform {
        Self {
            m: self.m.transpose(),
            m_inv: self.m_inv.transpose(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.m.is_identity()
    }

    pub fn matrix(&self) -> &Matrix4x4 {
        &self.m
    }

    pub fn inverse_matrix(&self) -> &Matrix4x4 {
        &self.m_inv
    }

    pub fn has_scale(&self) -> bool {
        let not_one = |x: Float| !(0.999..=1.001).contains(&x);
        let la2 = (self * &Vector3f::new(1.0, 0.0, 0.0)).length_squared();
        let lb2 = (self * &Vector3f::new(0.0, 1.0, 0.0)).length_squared();
        let lc2 = (self * &Vector3f::new(0.0, 0.0, 1.0)).length_squared();
        not_one(la2) || not_one(lb2) || not_one(lc2)
    }

    pub fn swaps_handedness(&self) -> bool {
        self.m.determinant3x3() < 0.0
    }

    pub fn translate(delta: &Vector3f) -> Self {
        let m: Matrix4x4 = [
            [1.0, 0.0, 0.0, delta.x],
            [0.0, 1.0, 0.0, delta.y],
            [0.0, 0.0, 1.0, delta.z],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        let m_inv: Matrix4x4 = [
            [1.0, 0.0, 0.0, -delta.x],
            [0.0, 1.0, 0.0, -delta.y],
            [0.0, 0.0, 1.0, -delta.z],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        Self { m, m_inv }
    }

    pub fn scale(x: Float, y: Float, z: Float) -> Self {
        let m: Matrix4x4 = [
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        let m_inv: Matrix4x4 = [
            [1.0 / x, 0.0, 0.0, 0.0],
            [0.0, 1.0 / y, 0.0, 0.0],
            [0.0, 0.0, 1.0 / z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        Self { m, m_inv }
    }

    /// Rotation about the x axis by `theta` degrees.
    pub fn rotate_x(theta: Float) -> Self {
        let theta = radians(theta);
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        let m: Matrix4x4 = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, cos_theta, -sin_theta, 0.0],
            [0.0, sin_theta, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        Self {
            m_inv: m.transpose(),
            m,
        }
    }

    /// Rotation about the y axis by `theta` degrees.
    pub fn rotate_y(theta: Float) -> Self {
        let theta = radians(theta);
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        let m: Matrix4x4 = [
            [cos_theta, 0.0, sin_theta, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-sin_theta, 0.0, cos_theta, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        Self {
            m_inv: m.transpose(),
            m,
        }
    }

    /// Rotation about the z axis by `theta` degrees.
    pub fn rotate_z(theta: Float) -> Self {
        let theta = radians(theta);
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        let m: Matrix4x4 = [
            [cos_theta, -sin_theta, 0.0, 0.0],
            [sin_theta, cos_theta, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
        .into();
        Self {
            m_inv: m.transpose(),
            m,
        }
    }

    /// Rotation by `theta` degrees about an arbitrary `axis`.
    pub fn rotate(theta: Float, axis: &Vector3f) -> Self {
        let a = axis.normalize();
        let theta = radians(theta);
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        let mut m = Matrix4x4::identity();
        m.m[0][0] = a.x * a.x + (1.0 - a.x * a.x) * cos_theta;
        m.m[0][1] = a.x * a.y * (1.0 - cos_theta) - a.z * sin_theta;
        m.m[0][2] = a.x * a.z * (1.0 - cos_theta) + a.y * sin_theta;
        m.m[0][3] = 0.0;

        m.m[1][0] = a.x * a.y * (1.0 - cos_theta) + a.z * sin_theta;
        m.m[1][1] = a.y * a.y + (1.0 - a.y * a.y) * cos_theta;
        m.m[1][2] = a.y * a.z * (1.0 - cos_theta) - a.x * sin_theta;
        m.m[1][3] = 0.0;

        m.m[2][0] = a.x * a.z * (1.0 - cos_theta) - a.y * sin_theta;
        m.m[2][1] = a.y * a.z * (1.0 - cos_theta) + a.x * sin_theta;
        m.m[2][2] = a.z * a.z + (1.0 - a.z * a.z) * cos_theta;
        m.m[2][3] = 0.0;

        Self {
            m_inv: m.transpose(),
            m,
        }
    }

    /// World-to-camera transform for a camera at `pos` looking at `look`.
    pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Result<Self> {
        let mut camera_to_world = Matrix4x4::identity();

        camera_to_world.m[0][3] = pos.x;
        camera_to_world.m[1][3] = pos.y;
        camera_to_world.m[2][3] = pos.z;
        camera_to_world.m[3][3] = 1.0;

        let view = *look - *pos;
        if !(view.length_squared() > 0.0) || !(up.length_squared() > 0.0) {
            return Err(Error::DegenerateLookAt);
        }
        let dir = view.normalize();
        let right = up.normalize().cross(&dir);
        // also rejects NaN from non-finite inputs
        if !(right.length() > 0.0) {
            return Err(Error::DegenerateLookAt);
        }

        let right = right.normalize();
        let new_up = dir.cross(&right);

        camera_to_world.m[0][0] = right.x;
        camera_to_world.m[1][0] = right.y;
        camera_to_world.m[2][0] = right.z;
        camera_to_world.m[3][0] = 0.;
        camera_to_world.m[0][1] = new_up.x;
        camera_to_world.m[1][1] = new_up.y;
        camera_to_world.m[2][1] = new_up.z;
        camera_to_world.m[3][1] = 0.;
        camera_to_world.m[0][2] = dir.x;
        camera_to_world.m[1][2] = dir.y;
        camera_to_world.m[2][2] = dir.z;
        camera_to_world.m[3][2] = 0.;

        Ok(Self {
            m: camera_to_world.inverse()?,
            m_inv: camera_to_world,
        })
    }

    pub fn orthographic(near: Float, far: Float) -> Self {
        &Self::scale(1.0, 1.0, 1.0 / (far - near)) * &Self::translate(&Vector3f::new(0.0, 0.0, -near))
    }

    /// Perspective projection with a field of view of `fov` degrees.
    pub fn perspective(fov: Float, n: Float, f: Float) -> Result<Self> {
        let persp: Matrix4x4 = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, f / (f - n), -f * n / (f - n)],
            [0.0, 0.0, 1.0, 0.0],
        ]
        .into();
        let inv_tan_ang = 1.0 / (radians(fov) / 2.0).tan();
        let trans = Transform::try_from(persp)?;
        Ok(&Self::scale(inv_tan_ang, inv_tan_ang, 1.0) * &trans)
    }

    /// Applies the transform to `p` and returns a conservative bound on the
    /// absolute rounding error of the result.
    pub fn apply_point_with_error(&self, p: &Point3f) -> (Point3f, Vector3f) {
        let (x, y, z) = (p.x, p.y, p.z);
        let m = &self.m.m;
        let xp = m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3];
        let yp = m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3];
        let zp = m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3];
        let wp = m[3][0] * x + m[3][1] * y + m[3][2] * z + m[3][3];

        let x_abs_sum = (m[0][0] * x).abs() + (m[0][1] * y).abs() + (m[0][2] * z).abs() + m[0][3].abs();
        let y_abs_sum = (m[1][0] * x).abs() + (m[1][1] * y).abs() + (m[1][2] * z).abs() + m[1][3].abs();
        let z_abs_sum = (m[2][0] * x).abs() + (m[2][1] * y).abs() + (m[2][2] * z).abs() + m[2][3].abs();
        let p_error = Vector3f::new(x_abs_sum, y_abs_sum, z_abs_sum) * GAMMA3;

        let pt = Point3f::new(xp, yp, zp);
        if wp == 1.0 {
            (pt, p_error)
        } else {
            (pt / wp, p_error)
        }
    }

    /// Like [`Transform::apply_point_with_error`] for a point that already
    /// carries the absolute error `pt_error`.
    pub fn apply_point_with_abs_error(&self, pt: &Point3f, pt_error: &Vector3f) -> (Point3f, Vector3f) {
        let (x, y, z) = (pt.x, pt.y, pt.z);
        let m = &self.m.m;
        let xp = m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3];
        let yp = m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3];
        let zp = m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3];
        let wp = m[3][0] * x + m[3][1] * y + m[3][2] * z + m[3][3];

        let mut abs_error = Vector3f::default();
        for i in 0..3 {
            abs_error[i] = (GAMMA3 + 1.0)
                * (m[i][0].abs() * pt_error.x + m[i][1].abs() * pt_error.y + m[i][2].abs() * pt_error.z)
                + GAMMA3
                    * ((m[i][0] * x).abs() + (m[i][1] * y).abs() + (m[i][2] * z).abs() + m[i][3].abs());
        }

        let p = Point3f::new(xp, yp, zp);
        if wp == 1.0 {
            (p, abs_error)
        } else {
            (p / wp, abs_error)
        }
    }

    pub fn apply_vector_with_error(&self, v: &Vector3f) -> (Vector3f, Vector3f) {
        let (x, y, z) = (v.x, v.y, v.z);
        let m = &self.m.m;
        let mut abs_error = Vector3f::default();
        for i in 0..3 {
            abs_error[i] = GAMMA3 * ((m[i][0] * x).abs() + (m[i][1] * y).abs() + (m[i][2] * z).abs());
        }
        (self * v, abs_error)
    }

    pub fn apply_vector_with_abs_error(&self, v: &Vector3f, v_error: &Vector3f) -> (Vector3f, Vector3f) {
        let (x, y, z) = (v.x, v.y, v.z);
        let m = &self.m.m;
        let mut abs_error = Vector3f::default();
        for i in 0..3 {
            abs_error[i] = (GAMMA3 + 1.0)
                * (m[i][0].abs() * v_error.x + m[i][1].abs() * v_error.y + m[i][2].abs() * v_error.z)
                + GAMMA3 * ((m[i][0] * x).abs() + (m[i][1] * y).abs() + (m[i][2] * z).abs());
        }
        (self * v, abs_error)
    }

    /// Transforms `r` and reports the error bounds of the new origin and
    /// direction. The origin is advanced to the edge of its error box along
    /// the direction, and `t_max` is shortened by the same amount.
    pub fn apply_ray_with_error(&self, r: &Ray) -> (Ray, Vector3f, Vector3f) {
        let (mut o, o_error) = self.apply_point_with_error(&r.o);
        let (d, d_error) = self.apply_vector_with_error(&r.d);
        let length_squared = d.length_squared();
        let mut t_max = r.t_max;
        if length_squared > 0.0 {
            let dt = d.abs().dot(&o_error) / length_squared;
            o += d * dt;
            t_max -= dt;
        }
        (Ray::new(o, d, t_max, r.time), o_error, d_error)
    }
}

impl TryFrom<Matrix4x4> for Transform {
    type Error = Error;

    fn try_from(m: Matrix4x4) -> Result<Self> {
        Ok(Transform {
            m_inv: m.inverse()?,
            m,
        })
    }
}

impl TryFrom<[[Float; 4]; 4]> for Transform {
    type Error = Error;

    fn try_from(m: [[Float; 4]; 4]) -> Result<Self> {
        Transform::try_from(Matrix4x4::from(m))
    }
}

impl Mul<&Point3f> for &Transform {
    type Output = Point3f;

    fn mul(self, rhs: &Point3f) -> Self::Output {
        let (x, y, z) = (rhs.x, rhs.y, rhs.z);
        let m = &self.m.m;
        let xp = m[0][0] * x + m[0][1] * y + m[0][2] * z + m[0][3];
        let yp = m[1][0] * x + m[1][1] * y + m[1][2] * z + m[1][3];
        let zp = m[2][0] * x + m[2][1] * y + m[2][2] * z + m[2][3];
        let wp = m[3][0] * x + m[3][1] * y + m[3][2] * z + m[3][3];
        if wp == 1.0 {
            Point3f::new(xp, yp, zp)
        } else {
            Point3f::new(xp, yp, zp) / wp
        }
    }
}

impl Mul<&Vector3f> for &Transform {
    type Output = Vector3f;

    fn mul(self, rhs: &Vector3f) -> Self::Output {
        let (x, y, z) = (rhs.x, rhs.y, rhs.z);
        let m = &self.m.m;
        Vector3f::new(
            m[0][0] * x + m[0][1] * y + m[0][2] * z,
            m[1][0] * x + m[1][1] * y + m[1][2] * z,
            m[2][0] * x + m[2][1] * y + m[2][2] * z,
        )
    }
}

/// Normals transform by the inverse transpose.
impl Mul<&Normal3f> for &Transform {
    type Output = Normal3f;

    fn mul(self, rhs: &Normal3f) -> Self::Output {
        let (x, y, z) = (rhs.x, rhs.y, rhs.z);
        let m = &self.m_inv.m;
        Normal3f::new(
            m[0][0] * x + m[1][0] * y + m[2][0] * z,
            m[0][1] * x + m[1][1] * y + m[2][1] * z,
            m[0][2] * x + m[1][2] * y + m[2][2] * z,
        )
    }
}

impl Mul<&Ray> for &Transform {
    type Output = Ray;

    fn mul(self, rhs: &Ray) -> Self::Output {
        self.apply_ray_with_error(rhs).0
    }
}

impl Mul<&RayDifferential> for &Transform {
    type Output = RayDifferential;

    fn mul(self, rhs: &RayDifferential) -> Self::Output {
        let tr = self * &rhs.ray;
        RayDifferential {
            ray: tr,
            has_differentials: rhs.has_differentials,
            rx_origin: self * &rhs.rx_origin,
            ry_origin: self * &rhs.ry_origin,
            rx_direction: self * &rhs.rx_direction,
            ry_direction: self * &rhs.ry_direction,
        }
    }
}

/// Transforms all eight corners, so the result stays conservative under any
/// affine map.
impl Mul<&Bounds3f> for &Transform {
    type Output = Bounds3f;

    fn mul(self, rhs: &Bounds3f) -> Self::Output {
        (1..8).fold(Bounds3f::from(self * &rhs.corner(0)), |b, i| {
            b.union_point(&(self * &rhs.corner(i)))
        })
    }
}

impl Mul for &Transform {
    type Output = Transform;

    fn mul(self, rhs: Self) -> Self::Output {
        Transform {
            m: self.m * rhs.m,
            m_inv: rhs.m_inv * self.m_inv,
        }
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

impl Mul<&SurfaceInteraction> for &Transform {
    type Output = SurfaceInteraction;

    fn mul(self, si: &SurfaceInteraction) -> Self::Output {
        let mut ret = *si;
        let (p, p_error) = self.apply_point_with_abs_error(&si.p, &si.p_error);
        ret.p = p;
        ret.p_error = p_error;
        ret.n = (self * &si.n).normalize();
        ret.wo = (self * &si.wo).normalize();
        ret.dpdu = self * &si.dpdu;
        ret.dpdv = self * &si.dpdv;
        ret.dndu = self * &si.dndu;
        ret.dndv = self * &si.dndv;
        let shading_n = (self * &si.shading.n).normalize().face_forward(&ret.n);
        ret.shading = Shading {
            n: shading_n,
            dpdu: self * &si.shading.dpdu,
            dpdv: self * &si.shading.dpdv,
            dndu: self * &si.shading.dndu,
            dndv: self * &si.shading.dndv,
        };
        ret
    }
}
