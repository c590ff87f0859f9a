use crate::core::geometry::Vector3f;
use crate::core::pbrt::{clamp, Float};
use crate::core::transform::{Matrix4x4, Transform};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Above this cosine two quaternions are close enough that `slerp` falls back
/// to a normalized linear blend.
pub const SLERP_LINEAR_THRESHOLD: Float = 0.9995;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub v: Vector3f,
    pub w: Float,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::new(Vector3f::new(0.0, 0.0, 0.0), 1.0)
    }
}

impl Quaternion {
    pub fn new(v: Vector3f, w: Float) -> Quaternion {
        Self { v, w }
    }

    pub fn normalize(&self) -> Quaternion {
        *self / (self.dot(self)).sqrt()
    }

    pub fn dot(&self, q: &Quaternion) -> Float {
        self.v.dot(&q.v) + self.w * q.w
    }

    pub fn slerp(&self, t: Float, q: &Quaternion) -> Quaternion {
        let cos_theta = self.dot(q);
        if cos_theta > SLERP_LINEAR_THRESHOLD {
            (*self * (1.0 - t) + *q * t).normalize()
        } else {
            let theta = clamp(cos_theta, -1.0, 1.0).acos();
            let thetap = theta * t;
            let qperp = (*q - *self * cos_theta).normalize();
            *self * thetap.cos() + qperp * thetap.sin()
        }
    }

    pub fn to_transform(&self) -> Transform {
        let xx = self.v.x * self.v.x;
        let yy = self.v.y * self.v.y;
        let zz = self.v.z * self.v.z;
        let xy = self.v.x * self.v.y;
        let xz = self.v.x * self.v.z;
        let yz = self.v.y * self.v.z;
        let wx = self.v.x * self.w;
        let wy = self.v.y * self.w;
        let wz = self.v.z * self.w;

        let mut m = Matrix4x4::identity();
        m.m[0][0] = 1.0 - 2.0 * (yy + zz);
        m.m[0][1] = 2.0 * (xy + wz);
        m.m[0][2] = 2.0 * (xz - wy);
        m.m[1][0] = 2.0 * (xy - wz);
        m.m[1][1] = 1.0 - 2.0 * (xx + zz);
        m.m[1][2] = 2.0 * (yz + wx);
        m.m[2][0] = 2.0 * (xz + wy);
        m.m[2][1] = 2.0 * (yz - wx);
        m.m[2][2] = 1.0 - 2.0 * (xx + yy);

        // m is the inverse rotation, its transpose is the rotation itself
        Transform::new(m.transpose(), m)
    }
}

impl Add for Quaternion {
    type Output = Quaternion;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            v: self.v + rhs.v,
            w: self.w + rhs.w,
        }
    }
}

impl AddAssign for Quaternion {
    fn add_assign(&mut self, rhs: Self) {
        self.w += rhs.w;
        self.v += rhs.v;
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            v: self.v - rhs.v,
            w: self.w - rhs.w,
        }
    }
}

impl SubAssign for Quaternion {
    fn sub_assign(&mut self, rhs: Self) {
        self.v -= rhs.v;
        self.w -= rhs.w;
    }
}

impl Mul<Float> for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Float) -> Self::Output {
        Self::Output {
            v: self.v * rhs,
            w: self.w * rhs,
        }
    }
}

impl MulAssign<Float> for Quaternion {
    fn mul_assign(&mut self, rhs: Float) {
        self.v *= rhs;
        self.w *= rhs;
    }
}

impl Div<Float> for Quaternion {
    type Output = Quaternion;

    fn div(self, rhs: Float) -> Self::Output {
        Self::Output {
            v: self.v / rhs,
            w: self.w / rhs,
        }
    }
}

impl DivAssign<Float> for Quaternion {
    fn div_assign(&mut self, rhs: Float) {
        self.v /= rhs;
        self.w /= rhs;
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;

    fn neg(self) -> Self::Output {
        Self::Output {
            w: -self.w,
            v: -self.v,
        }
    }
}

/// Extracts the rotation of the upper 3×3 block. Branches on the trace and,
/// when it is not positive, divides by the largest diagonal term so rotations
/// close to 180° stay well conditioned.
impl From<&Matrix4x4> for Quaternion {
    fn from(m: &Matrix4x4) -> Self {
        let m = &m.m;
        let trace = m[0][0] + m[1][1] + m[2][2];
        if trace > 0.0 {
            let mut s = (trace + 1.0).sqrt();
            let w = s / 2.0;
            s = 0.5 / s;
            Quaternion::new(
                Vector3f::new(
                    (m[2][1] - m[1][2]) * s,
                    (m[0][2] - m[2][0]) * s,
                    (m[1][0] - m[0][1]) * s,
                ),
                w,
            )
        } else {
            let nxt = [1, 2, 0];
            let mut q = [0.0 as Float; 3];
            let mut i = 0;
            if m[1][1] > m[0][0] {
                i = 1;
            }
            if m[2][2] > m[i][i] {
                i = 2;
            }
            let j = nxt[i];
            let k = nxt[j];
            let mut s = (m[i][i] - (m[j][j] + m[k][k]) + 1.0).sqrt();
            q[i] = s * 0.5;
            if s != 0.0 {
                s = 0.5 / s;
            }
            let w = (m[k][j] - m[j][k]) * s;
            q[j] = (m[j][i] + m[i][j]) * s;
            q[k] = (m[k][i] + m[i][k]) * s;
            Quaternion::new(Vector3f::new(q[0], q[1], q[2]), w)
        }
    }
}

impl From<&Transform> for Quaternion {
    fn from(t: &Transform) -> Self {
        Quaternion::from(t.matrix())
    }
}

impl From<&Quaternion> for Transform {
    fn from(q: &Quaternion) -> Self {
        q.to_transform()
    }
}
