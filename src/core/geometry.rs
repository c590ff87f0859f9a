use crate::core::pbrt::{next_float_down, next_float_up, Float, GAMMA3};
use derive_more::{Deref, DerefMut};
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

macro_rules! strip_plus {
    (+ $($rest:expr)+) => {
        $($rest)+
    };
}

macro_rules! match_index {
    ($index:ident, $n:expr,[$($indexes:expr),+], [$($arms:expr),+],) => {
        match $index {
            $(_i if _i == $indexes => $arms,)+
            _ => panic!("Out of index")
        }
    };
    ($index:ident, $n:expr, [$($indexes:expr),*], [$($arms:expr),*], $arm:expr $(;$rest:expr)*) => {
        match_index!($index, $n+1, [$($indexes,)* $n], [$($arms,)* $arm], $($rest);*)
    };
    ($index:ident, $($arms:expr);+) => {
        match_index!($index, 0, [], [], $($arms);+)
    }
}

/// Generates a tuple-like value type together with its scalar arithmetic,
/// component indexing and the precision-generic length helpers.
macro_rules! make_vector {
    (struct $name:ident, $($field:ident),+) => {
        #[derive(Debug, Copy, Clone, Default)]
        pub struct $name<T> {
            $(pub $field: T,)+
        }

        impl<T> $name<T> {
            pub fn new($($field: T),+) -> Self {
                $name { $($field,)+ }
            }
        }

        impl<T: PartialEq> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                $(self.$field == other.$field)&&+
            }
        }

        impl<T: Mul<Output = T> + Copy> Mul<T> for $name<T> {
            type Output = $name<T>;

            fn mul(self, rhs: T) -> Self::Output {
                $name {
                    $($field: self.$field * rhs,)+
                }
            }
        }

        impl<T: MulAssign + Copy> MulAssign<T> for $name<T> {
            fn mul_assign(&mut self, rhs: T) {
                $(self.$field *= rhs;)+
            }
        }

        impl<T: Div<Output = T> + Copy> Div<T> for $name<T> {
            type Output = $name<T>;

            fn div(self, rhs: T) -> Self::Output {
                $name {
                    $($field: self.$field / rhs,)+
                }
            }
        }

        impl<T: DivAssign + Copy> DivAssign<T> for $name<T> {
            fn div_assign(&mut self, rhs: T) {
                $(self.$field /= rhs;)+
            }
        }

        impl<T: Neg<Output = T>> Neg for $name<T> {
            type Output = $name<T>;

            fn neg(self) -> Self::Output {
                $name {
                    $($field: -self.$field,)+
                }
            }
        }

        impl<T> Index<usize> for $name<T> {
            type Output = T;

            fn index(&self, index: usize) -> &Self::Output {
                match_index!(index, $(&self.$field);+)
            }
        }

        impl<T> IndexMut<usize> for $name<T> {
            fn index_mut(&mut self, index: usize) -> &mut Self::Output {
                match_index!(index, $(&mut self.$field);+)
            }
        }

        impl<T: Mul<Output = T> + Add<Output = T> + Copy> $name<T> {
            pub fn length_squared(&self) -> T {
                strip_plus!($(+ self.$field * self.$field)+)
            }
        }

        impl<T: num::Float> $name<T> {
            pub fn length(&self) -> T {
                self.length_squared().sqrt()
            }

            pub fn has_nans(&self) -> bool {
                $(self.$field.is_nan())||+
            }

            pub fn abs(&self) -> Self {
                $name {
                    $($field: self.$field.abs(),)+
                }
            }

            /// Componentwise minimum.
            pub fn min(&self, o: &Self) -> Self {
                $name {
                    $($field: self.$field.min(o.$field),)+
                }
            }

            /// Componentwise maximum.
            pub fn max(&self, o: &Self) -> Self {
                $name {
                    $($field: self.$field.max(o.$field),)+
                }
            }

            pub fn max_component(&self) -> T {
                let mut m = T::neg_infinity();
                $(m = m.max(self.$field);)+
                m
            }
        }
    };
}

macro_rules! impl_add {
    ($lhs:ident + $rhs:ident = $out:ident, $($field:ident),+) => {
        impl<T: Add<Output = T>> Add<$rhs<T>> for $lhs<T> {
            type Output = $out<T>;

            fn add(self, rhs: $rhs<T>) -> Self::Output {
                $out {
                    $($field: self.$field + rhs.$field,)+
                }
            }
        }
    };
}

macro_rules! impl_sub {
    ($lhs:ident - $rhs:ident = $out:ident, $($field:ident),+) => {
        impl<T: Sub<Output = T>> Sub<$rhs<T>> for $lhs<T> {
            type Output = $out<T>;

            fn sub(self, rhs: $rhs<T>) -> Self::Output {
                $out {
                    $($field: self.$field - rhs.$field,)+
                }
            }
        }
    };
}

macro_rules! impl_assign {
    ($lhs:ident += $rhs:ident, $($field:ident),+) => {
        impl<T: AddAssign> AddAssign<$rhs<T>> for $lhs<T> {
            fn add_assign(&mut self, rhs: $rhs<T>) {
                $(self.$field += rhs.$field;)+
            }
        }

        impl<T: SubAssign> SubAssign<$rhs<T>> for $lhs<T> {
            fn sub_assign(&mut self, rhs: $rhs<T>) {
                $(self.$field -= rhs.$field;)+
            }
        }
    };
}

macro_rules! impl_convert {
    ($from:ident => $to:ident, $($field:ident),+) => {
        impl<T> From<$from<T>> for $to<T> {
            fn from(v: $from<T>) -> Self {
                $to { $($field: v.$field,)+ }
            }
        }
    };
}

make_vector!(struct Vector2, x, y);
pub type Vector2f = Vector2<Float>;

make_vector!(struct Point2, x, y);
pub type Point2f = Point2<Float>;

make_vector!(struct Vector3, x, y, z);
pub type Vector3f = Vector3<Float>;

make_vector!(struct Point3, x, y, z);
pub type Point3f = Point3<Float>;

make_vector!(struct Normal3, x, y, z);
pub type Normal3f = Normal3<Float>;

impl_add!(Vector2 + Vector2 = Vector2, x, y);
impl_sub!(Vector2 - Vector2 = Vector2, x, y);
impl_assign!(Vector2 += Vector2, x, y);
impl_add!(Point2 + Vector2 = Point2, x, y);
impl_add!(Point2 + Point2 = Point2, x, y);
impl_sub!(Point2 - Point2 = Vector2, x, y);
impl_sub!(Point2 - Vector2 = Point2, x, y);
impl_assign!(Point2 += Vector2, x, y);

impl_add!(Vector3 + Vector3 = Vector3, x, y, z);
impl_sub!(Vector3 - Vector3 = Vector3, x, y, z);
impl_assign!(Vector3 += Vector3, x, y, z);
impl_add!(Point3 + Vector3 = Point3, x, y, z);
impl_add!(Point3 + Point3 = Point3, x, y, z);
impl_sub!(Point3 - Point3 = Vector3, x, y, z);
impl_sub!(Point3 - Vector3 = Point3, x, y, z);
impl_assign!(Point3 += Vector3, x, y, z);
impl_add!(Normal3 + Normal3 = Normal3, x, y, z);
impl_sub!(Normal3 - Normal3 = Normal3, x, y, z);
impl_assign!(Normal3 += Normal3, x, y, z);

impl_convert!(Vector3 => Normal3, x, y, z);
impl_convert!(Normal3 => Vector3, x, y, z);
impl_convert!(Point3 => Vector3, x, y, z);
impl_convert!(Vector3 => Point3, x, y, z);
impl_convert!(Point2 => Vector2, x, y);
impl_convert!(Vector2 => Point2, x, y);

/// Read access to the three components of vectors, points and normals, so
/// that products can mix them the way the math does.
pub trait Tuple3<T> {
    fn components(&self) -> (T, T, T);
}

macro_rules! impl_tuple3 {
    ($($name:ident),+) => {
        $(
            impl<T: Copy> Tuple3<T> for $name<T> {
                fn components(&self) -> (T, T, T) {
                    (self.x, self.y, self.z)
                }
            }

            impl<T: num::Float> $name<T> {
                pub fn dot<V: Tuple3<T>>(&self, v: &V) -> T {
                    let (x, y, z) = v.components();
                    self.x * x + self.y * y + self.z * z
                }

                pub fn abs_dot<V: Tuple3<T>>(&self, v: &V) -> T {
                    self.dot(v).abs()
                }

                pub fn cross<V: Tuple3<T>>(&self, v: &V) -> Vector3<T> {
                    let (x, y, z) = v.components();
                    Vector3::new(
                        self.y * z - self.z * y,
                        self.z * x - self.x * z,
                        self.x * y - self.y * x,
                    )
                }

                pub fn normalize(&self) -> Self {
                    *self / self.length()
                }

                pub fn max_dimension(&self) -> usize {
                    if self.x > self.y {
                        if self.x > self.z {
                            0
                        } else {
                            2
                        }
                    } else if self.y > self.z {
                        1
                    } else {
                        2
                    }
                }

                pub fn permute(&self, x: usize, y: usize, z: usize) -> Self {
                    $name::new(self[x], self[y], self[z])
                }

                /// Flips `self` so that it lies in the hemisphere around `v`.
                pub fn face_forward<V: Tuple3<T>>(&self, v: &V) -> Self {
                    if self.dot(v) < T::zero() {
                        -*self
                    } else {
                        *self
                    }
                }
            }
        )+
    };
}

impl_tuple3!(Vector3, Point3, Normal3);

impl<T: num::Float> Point3<T> {
    pub fn distance(&self, p: &Point3<T>) -> T {
        (*self - *p).length()
    }

    pub fn distance_squared(&self, p: &Point3<T>) -> T {
        (*self - *p).length_squared()
    }

    pub fn lerp(&self, t: T, p: &Point3<T>) -> Point3<T> {
        *self * (T::one() - t) + *p * t
    }
}

impl<T: num::Float> Point3<T> {
    pub fn lerp_components(&self, t: &Point3<T>, p: &Point3<T>) -> Point3<T> {
        Point3::new(
            crate::core::pbrt::lerp(t.x, self.x, p.x),
            crate::core::pbrt::lerp(t.y, self.y, p.y),
            crate::core::pbrt::lerp(t.z, self.z, p.z),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub o: Point3f,
    pub d: Vector3f,
    pub t_max: Float,
    pub time: Float,
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float) -> Self {
        Self { o, d, t_max, time }
    }

    pub fn point(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            o: Point3f::default(),
            d: Vector3f::default(),
            t_max: Float::INFINITY,
            time: 0.0,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct RayDifferential {
    #[deref]
    #[deref_mut]
    pub ray: Ray,
    pub has_differentials: bool,
    pub rx_origin: Point3f,
    pub ry_origin: Point3f,
    pub rx_direction: Vector3f,
    pub ry_direction: Vector3f,
}

impl RayDifferential {
    pub fn new(o: Point3f, d: Vector3f, t_max: Float, time: Float) -> Self {
        Ray::new(o, d, t_max, time).into()
    }

    /// Rescales the offset rays for a sample spacing `s`.
    pub fn scale_differentials(&mut self, s: Float) {
        self.rx_origin = self.ray.o + (self.rx_origin - self.ray.o) * s;
        self.ry_origin = self.ray.o + (self.ry_origin - self.ray.o) * s;
        self.rx_direction = self.ray.d + (self.rx_direction - self.ray.d) * s;
        self.ry_direction = self.ray.d + (self.ry_direction - self.ray.d) * s;
    }
}

impl From<Ray> for RayDifferential {
    fn from(ray: Ray) -> Self {
        Self {
            ray,
            has_differentials: false,
            rx_origin: ray.o,
            ry_origin: ray.o,
            rx_direction: Vector3f::default(),
            ry_direction: Vector3f::default(),
        }
    }
}

/// Pushes `p` along the normal far enough that a ray leaving in direction `w`
/// starts outside the error box `p_error`.
pub fn offset_ray_origin(p: &Point3f, p_error: &Vector3f, n: &Normal3f, w: &Vector3f) -> Point3f {
    let d = n.abs().dot(p_error);
    let mut offset = Vector3f::from(*n) * d;
    if w.dot(n) < 0.0 {
        offset = -offset;
    }
    let mut po = *p + offset;
    for i in 0..3 {
        if offset[i] > 0.0 {
            po[i] = next_float_up(po[i]);
        } else if offset[i] < 0.0 {
            po[i] = next_float_down(po[i]);
        }
    }
    po
}

/// Axis-aligned box. Always built from the componentwise min/max of its
/// inputs, so `p_min <= p_max` holds for every instance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3<T> {
    pub p_min: Point3<T>,
    pub p_max: Point3<T>,
}

pub type Bounds3f = Bounds3<Float>;

impl<T: num::Float> From<Point3<T>> for Bounds3<T> {
    fn from(p: Point3<T>) -> Self {
        Self { p_min: p, p_max: p }
    }
}

impl<T: num::Float> From<(Point3<T>, Point3<T>)> for Bounds3<T> {
    fn from(pp: (Point3<T>, Point3<T>)) -> Self {
        Self::new(pp.0, pp.1)
    }
}

impl<T: num::Float> Bounds3<T> {
    pub fn new(p1: Point3<T>, p2: Point3<T>) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// 0 selects `p_min`, anything else `p_max`.
    pub fn get(&self, i: usize) -> &Point3<T> {
        if i == 0 {
            &self.p_min
        } else {
            &self.p_max
        }
    }

    pub fn corner(&self, corner: usize) -> Point3<T> {
        Point3::new(
            self.get(corner & 1).x,
            self.get(if corner & 2 != 0 { 1 } else { 0 }).y,
            self.get(if corner & 4 != 0 { 1 } else { 0 }).z,
        )
    }

    pub fn union_point(&self, p: &Point3<T>) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    pub fn union(&self, b: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&b.p_min),
            p_max: self.p_max.max(&b.p_max),
        }
    }

    /// Overlapping region of two boxes, `None` when they are disjoint.
    pub fn intersect(&self, b: &Self) -> Option<Self> {
        if !self.overlaps(b) {
            return None;
        }
        Some(Self {
            p_min: self.p_min.max(&b.p_min),
            p_max: self.p_max.min(&b.p_max),
        })
    }

    pub fn overlaps(&self, b: &Self) -> bool {
        let x = self.p_max.x >= b.p_min.x && self.p_min.x <= b.p_max.x;
        let y = self.p_max.y >= b.p_min.y && self.p_min.y <= b.p_max.y;
        let z = self.p_max.z >= b.p_min.z && self.p_min.z <= b.p_max.z;
        x && y && z
    }

    pub fn inside(&self, p: &Point3<T>) -> bool {
        p.x >= self.p_min.x
            && p.x <= self.p_max.x
            && p.y >= self.p_min.y
            && p.y <= self.p_max.y
            && p.z >= self.p_min.z
            && p.z <= self.p_max.z
    }

    pub fn inside_exclusive(&self, p: &Point3<T>) -> bool {
        p.x >= self.p_min.x
            && p.x < self.p_max.x
            && p.y >= self.p_min.y
            && p.y < self.p_max.y
            && p.z >= self.p_min.z
            && p.z < self.p_max.z
    }

    pub fn expand(&self, delta: T) -> Self {
        let d = Vector3::new(delta, delta, delta);
        Self::new(self.p_min - d, self.p_max + d)
    }

    pub fn diagonal(&self) -> Vector3<T> {
        self.p_max - self.p_min
    }

    pub fn surface_area(&self) -> T {
        let d = self.diagonal();
        (d.x * d.y + d.x * d.z + d.y * d.z) * (T::one() + T::one())
    }

    pub fn volume(&self) -> T {
        let d = self.diagonal();
        d.x * d.y * d.z
    }

    pub fn maximum_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn lerp(&self, t: &Point3<T>) -> Point3<T> {
        self.p_min.lerp_components(t, &self.p_max)
    }

    /// Position of `p` relative to the box: `p_min` maps to (0,0,0), `p_max` to (1,1,1).
    pub fn offset(&self, p: &Point3<T>) -> Vector3<T> {
        let mut o = *p - self.p_min;
        for i in 0..3 {
            if self.p_max[i] > self.p_min[i] {
                o[i] = o[i] / (self.p_max[i] - self.p_min[i]);
            }
        }
        o
    }

    pub fn bounding_sphere(&self) -> (Point3<T>, T) {
        let half = T::one() / (T::one() + T::one());
        let center = (self.p_min + self.p_max) * half;
        let radius = if self.inside(&center) {
            center.distance(&self.p_max)
        } else {
            T::zero()
        };
        (center, radius)
    }
}

impl Bounds3f {
    /// Robust slab test. The far distance of every slab is widened by
    /// `1 + 2γ₃`, so a ray that grazes the box is never reported as a miss.
    pub fn intersect_p(&self, ray: &Ray) -> Option<(Float, Float)> {
        let mut t0 = 0.0;
        let mut t1 = ray.t_max;
        for i in 0..3 {
            let inv_ray_dir = 1.0 / ray.d[i];
            let mut t_near = (self.p_min[i] - ray.o[i]) * inv_ray_dir;
            let mut t_far = (self.p_max[i] - ray.o[i]) * inv_ray_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            t_far *= 1.0 + 2.0 * GAMMA3;
            // NaN slab distances leave t0/t1 untouched
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }

    /// Slab test with the reciprocal direction and its sign precomputed by the caller.
    pub fn intersect_p_inv(&self, ray: &Ray, inv_dir: &Vector3f, dir_is_neg: [usize; 3]) -> bool {
        let mut t_min = (self.get(dir_is_neg[0]).x - ray.o.x) * inv_dir.x;
        let mut t_max = (self.get(1 - dir_is_neg[0]).x - ray.o.x) * inv_dir.x;
        let ty_min = (self.get(dir_is_neg[1]).y - ray.o.y) * inv_dir.y;
        let mut ty_max = (self.get(1 - dir_is_neg[1]).y - ray.o.y) * inv_dir.y;

        t_max *= 1.0 + 2.0 * GAMMA3;
        ty_max *= 1.0 + 2.0 * GAMMA3;
        if t_min > ty_max || ty_min > t_max {
            return false;
        }
        if ty_min > t_min {
            t_min = ty_min;
        }
        if ty_max < t_max {
            t_max = ty_max;
        }

        let tz_min = (self.get(dir_is_neg[2]).z - ray.o.z) * inv_dir.z;
        let mut tz_max = (self.get(1 - dir_is_neg[2]).z - ray.o.z) * inv_dir.z;
        tz_max *= 1.0 + 2.0 * GAMMA3;
        if t_min > tz_max || tz_min > t_max {
            return false;
        }
        if tz_min > t_min {
            t_min = tz_min;
        }
        if tz_max < t_max {
            t_max = tz_max;
        }
        t_min < ray.t_max && t_max > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_vectors() {
        let a = Vector2f::new(1.0, 2.0);
        assert_eq!(a[0], 1.0);
        assert_eq!(a[1], 2.0);

        let b = Vector3f::new(1.0, 2.0, 3.0);
        assert_eq!(b[0], 1.0);
        assert_eq!(b[1], 2.0);
        assert_eq!(b[2], 3.0);

        let a1 = Vector2f::new(1.0, 2.0);
        assert_eq!(a1, a);
        let a2 = Vector2f::new(2.0, 1.0);
        assert_ne!(a2, a);
    }

    #[test]
    #[should_panic(expected = "Out of index")]
    fn index_out_of_range() {
        let v = Vector3f::new(1.0, 2.0, 3.0);
        let _ = v[3];
    }

    #[test]
    fn point_vector_arithmetic() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        let q = Point3f::new(4.0, 6.0, 3.0);
        let d: Vector3f = q - p;
        assert_eq!(d, Vector3f::new(3.0, 4.0, 0.0));
        assert_eq!(p + d, q);
        assert_approx_eq!(Float, p.distance(&q), 5.0);
        assert_eq!(p.lerp(0.5, &q), Point3f::new(2.5, 4.0, 3.0));
    }

    #[test]
    fn dot_cross_normalize() {
        let x = Vector3f::new(1.0, 0.0, 0.0);
        let y = Vector3f::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(x.dot(&y), 0.0);
        let n = Normal3f::new(0.0, 3.0, 4.0).normalize();
        assert_approx_eq!(Float, n.length(), 1.0);
        assert_approx_eq!(Float, n.dot(&y), 0.6);
        assert_eq!(
            Normal3f::new(0.0, 0.0, 1.0).face_forward(&Vector3f::new(0.0, 0.0, -1.0)),
            Normal3f::new(0.0, 0.0, -1.0)
        );
        assert_eq!(Vector3f::new(1.0, 5.0, 3.0).max_dimension(), 1);
        assert_eq!(
            Vector3f::new(1.0, 5.0, 3.0).permute(2, 0, 1),
            Vector3f::new(3.0, 1.0, 5.0)
        );
    }

    #[test]
    fn bounds_construction_orders_corners() {
        let b = Bounds3f::new(Point3f::new(1.0, -1.0, 5.0), Point3f::new(-1.0, 1.0, 2.0));
        assert_eq!(b.p_min, Point3f::new(-1.0, -1.0, 2.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 1.0, 5.0));
        assert_eq!(b.corner(0), b.p_min);
        assert_eq!(b.corner(7), b.p_max);
        assert_eq!(b.corner(5), Point3f::new(1.0, -1.0, 5.0));
    }

    #[test]
    fn bounds_queries() {
        let a = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(2.0, 2.0, 2.0));
        let b = Bounds3f::new(Point3f::new(1.0, 1.0, 1.0), Point3f::new(3.0, 3.0, 3.0));
        let c = Bounds3f::new(Point3f::new(5.0, 5.0, 5.0), Point3f::new(6.0, 6.0, 6.0));

        assert_eq!(
            a.union(&b),
            Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(3.0, 3.0, 3.0))
        );
        assert_eq!(
            a.intersect(&b),
            Some(Bounds3f::new(Point3f::new(1.0, 1.0, 1.0), Point3f::new(2.0, 2.0, 2.0)))
        );
        assert_eq!(a.intersect(&c), None);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.inside(&Point3f::new(2.0, 2.0, 2.0)));
        assert!(!a.inside_exclusive(&Point3f::new(2.0, 2.0, 2.0)));
        assert_approx_eq!(Float, a.surface_area(), 24.0);
        assert_approx_eq!(Float, a.volume(), 8.0);
        assert_eq!(
            a.offset(&Point3f::new(1.0, 0.5, 2.0)),
            Vector3f::new(0.5, 0.25, 1.0)
        );
        let (center, radius) = a.bounding_sphere();
        assert_eq!(center, Point3f::new(1.0, 1.0, 1.0));
        assert_approx_eq!(Float, radius, (3.0 as Float).sqrt());
        assert_eq!(a.expand(1.0).p_min, Point3f::new(-1.0, -1.0, -1.0));
        assert_eq!(c.union_point(&Point3f::new(0.0, 9.0, 5.5)).p_max.y, 9.0);
        let flat = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 4.0, 2.0));
        assert_eq!(flat.maximum_extent(), 1);
    }

    #[test]
    fn slab_test_hits_and_misses() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let hit = Ray::new(
            Point3f::new(-5.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Float::INFINITY,
            0.0,
        );
        let (t0, t1) = b.intersect_p(&hit).unwrap();
        assert_approx_eq!(Float, t0, 4.0);
        assert!(t1 >= 6.0);

        let miss = Ray::new(
            Point3f::new(-5.0, 3.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Float::INFINITY,
            0.0,
        );
        assert!(b.intersect_p(&miss).is_none());

        let short = Ray::new(hit.o, hit.d, 3.0, 0.0);
        assert!(b.intersect_p(&short).is_none());
    }

    #[test]
    fn slab_test_grazing_face_is_a_hit() {
        let b = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        // travels exactly in the y = 1 face plane
        let graze = Ray::new(
            Point3f::new(-1.0, 1.0, 0.5),
            Vector3f::new(1.0, 0.0, 0.0),
            Float::INFINITY,
            0.0,
        );
        assert!(b.intersect_p(&graze).is_some());
        let inv_dir = Vector3f::new(1.0 / graze.d.x, 1.0 / graze.d.y, 1.0 / graze.d.z);
        let dir_is_neg = [
            (inv_dir.x < 0.0) as usize,
            (inv_dir.y < 0.0) as usize,
            (inv_dir.z < 0.0) as usize,
        ];
        assert!(b.intersect_p_inv(&graze, &inv_dir, dir_is_neg));
    }

    #[test]
    fn offset_origin_moves_off_surface() {
        let p = Point3f::new(0.0, 0.0, 1.0);
        let err = Vector3f::new(1e-3, 1e-3, 1e-3);
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let up = offset_ray_origin(&p, &err, &n, &Vector3f::new(0.0, 0.0, 1.0));
        assert!(up.z > 1.0005);
        let down = offset_ray_origin(&p, &err, &n, &Vector3f::new(0.0, 0.0, -1.0));
        assert!(down.z < 0.9995);
        assert_eq!(up.x, 0.0);
    }

    #[test]
    fn ray_differential_scaling() {
        let mut rd = RayDifferential::new(
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            10.0,
            0.0,
        );
        rd.has_differentials = true;
        rd.rx_origin = Point3f::new(1.0, 0.0, 0.0);
        rd.rx_direction = Vector3f::new(0.0, 1.0, 1.0);
        rd.scale_differentials(0.5);
        assert_eq!(rd.rx_origin, Point3f::new(0.5, 0.0, 0.0));
        assert_eq!(rd.rx_direction, Vector3f::new(0.0, 0.5, 1.0));
        assert_eq!(rd.point(2.0), Point3f::new(0.0, 0.0, 2.0));
    }
}
