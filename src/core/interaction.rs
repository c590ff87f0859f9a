use crate::core::geometry::{offset_ray_origin, Normal3f, Point2f, Point3f, Ray, Vector3f};
use crate::core::pbrt::{Float, SHADOW_EPSILON};
use derive_more::{Deref, DerefMut};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Interaction {
    pub p: Point3f,
    pub time: Float,
    pub p_error: Vector3f,
    pub wo: Vector3f,
    pub n: Normal3f,
}

pub trait SpawnRayTo<T> {
    fn spawn_ray_to(&self, t: T) -> Ray;
}

impl Interaction {
    pub fn new(p: Point3f, n: Normal3f, p_error: Vector3f, wo: Vector3f, time: Float) -> Self {
        Self {
            p,
            time,
            p_error,
            wo,
            n,
        }
    }

    pub fn is_surface_interaction(&self) -> bool {
        self.n != Normal3f::default()
    }

    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, d);
        Ray::new(origin, *d, Float::INFINITY, self.time)
    }
}

impl SpawnRayTo<Point3f> for Interaction {
    fn spawn_ray_to(&self, p2: Point3f) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, &(p2 - self.p));
        let d = p2 - origin;
        Ray::new(origin, d, 1.0 - SHADOW_EPSILON, self.time)
    }
}

impl SpawnRayTo<&Interaction> for Interaction {
    fn spawn_ray_to(&self, it: &Interaction) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, &(it.p - self.p));
        let target = offset_ray_origin(&it.p, &it.p_error, &it.n, &(origin - it.p));
        let d = target - origin;
        Ray::new(origin, d, 1.0 - SHADOW_EPSILON, self.time)
    }
}

/// Shading frame, which may differ from the true geometric one.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Shading {
    pub n: Normal3f,
    pub dpdu: Vector3f,
    pub dpdv: Vector3f,
    pub dndu: Normal3f,
    pub dndv: Normal3f,
}

/// Local differential geometry at a ray-surface hit.
#[derive(Debug, Copy, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct SurfaceInteraction {
    #[deref]
    #[deref_mut]
    pub base: Interaction,
    pub uv: Point2f,
    pub dpdu: Vector3f,
    pub dpdv: Vector3f,
    pub dndu: Normal3f,
    pub dndv: Normal3f,
    pub shading: Shading,
    /// Set when the owning shape reverses orientation and its transform does
    /// not swap handedness, or the other way round.
    pub orientation_flipped: bool,
}

impl SurfaceInteraction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        p: Point3f,
        p_error: Vector3f,
        uv: Point2f,
        wo: Vector3f,
        dpdu: Vector3f,
        dpdv: Vector3f,
        dndu: Normal3f,
        dndv: Normal3f,
        time: Float,
        orientation_flipped: bool,
    ) -> SurfaceInteraction {
        let mut n = Normal3f::from(dpdu.cross(&dpdv).normalize());
        if orientation_flipped {
            n = -n;
        }
        SurfaceInteraction {
            base: Interaction::new(p, n, p_error, wo, time),
            uv,
            dpdu,
            dpdv,
            dndu,
            dndv,
            shading: Shading {
                n,
                dpdu,
                dpdv,
                dndu,
                dndv,
            },
            orientation_flipped,
        }
    }

    /// Installs a shading frame. When `orientation_is_authoritative` the
    /// geometric normal is flipped to agree with the shading normal, otherwise
    /// the shading normal follows the geometric one.
    pub fn set_shading_geometry(
        &mut self,
        dpdus: &Vector3f,
        dpdvs: &Vector3f,
        dndus: &Normal3f,
        dndvs: &Normal3f,
        orientation_is_authoritative: bool,
    ) {
        let mut shading_n = Normal3f::from(dpdus.cross(dpdvs).normalize());
        if self.orientation_flipped {
            shading_n = -shading_n;
        }
        if orientation_is_authoritative {
            self.base.n = self.base.n.face_forward(&shading_n);
        } else {
            shading_n = shading_n.face_forward(&self.base.n);
        }
        self.shading = Shading {
            n: shading_n,
            dpdu: *dpdus,
            dpdv: *dpdvs,
            dndu: *dndus,
            dndv: *dndvs,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn flat_hit(flipped: bool) -> SurfaceInteraction {
        SurfaceInteraction::new(
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1e-4, 1e-4, 1e-4),
            Point2f::new(0.5, 0.5),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(2.0, 0.0, 0.0),
            Vector3f::new(0.0, 3.0, 0.0),
            Normal3f::default(),
            Normal3f::default(),
            0.0,
            flipped,
        )
    }

    #[test]
    fn normal_follows_parametric_derivatives() {
        let si = flat_hit(false);
        assert_eq!(si.n, Normal3f::new(0.0, 0.0, 1.0));
        assert_eq!(si.shading.n, si.n);
        assert!(si.is_surface_interaction());

        let si = flat_hit(true);
        assert_eq!(si.n, Normal3f::new(0.0, 0.0, -1.0));
        assert_eq!(si.shading.n, si.n);
    }

    #[test]
    fn shading_geometry_is_face_forwarded() {
        let mut si = flat_hit(false);
        // shading tangents produce -z, the geometric normal stays authoritative
        si.set_shading_geometry(
            &Vector3f::new(0.0, 1.0, 0.0),
            &Vector3f::new(1.0, 0.0, 0.0),
            &Normal3f::default(),
            &Normal3f::default(),
            false,
        );
        assert_eq!(si.shading.n, Normal3f::new(0.0, 0.0, 1.0));
        assert_eq!(si.n, Normal3f::new(0.0, 0.0, 1.0));

        si.set_shading_geometry(
            &Vector3f::new(0.0, 1.0, 0.0),
            &Vector3f::new(1.0, 0.0, 0.0),
            &Normal3f::default(),
            &Normal3f::default(),
            true,
        );
        assert_eq!(si.shading.n, Normal3f::new(0.0, 0.0, -1.0));
        assert_eq!(si.n, Normal3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn spawned_rays_leave_the_error_box() {
        let si = flat_hit(false);
        let ray = si.spawn_ray(&Vector3f::new(0.0, 0.0, 1.0));
        assert!(ray.o.z > si.p_error.z);
        assert_eq!(ray.t_max, Float::INFINITY);

        let below = si.spawn_ray(&Vector3f::new(0.0, 0.0, -1.0));
        assert!(below.o.z < -si.p_error.z);

        let target = Point3f::new(0.0, 0.0, 10.0);
        let r = si.spawn_ray_to(target);
        assert_approx_eq!(Float, r.point(1.0).z, 10.0, epsilon = 1e-9);
        assert_approx_eq!(Float, r.t_max, 1.0 - SHADOW_EPSILON);

        let other = Interaction::new(
            target,
            Normal3f::new(0.0, 0.0, -1.0),
            Vector3f::new(1e-4, 1e-4, 1e-4),
            Vector3f::new(0.0, 0.0, -1.0),
            0.0,
        );
        let r = si.spawn_ray_to(&other);
        let end = r.point(1.0);
        assert!(end.z < 10.0 && end.z > 9.99);
    }
}
