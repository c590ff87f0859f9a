use crate::{
    core::{
        geometry::{Bounds3f, Point2f, Point3f, Ray, Vector3f},
        interaction::SurfaceInteraction,
        pbrt::{clamp, radians, Float, GAMMA3, PI},
        shape::BaseShape,
        transform::Transform,
    },
    shapes::{compute_normal_differential, quadric_hits, ERay},
};
use derive_more::{Deref, DerefMut};
use std::sync::Arc;

/// Open cylinder around the z axis.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct Cylinder {
    #[deref]
    #[deref_mut]
    pub(crate) base: BaseShape,
    radius: Float,
    z_min: Float,
    z_max: Float,
    phi_max: Float,
}

impl Cylinder {
    pub fn new(
        o2w: Arc<Transform>,
        w2o: Arc<Transform>,
        reverse_orientation: bool,
        radius: Float,
        z_min: Float,
        z_max: Float,
        phi_max: Float,
    ) -> Self {
        Self {
            base: BaseShape::new(o2w, w2o, reverse_orientation),
            radius,
            z_min: z_min.min(z_max),
            z_max: z_max.max(z_min),
            phi_max: radians(clamp(phi_max, 0.0, 360.0)),
        }
    }

    fn compute_intersect(&self, r: &Ray) -> Option<(Float, Point3f, Float, Ray)> {
        let (ray, o_err, d_err) = self.world_to_object.apply_ray_with_error(r);
        let ERay {
            o: [ox, oy, _],
            d: [dx, dy, _],
        } = ERay::new(&ray, &o_err, &d_err);
        let a = dx * dx + dy * dy;
        let b = (dx * ox + dy * oy) * 2.0;
        let c = ox * ox + oy * oy - self.radius * self.radius;

        quadric_hits(a, b, c, ray.t_max).find_map(|t| {
            let mut p_hit = ray.point(t);
            let hit_rad = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
            p_hit.x *= self.radius / hit_rad;
            p_hit.y *= self.radius / hit_rad;
            let mut phi = p_hit.y.atan2(p_hit.x);
            if phi < 0.0 {
                phi += 2.0 * PI;
            }
            if p_hit.z < self.z_min || p_hit.z > self.z_max || phi > self.phi_max {
                return None;
            }
            Some((t, p_hit, phi, ray))
        })
    }

    pub fn object_bound(&self) -> Bounds3f {
        Bounds3f::new(
            Point3f::new(-self.radius, -self.radius, self.z_min),
            Point3f::new(self.radius, self.radius, self.z_max),
        )
    }

    pub fn world_bound(&self) -> Bounds3f {
        &*self.object_to_world * &self.object_bound()
    }

    pub fn intersect(&self, r: &Ray, _test_alpha_texture: bool) -> Option<(Float, SurfaceInteraction)> {
        let (t_hit, p_hit, phi, ray) = self.compute_intersect(r)?;
        let u = phi / self.phi_max;
        let v = (p_hit.z - self.z_min) / (self.z_max - self.z_min);
        let dpdu = Vector3f::new(-self.phi_max * p_hit.y, self.phi_max * p_hit.x, 0.0);
        let dpdv = Vector3f::new(0.0, 0.0, self.z_max - self.z_min);

        let d2pduu = Vector3f::new(p_hit.x, p_hit.y, 0.0) * (-self.phi_max * self.phi_max);
        let d2pduv = Vector3f::default();
        let d2pdvv = Vector3f::default();
        let (dndu, dndv) = compute_normal_differential(&dpdu, &dpdv, &d2pduu, &d2pduv, &d2pdvv);

        let p_error = Vector3f::new(p_hit.x, p_hit.y, 0.0).abs() * GAMMA3;
        let si = SurfaceInteraction::new(
            p_hit,
            p_error,
            Point2f::new(u, v),
            -ray.d,
            dpdu,
            dpdv,
            dndu,
            dndv,
            ray.time,
            self.orientation_flipped(),
        );
        Some((t_hit, &*self.object_to_world * &si))
    }

    pub fn intersect_p(&self, r: &Ray, _test_alpha_texture: bool) -> bool {
        self.compute_intersect(r).is_some()
    }

    pub fn area(&self) -> Float {
        (self.z_max - self.z_min) * self.radius * self.phi_max
    }
}
