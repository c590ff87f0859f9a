use crate::{
    core::{
        geometry::{Bounds3f, Point2f, Point3f, Ray, Vector3f},
        interaction::SurfaceInteraction,
        pbrt::{clamp, radians, Float, GAMMA5, PI},
        shape::BaseShape,
        transform::Transform,
    },
    shapes::{compute_normal_differential, quadric_hits, ERay},
};
use derive_more::{Deref, DerefMut};
use std::sync::Arc;

#[derive(Debug, Clone, Deref, DerefMut)]
pub struct Sphere {
    #[deref]
    #[deref_mut]
    pub(crate) base: BaseShape,
    radius: Float,
    z_min: Float,
    z_max: Float,
    theta_z_min: Float,
    theta_z_max: Float,
    phi_max: Float,
}

impl Sphere {
    /// `phi_max` is in degrees. The z range is clamped to the sphere.
    pub fn new(
        o2w: Arc<Transform>,
        w2o: Arc<Transform>,
        reverse_orientation: bool,
        radius: Float,
        z_min: Float,
        z_max: Float,
        phi_max: Float,
    ) -> Self {
        let lo = z_min.min(z_max);
        let hi = z_min.max(z_max);
        Self {
            base: BaseShape::new(o2w, w2o, reverse_orientation),
            radius,
            z_min: clamp(lo, -radius, radius),
            z_max: clamp(hi, -radius, radius),
            theta_z_min: clamp(lo / radius, -1.0, 1.0).acos(),
            theta_z_max: clamp(hi / radius, -1.0, 1.0).acos(),
            phi_max: radians(clamp(phi_max, 0.0, 360.0)),
        }
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn theta_range(&self) -> (Float, Float) {
        (self.theta_z_min, self.theta_z_max)
    }

    /// Projects the hit back onto the surface and returns it with its azimuth.
    fn refine(&self, ray: &Ray, t: Float) -> (Point3f, Float) {
        let mut p_hit = ray.point(t);
        p_hit *= self.radius / p_hit.distance(&Point3f::default());
        if p_hit.x == 0.0 && p_hit.y == 0.0 {
            p_hit.x = 1e-5 * self.radius;
        }
        let mut phi = p_hit.y.atan2(p_hit.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        (p_hit, phi)
    }

    fn clipped(&self, p_hit: &Point3f, phi: Float) -> bool {
        (self.z_min > -self.radius && p_hit.z < self.z_min)
            || (self.z_max < self.radius && p_hit.z > self.z_max)
            || phi > self.phi_max
    }

    fn compute_intersect(&self, r: &Ray) -> Option<(Float, Point3f, Float, Ray)> {
        let (ray, o_err, d_err) = self.world_to_object.apply_ray_with_error(r);
        let ERay {
            o: [ox, oy, oz],
            d: [dx, dy, dz],
        } = ERay::new(&ray, &o_err, &d_err);
        let a = dx * dx + dy * dy + dz * dz;
        let b = (dx * ox + dy * oy + dz * oz) * 2.0;
        let c = ox * ox + oy * oy + oz * oz - self.radius * self.radius;

        quadric_hits(a, b, c, ray.t_max).find_map(|t| {
            let (p_hit, phi) = self.refine(&ray, t);
            if self.clipped(&p_hit, phi) {
                None
            } else {
                Some((t, p_hit, phi, ray))
            }
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
        let cos_theta = clamp(p_hit.z / self.radius, -1.0, 1.0);
        let theta = cos_theta.acos();
        let v = (theta - self.theta_z_min) / (self.theta_z_max - self.theta_z_min);

        let z_radius = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
        let cos_phi = p_hit.x / z_radius;
        let sin_phi = p_hit.y / z_radius;
        let dpdu = Vector3f::new(-self.phi_max * p_hit.y, self.phi_max * p_hit.x, 0.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let theta_range = self.theta_z_max - self.theta_z_min;
        let dpdv = Vector3f::new(p_hit.z * cos_phi, p_hit.z * sin_phi, -self.radius * sin_theta) * theta_range;

        let d2pduu = Vector3f::new(p_hit.x, p_hit.y, 0.0) * (-self.phi_max * self.phi_max);
        let d2pduv = Vector3f::new(-sin_phi, cos_phi, 0.0) * (theta_range * p_hit.z * self.phi_max);
        let d2pdvv = Vector3f::from(p_hit) * (-theta_range * theta_range);
        let (dndu, dndv) = compute_normal_differential(&dpdu, &dpdv, &d2pduu, &d2pduv, &d2pdvv);

        let p_error = Vector3f::from(p_hit).abs() * GAMMA5;
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
        self.phi_max * self.radius * (self.z_max - self.z_min)
    }
}
