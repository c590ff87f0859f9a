use crate::core::{
    geometry::{Bounds3f, Normal3f, Point2f, Point3f, Ray, Vector3f},
    interaction::SurfaceInteraction,
    pbrt::{clamp, radians, Float, PI},
    shape::BaseShape,
    transform::Transform,
};
use derive_more::{Deref, DerefMut};
use std::sync::Arc;

/// Annulus in the plane `z = height`, facing +z.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct Disk {
    #[deref]
    #[deref_mut]
    pub(crate) base: BaseShape,
    height: Float,
    radius: Float,
    inner_radius: Float,
    phi_max: Float,
}

impl Disk {
    pub fn new(
        o2w: Arc<Transform>,
        w2o: Arc<Transform>,
        reverse_orientation: bool,
        height: Float,
        radius: Float,
        inner_radius: Float,
        phi_max: Float,
    ) -> Self {
        Self {
            base: BaseShape::new(o2w, w2o, reverse_orientation),
            height,
            radius,
            inner_radius,
            phi_max: radians(clamp(phi_max, 0.0, 360.0)),
        }
    }

    fn compute_intersect(&self, r: &Ray) -> Option<(Float, Point3f, Float, Ray)> {
        let ray = &*self.world_to_object * r;
        // parallel to the plane
        if ray.d.z == 0.0 {
            return None;
        }
        let t_hit = (self.height - ray.o.z) / ray.d.z;
        if t_hit <= 0.0 || t_hit >= ray.t_max {
            return None;
        }

        let p_hit = ray.point(t_hit);
        let dist2 = p_hit.x * p_hit.x + p_hit.y * p_hit.y;
        if dist2 > self.radius * self.radius || dist2 < self.inner_radius * self.inner_radius {
            return None;
        }
        let mut phi = p_hit.y.atan2(p_hit.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        if phi > self.phi_max {
            return None;
        }
        Some((t_hit, p_hit, phi, ray))
    }

    pub fn object_bound(&self) -> Bounds3f {
        Bounds3f::new(
            Point3f::new(-self.radius, -self.radius, self.height),
            Point3f::new(self.radius, self.radius, self.height),
        )
    }

    pub fn world_bound(&self) -> Bounds3f {
        &*self.object_to_world * &self.object_bound()
    }

    pub fn intersect(&self, r: &Ray, _test_alpha_texture: bool) -> Option<(Float, SurfaceInteraction)> {
        let (t_hit, mut p_hit, phi, ray) = self.compute_intersect(r)?;
        let u = phi / self.phi_max;
        let r_hit = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
        let v = (self.radius - r_hit) / (self.radius - self.inner_radius);
        // the parameterization is singular at the center, take the
        // derivatives just off it along phi = 0
        let (px, py, pr) = if r_hit == 0.0 {
            let x = 1e-5 * self.radius;
            (x, 0.0, x)
        } else {
            (p_hit.x, p_hit.y, r_hit)
        };
        let dpdu = Vector3f::new(-self.phi_max * py, self.phi_max * px, 0.0);
        let dpdv = Vector3f::new(px, py, 0.0) * ((self.inner_radius - self.radius) / pr);

        // snap onto the plane, the point is then exact
        p_hit.z = self.height;
        let si = SurfaceInteraction::new(
            p_hit,
            Vector3f::default(),
            Point2f::new(u, v),
            -ray.d,
            dpdu,
            dpdv,
            Normal3f::default(),
            Normal3f::default(),
            ray.time,
            self.orientation_flipped(),
        );
        Some((t_hit, &*self.object_to_world * &si))
    }

    pub fn intersect_p(&self, r: &Ray, _test_alpha_texture: bool) -> bool {
        self.compute_intersect(r).is_some()
    }

    pub fn area(&self) -> Float {
        self.phi_max * 0.5 * (self.radius * self.radius - self.inner_radius * self.inner_radius)
    }
}
