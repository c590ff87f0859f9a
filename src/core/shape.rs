use crate::core::geometry::{Bounds3f, Ray};
use crate::core::interaction::SurfaceInteraction;
use crate::core::pbrt::Float;
use crate::core::transform::Transform;
use crate::shapes::{cylinder::Cylinder, disk::Disk, sphere::Sphere};
use std::sync::Arc;

/// State every shape carries: its placement in the world and whether its
/// surface normals should be flipped.
#[derive(Debug, Clone)]
pub struct BaseShape {
    pub object_to_world: Arc<Transform>,
    pub world_to_object: Arc<Transform>,
    pub reverse_orientation: bool,
    pub transform_swaps_handedness: bool,
}

impl BaseShape {
    pub fn new(
        object_to_world: Arc<Transform>,
        world_to_object: Arc<Transform>,
        reverse_orientation: bool,
    ) -> Self {
        let transform_swaps_handedness = object_to_world.swaps_handedness();
        Self {
            object_to_world,
            world_to_object,
            reverse_orientation,
            transform_swaps_handedness,
        }
    }

    /// Whether normals computed from `dpdu × dpdv` must be negated.
    pub fn orientation_flipped(&self) -> bool {
        self.reverse_orientation ^ self.transform_swaps_handedness
    }
}

#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Cylinder(Cylinder),
    Disk(Disk),
}

macro_rules! dispatch {
    ($self:ident, $s:ident => $e:expr) => {
        match $self {
            Shape::Sphere($s) => $e,
            Shape::Cylinder($s) => $e,
            Shape::Disk($s) => $e,
        }
    };
}

impl Shape {
    /// Sphere of `radius` clipped to `[z_min, z_max]` and swept through
    /// `phi_max` degrees.
    pub fn new_sphere(
        object_to_world: Arc<Transform>,
        world_to_object: Arc<Transform>,
        reverse_orientation: bool,
        radius: Float,
        z_min: Float,
        z_max: Float,
        phi_max: Float,
    ) -> Shape {
        Shape::Sphere(Sphere::new(
            object_to_world,
            world_to_object,
            reverse_orientation,
            radius,
            z_min,
            z_max,
            phi_max,
        ))
    }

    pub fn new_cylinder(
        object_to_world: Arc<Transform>,
        world_to_object: Arc<Transform>,
        reverse_orientation: bool,
        radius: Float,
        z_min: Float,
        z_max: Float,
        phi_max: Float,
    ) -> Shape {
        Shape::Cylinder(Cylinder::new(
            object_to_world,
            world_to_object,
            reverse_orientation,
            radius,
            z_min,
            z_max,
            phi_max,
        ))
    }

    pub fn new_disk(
        object_to_world: Arc<Transform>,
        world_to_object: Arc<Transform>,
        reverse_orientation: bool,
        height: Float,
        radius: Float,
        inner_radius: Float,
        phi_max: Float,
    ) -> Shape {
        Shape::Disk(Disk::new(
            object_to_world,
            world_to_object,
            reverse_orientation,
            height,
            radius,
            inner_radius,
            phi_max,
        ))
    }

    fn base(&self) -> &BaseShape {
        dispatch!(self, s => &s.base)
    }

    pub fn object_to_world(&self) -> &Transform {
        &self.base().object_to_world
    }

    pub fn world_to_object(&self) -> &Transform {
        &self.base().world_to_object
    }

    pub fn reverse_orientation(&self) -> bool {
        self.base().reverse_orientation
    }

    pub fn transform_swaps_handedness(&self) -> bool {
        self.base().transform_swaps_handedness
    }

    pub fn object_bound(&self) -> Bounds3f {
        dispatch!(self, s => s.object_bound())
    }

    pub fn world_bound(&self) -> Bounds3f {
        dispatch!(self, s => s.world_bound())
    }

    /// Closest hit along `ray` within `(0, ray.t_max)`, as the ray parameter
    /// and the world-space surface interaction.
    pub fn intersect(&self, ray: &Ray, test_alpha_texture: bool) -> Option<(Float, SurfaceInteraction)> {
        dispatch!(self, s => s.intersect(ray, test_alpha_texture))
    }

    pub fn intersect_p(&self, ray: &Ray, test_alpha_texture: bool) -> bool {
        dispatch!(self, s => s.intersect_p(ray, test_alpha_texture))
    }

    pub fn area(&self) -> Float {
        dispatch!(self, s => s.area())
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Shape::Sphere(s)
    }
}

impl From<Cylinder> for Shape {
    fn from(c: Cylinder) -> Self {
        Shape::Cylinder(c)
    }
}

impl From<Disk> for Shape {
    fn from(d: Disk) -> Self {
        Shape::Disk(d)
    }
}
