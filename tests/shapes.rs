mod common;

use common::Rng;
use float_cmp::assert_approx_eq;
use pbrt_robust::core::geometry::{Point3f, Ray, Vector3f};
use pbrt_robust::core::pbrt::{Float, PI};
use pbrt_robust::core::shape::Shape;
use pbrt_robust::core::transform::Transform;
use rayon::prelude::*;
use std::sync::Arc;

fn placed(t: Transform) -> (Arc<Transform>, Arc<Transform>) {
    (Arc::new(t), Arc::new(t.inverse()))
}

/// Ray from well outside `shape` aimed at a random point of its bound.
fn ray_at(rng: &mut Rng, shape: &Shape) -> Ray {
    let bound = shape.world_bound();
    let (center, radius) = bound.bounding_sphere();
    let o = center + rng.unit_vector() * (radius * rng.range(1.5, 20.0));
    let target = bound.lerp(&Point3f::new(rng.uniform_float(), rng.uniform_float(), rng.uniform_float()));
    Ray::new(o, target - o, Float::INFINITY, 0.0)
}

/// Rays leaving a hit on the outer side of a convex surface must never find
/// that surface again.
fn check_no_reintersection(rng: &mut Rng, shape: &Shape) {
    let ray = ray_at(rng, shape);
    let (_, si) = match shape.intersect(&ray, false) {
        Some(hit) => hit,
        None => return,
    };
    for _ in 0..10 {
        let mut w = rng.unit_vector();
        if w.dot(&si.n) < 0.0 {
            w = -w;
        }
        let out = si.spawn_ray(&w);
        assert!(!shape.intersect_p(&out, false), "{:?} re-hit from {:?} along {:?}", shape, si.p, w);
    }
}

#[test]
fn spheres_do_not_reintersect() {
    common::init_logger();
    for i in 0..1000 {
        let mut rng = Rng::new(i);
        let (o2w, w2o) = placed(Transform::identity());
        let radius = rng.exponential();
        let sphere = Shape::new_sphere(o2w, w2o, false, radius, -radius, radius, 360.0);
        check_no_reintersection(&mut rng, &sphere);
    }
}

#[test]
fn partial_spheres_do_not_reintersect() {
    for i in 0..1000 {
        let mut rng = Rng::new(i);
        let (o2w, w2o) = placed(Transform::identity());
        let radius = rng.exponential();
        let z_min = radius * rng.range(-1.0, 0.5);
        let z_max = radius * rng.range(0.5, 1.0);
        let phi_max = rng.range(10.0, 360.0);
        let sphere = Shape::new_sphere(o2w, w2o, false, radius, z_min, z_max, phi_max);
        check_no_reintersection(&mut rng, &sphere);
    }
}

#[test]
fn cylinders_do_not_reintersect() {
    for i in 0..1000 {
        let mut rng = Rng::new(i);
        let (o2w, w2o) = placed(Transform::identity());
        let radius = rng.exponential();
        let z_min = -rng.exponential();
        let z_max = rng.exponential();
        let phi_max = rng.range(10.0, 360.0);
        let cylinder = Shape::new_cylinder(o2w, w2o, false, radius, z_min, z_max, phi_max);
        check_no_reintersection(&mut rng, &cylinder);
    }
}

#[test]
fn disks_do_not_reintersect() {
    for i in 0..1000 {
        let mut rng = Rng::new(i);
        let (o2w, w2o) = placed(Transform::identity());
        let radius = rng.exponential();
        let height = rng.range(-10.0, 10.0);
        let inner_radius = radius * rng.range(0.0, 0.9);
        let disk = Shape::new_disk(o2w, w2o, false, height, radius, inner_radius, rng.range(10.0, 360.0));
        check_no_reintersection(&mut rng, &disk);
    }
}

#[test]
fn transformed_sphere_hits_lie_within_their_error_bounds() {
    let mut rng = Rng::new(30);
    for _ in 0..200 {
        let center = rng.point_in_cube(100.0);
        let scale = rng.range(0.5, 20.0);
        let world = Transform::translate(&Vector3f::from(center))
            * Transform::rotate(rng.range(0.0, 360.0), &rng.unit_vector())
            * Transform::scale(scale, scale, scale);
        let (o2w, w2o) = placed(world);
        let sphere = Shape::new_sphere(o2w, w2o, false, 1.0, -1.0, 1.0, 360.0);
        let ray = ray_at(&mut rng, &sphere);
        if let Some((t_hit, si)) = sphere.intersect(&ray, false) {
            let from_center = (si.p - center).length();
            let slack = 2.0 * si.p_error.length() + 1e-12 * scale;
            assert!((from_center - scale).abs() <= slack, "{} vs {} ± {}", from_center, scale, slack);
            // the hit parameter agrees with the returned point
            let along = ray.point(t_hit);
            assert!((along - si.p).length() <= 1e-6 * (1.0 + center.distance(&Point3f::default())));
            assert_approx_eq!(Float, si.n.length(), 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn normal_orientation_follows_flags_and_handedness() {
    let ray = Ray::new(Point3f::new(5.0, 0.0, 0.3), Vector3f::new(-1.0, 0.0, 0.0), Float::INFINITY, 0.0);
    for &mirrored in &[false, true] {
        for &reverse in &[false, true] {
            let t = if mirrored {
                Transform::scale(1.0, 1.0, -1.0)
            } else {
                Transform::identity()
            };
            let (o2w, w2o) = placed(t);
            let sphere = Shape::new_sphere(o2w, w2o, reverse, 1.0, -1.0, 1.0, 360.0);
            assert_eq!(sphere.transform_swaps_handedness(), mirrored);
            let (_, si) = sphere.intersect(&ray, false).unwrap();
            assert_eq!(si.orientation_flipped, mirrored ^ reverse);
            // the normal agrees with the world-space tangents unless reversed
            let tangent_normal = si.dpdu.cross(&si.dpdv).normalize();
            let sign = if reverse { -1.0 } else { 1.0 };
            assert_approx_eq!(Float, si.n.dot(&tangent_normal), sign, epsilon = 1e-9);
            assert_eq!(si.shading.n, si.n);
        }
    }
}

#[test]
fn world_bounds_follow_the_transform() {
    let (o2w, w2o) = placed(Transform::translate(&Vector3f::new(0.0, 0.0, 10.0)) * Transform::rotate_x(90.0));
    let cylinder = Shape::new_cylinder(o2w, w2o, false, 1.0, 0.0, 4.0, 360.0);
    let b = cylinder.world_bound();
    // the axis now runs along -y
    assert_approx_eq!(Float, b.p_min.y, -4.0, epsilon = 1e-9);
    assert_approx_eq!(Float, b.p_max.y, 0.0, epsilon = 1e-9);
    assert_approx_eq!(Float, b.p_min.z, 9.0, epsilon = 1e-9);
    assert_approx_eq!(Float, b.p_max.z, 11.0, epsilon = 1e-9);
    assert_approx_eq!(Float, cylinder.area(), 8.0 * PI, epsilon = 1e-9);
}

#[test]
fn shared_shapes_intersect_concurrently() {
    let (o2w, w2o) = placed(Transform::translate(&Vector3f::new(1.0, 2.0, 3.0)));
    let shapes = Arc::new(vec![
        Shape::new_sphere(o2w.clone(), w2o.clone(), false, 2.0, -2.0, 2.0, 360.0),
        Shape::new_cylinder(o2w.clone(), w2o.clone(), false, 1.5, -1.0, 1.0, 270.0),
        Shape::new_disk(o2w, w2o, true, 0.5, 3.0, 1.0, 360.0),
    ]);
    let rays: Vec<Ray> = {
        let mut rng = Rng::new(40);
        (0..3000).map(|i| ray_at(&mut rng, &shapes[i % 3])).collect()
    };

    let closest = |ray: &Ray| -> Option<Float> {
        shapes
            .iter()
            .filter_map(|s| s.intersect(ray, false).map(|(t, _)| t))
            .fold(None, |best: Option<Float>, t| Some(best.map_or(t, |b| b.min(t))))
    };
    let sequential: Vec<Option<Float>> = rays.iter().map(|r| closest(r)).collect();
    let parallel: Vec<Option<Float>> = rays.par_iter().map(|r| closest(r)).collect();
    assert_eq!(sequential, parallel);
    assert!(sequential.iter().filter(|t| t.is_some()).count() > 1000);
}
