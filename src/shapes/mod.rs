use crate::core::efloat::EFloat;
use crate::core::geometry::{Normal3f, Ray, Vector3f};
use crate::core::pbrt::Float;
use std::iter::once;

pub mod cylinder;
pub mod disk;
pub mod sphere;

/// Origin and direction of an object-space ray as error-carrying components.
pub(crate) struct ERay {
    pub o: [EFloat; 3],
    pub d: [EFloat; 3],
}

impl ERay {
    pub fn new(ray: &Ray, o_err: &Vector3f, d_err: &Vector3f) -> ERay {
        ERay {
            o: [
                EFloat::new(ray.o.x, o_err.x),
                EFloat::new(ray.o.y, o_err.y),
                EFloat::new(ray.o.z, o_err.z),
            ],
            d: [
                EFloat::new(ray.d.x, d_err.x),
                EFloat::new(ray.d.y, d_err.y),
                EFloat::new(ray.d.z, d_err.z),
            ],
        }
    }
}

/// Roots of `a·t² + b·t + c` that are certainly inside `(0, t_max]`, nearest
/// first. Nothing is yielded when the nearer root is certainly past `t_max`
/// or the farther one is possibly behind the origin.
pub(crate) fn quadric_hits(a: EFloat, b: EFloat, c: EFloat, t_max: Float) -> impl Iterator<Item = Float> {
    EFloat::quadratic(a, b, c)
        .filter(|(t0, t1)| t0.upper_bound() <= t_max && t1.lower_bound() > 0.0)
        .into_iter()
        .flat_map(|(t0, t1)| once(t0).chain(once(t1)))
        .filter(move |t| t.lower_bound() > 0.0 && t.upper_bound() <= t_max)
        .map(Float::from)
}

/// Weingarten equations: derivatives of the unit normal from the first and
/// second fundamental forms of the surface.
pub(crate) fn compute_normal_differential(
    dpdu: &Vector3f,
    dpdv: &Vector3f,
    d2pduu: &Vector3f,
    d2pduv: &Vector3f,
    d2pdvv: &Vector3f,
) -> (Normal3f, Normal3f) {
    let e1 = dpdu.dot(dpdu);
    let f1 = dpdu.dot(dpdv);
    let g1 = dpdv.dot(dpdv);
    let n = dpdu.cross(dpdv).normalize();
    let e2 = n.dot(d2pduu);
    let f2 = n.dot(d2pduv);
    let g2 = n.dot(d2pdvv);

    let denom = e1 * g1 - f1 * f1;
    if denom == 0.0 {
        return (Normal3f::default(), Normal3f::default());
    }
    let inv_egf2 = 1.0 / denom;
    let dndu = *dpdu * ((f2 * f1 - e2 * g1) * inv_egf2) + *dpdv * ((e2 * f1 - f2 * e1) * inv_egf2);
    let dndv = *dpdu * ((g2 * f1 - f2 * g1) * inv_egf2) + *dpdv * ((f2 * f1 - g2 * e1) * inv_egf2);
    (Normal3f::from(dndu), Normal3f::from(dndv))
}
