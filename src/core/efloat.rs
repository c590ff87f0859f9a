use crate::core::pbrt::{next_float_down, next_float_up, Float, MACHINE_EPSILON};
use std::{
    mem::swap,
    ops::{Add, Div, Mul, Neg, Sub},
};

/// A floating-point value that carries a conservative interval `[low, high]`
/// around the exact real result of the computation that produced it.
#[derive(Debug, Copy, Clone, Default)]
pub struct EFloat {
    v: Float,
    low: Float,
    high: Float,
}

impl EFloat {
    pub fn new(v: Float, err: Float) -> EFloat {
        let r = if err == 0.0 {
            EFloat {
                v,
                low: v,
                high: v,
            }
        } else {
            EFloat {
                v,
                low: next_float_down(v - err),
                high: next_float_up(v + err),
            }
        };
        r.check()
    }

    fn from_bounds(v: Float, low: Float, high: Float) -> EFloat {
        EFloat { v, low, high }.check()
    }

    #[inline]
    fn check(self) -> Self {
        if self.low.is_finite() && self.high.is_finite() {
            debug_assert!(
                self.low <= self.v && self.v <= self.high,
                "EFloat value {} outside its bounds [{}, {}]",
                self.v,
                self.low,
                self.high
            );
        }
        self
    }

    #[inline]
    pub fn value(&self) -> Float {
        self.v
    }

    pub fn absolute_error(&self) -> Float {
        next_float_up((self.high - self.v).abs().max((self.v - self.low).abs()))
    }

    pub fn relative_error(&self) -> Float {
        self.absolute_error() / self.v.abs()
    }

    #[inline]
    pub fn upper_bound(&self) -> Float {
        self.high
    }

    #[inline]
    pub fn lower_bound(&self) -> Float {
        self.low
    }

    pub fn sqrt(&self) -> EFloat {
        EFloat::from_bounds(
            self.v.sqrt(),
            next_float_down(self.low.sqrt()),
            next_float_up(self.high.sqrt()),
        )
    }

    pub fn abs(&self) -> EFloat {
        if self.low >= 0.0 {
            *self
        } else if self.high <= 0.0 {
            -*self
        } else {
            EFloat::from_bounds(self.v.abs(), 0.0, self.high.max(-self.low))
        }
    }

    /// Solves a·t² + b·t + c = 0 with error tracking.
    ///
    /// The discriminant is evaluated in double precision and the root of it is
    /// given a relative error of ε. `q = -½(b ± √Δ)` takes the sign of `b` so
    /// the roots `q/a` and `c/q` never suffer from cancellation. Returns the
    /// roots ordered by value, or `None` when there is no real root.
    pub fn quadratic(a: EFloat, b: EFloat, c: EFloat) -> Option<(EFloat, EFloat)> {
        let discrim = b.v as f64 * b.v as f64 - 4.0 * a.v as f64 * c.v as f64;
        if discrim < 0.0 {
            return None;
        }
        let root_discrim = discrim.sqrt() as Float;
        let float_root_discrim = EFloat::new(root_discrim, MACHINE_EPSILON * root_discrim);
        let q = if b.v < 0.0 {
            (b - float_root_discrim) * -0.5
        } else {
            (b + float_root_discrim) * -0.5
        };
        let mut t0 = q / a;
        let mut t1 = c / q;
        if t0.v > t1.v {
            swap(&mut t0, &mut t1);
        }
        Some((t0, t1))
    }
}

impl From<Float> for EFloat {
    fn from(v: Float) -> Self {
        EFloat::new(v, 0.0)
    }
}

impl From<EFloat> for Float {
    fn from(ef: EFloat) -> Self {
        ef.v
    }
}

impl Add for EFloat {
    type Output = EFloat;

    fn add(self, rhs: Self) -> Self::Output {
        EFloat::from_bounds(
            self.v + rhs.v,
            next_float_down(self.lower_bound() + rhs.lower_bound()),
            next_float_up(self.upper_bound() + rhs.upper_bound()),
        )
    }
}

impl Sub for EFloat {
    type Output = EFloat;

    fn sub(self, rhs: Self) -> Self::Output {
        EFloat::from_bounds(
            self.v - rhs.v,
            next_float_down(self.lower_bound() - rhs.upper_bound()),
            next_float_up(self.upper_bound() - rhs.lower_bound()),
        )
    }
}

impl Mul for EFloat {
    type Output = EFloat;

    fn mul(self, rhs: Self) -> Self::Output {
        let prod = [
            self.lower_bound() * rhs.lower_bound(),
            self.upper_bound() * rhs.lower_bound(),
            self.lower_bound() * rhs.upper_bound(),
            self.upper_bound() * rhs.upper_bound(),
        ];
        EFloat::from_bounds(
            self.v * rhs.v,
            next_float_down(prod[0].min(prod[1]).min(prod[2]).min(prod[3])),
            next_float_up(prod[0].max(prod[1]).max(prod[2]).max(prod[3])),
        )
    }
}

impl Div for EFloat {
    type Output = EFloat;

    fn div(self, rhs: Self) -> Self::Output {
        let v = self.v / rhs.v;
        if rhs.low < 0.0 && rhs.high > 0.0 {
            // the divisor straddles zero, nothing can be said about the quotient
            return EFloat {
                v,
                low: -Float::INFINITY,
                high: Float::INFINITY,
            };
        }
        let div = [
            self.lower_bound() / rhs.lower_bound(),
            self.upper_bound() / rhs.lower_bound(),
            self.lower_bound() / rhs.upper_bound(),
            self.upper_bound() / rhs.upper_bound(),
        ];
        EFloat::from_bounds(
            v,
            next_float_down(div[0].min(div[1]).min(div[2]).min(div[3])),
            next_float_up(div[0].max(div[1]).max(div[2]).max(div[3])),
        )
    }
}

impl Neg for EFloat {
    type Output = EFloat;

    fn neg(self) -> Self::Output {
        EFloat {
            v: -self.v,
            low: -self.high,
            high: -self.low,
        }
    }
}

impl PartialEq for EFloat {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v
    }
}

macro_rules! impl_scalar_op {
    ($op:ident, $method:ident) => {
        impl $op<Float> for EFloat {
            type Output = EFloat;

            fn $method(self, rhs: Float) -> Self::Output {
                self.$method(EFloat::from(rhs))
            }
        }

        impl $op<EFloat> for Float {
            type Output = EFloat;

            fn $method(self, rhs: EFloat) -> Self::Output {
                EFloat::from(self).$method(rhs)
            }
        }
    };
}

impl_scalar_op!(Add, add);
impl_scalar_op!(Sub, sub);
impl_scalar_op!(Mul, mul);
impl_scalar_op!(Div, div);
