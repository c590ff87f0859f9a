use crate::core::pbrt::{Float, PI, PI_OVER_2};
use std::mem::swap;
use std::ops::{Add, Mul, Sub};

/// Closed range of reals used to bound the motion-derivative functions of an
/// animated transform over a span of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub low: Float,
    pub high: Float,
}

impl Interval {
    pub fn new(v0: Float, v1: Float) -> Self {
        Self {
            low: v0.min(v1),
            high: v0.max(v1),
        }
    }

    pub fn sin(&self) -> Interval {
        let mut sin_low = self.low.sin();
        let mut sin_high = self.high.sin();
        if sin_low > sin_high {
            swap(&mut sin_low, &mut sin_high);
        }
        if self.low < PI_OVER_2 && self.high > PI_OVER_2 {
            sin_high = 1.0;
        }
        if self.low < 1.5 * PI && self.high > 1.5 * PI {
            sin_low = -1.0;
        }
        Self {
            low: sin_low,
            high: sin_high,
        }
    }

    pub fn cos(&self) -> Interval {
        let mut cos_low = self.low.cos();
        let mut cos_high = self.high.cos();
        if cos_low > cos_high {
            swap(&mut cos_high, &mut cos_low);
        }
        if self.low < PI && self.high > PI {
            cos_low = -1.0;
        }
        Interval {
            low: cos_low,
            high: cos_high,
        }
    }
}

impl From<Float> for Interval {
    fn from(v: Float) -> Self {
        Interval { low: v, high: v }
    }
}

impl Add for &Interval {
    type Output = Interval;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            low: self.low + rhs.low,
            high: self.high + rhs.high,
        }
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for &Interval {
    type Output = Interval;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            low: self.low - rhs.high,
            high: self.high - rhs.low,
        }
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Mul for &Interval {
    type Output = Interval;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::Output {
            low: (self.low * rhs.low)
                .min(self.low * rhs.high)
                .min(self.high * rhs.high)
                .min(self.high * rhs.low),
            high: (self.low * rhs.low)
                .max(self.low * rhs.high)
                .max(self.high * rhs.high)
                .max(self.high * rhs.low),
        }
    }
}

impl Mul for Interval {
    type Output = Interval;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

/// Finds the zeros in `interval` of
///
/// f(t) = c₁ + (c₂ + c₃·t)·cos(2θt) + (c₄ + c₅·t)·sin(2θt)
///
/// Sub-intervals whose interval-arithmetic range excludes zero are discarded;
/// the survivors are bisected `depth` times and each leaf is refined with
/// `newton_iterations` Newton-Raphson steps starting from its midpoint.
pub fn interval_find_zeros(
    c: [Float; 5],
    theta: Float,
    interval: Interval,
    depth: u32,
    newton_iterations: u32,
) -> Vec<Float> {
    let mut zeros = Vec::new();
    find_zeros(&c, theta, interval, depth, newton_iterations, &mut zeros);
    zeros
}

fn find_zeros(
    c: &[Float; 5],
    theta: Float,
    interval: Interval,
    depth: u32,
    newton_iterations: u32,
    zeros: &mut Vec<Float>,
) {
    let [c1, c2, c3, c4, c5] = *c;
    let theta2 = Interval::from(2.0 * theta);
    let range = Interval::from(c1)
        + (Interval::from(c2) + Interval::from(c3) * interval) * (theta2 * interval).cos()
        + (Interval::from(c4) + Interval::from(c5) * interval) * (theta2 * interval).sin();
    if range.low > 0.0 || range.high < 0.0 || range.low == range.high {
        return;
    }
    if depth > 0 {
        let mid = (interval.low + interval.high) * 0.5;
        find_zeros(
            c,
            theta,
            Interval::new(interval.low, mid),
            depth - 1,
            newton_iterations,
            zeros,
        );
        find_zeros(
            c,
            theta,
            Interval::new(mid, interval.high),
            depth - 1,
            newton_iterations,
            zeros,
        );
    } else {
        let mut t_newton = (interval.low + interval.high) * 0.5;
        for _ in 0..newton_iterations {
            let f_newton = c1
                + (c2 + c3 * t_newton) * (2.0 * theta * t_newton).cos()
                + (c4 + c5 * t_newton) * (2.0 * theta * t_newton).sin();
            let f_prime_newton = (c3 + 2.0 * (c4 + c5 * t_newton) * theta)
                * (2.0 * t_newton * theta).cos()
                + (c5 - 2.0 * (c2 + c3 * t_newton) * theta) * (2.0 * t_newton * theta).sin();
            if f_newton == 0.0 || f_prime_newton == 0.0 {
                break;
            }
            t_newton -= f_newton / f_prime_newton;
        }
        if t_newton >= interval.low - 1e-3 && t_newton < interval.high + 1e-3 {
            zeros.push(t_newton);
        }
    }
}
