cfg_if::cfg_if! {
   if #[cfg(feature = "float64")] {
        pub type Float = f64;
        pub type Integer = u64;
        pub const PI: f64 = std::f64::consts::PI;
   } else {
        pub type Float = f32;
        pub type Integer = u32;
        pub const PI: f32 = std::f32::consts::PI;
   }
}

pub const INV_PI: Float = 1.0 / PI;
pub const PI_OVER_2: Float = PI / 2.0;
pub const SHADOW_EPSILON: Float = 0.0001;
pub const EPSILON: Float = Float::EPSILON;
pub const MACHINE_EPSILON: Float = 0.5 * EPSILON;
pub const ONE_MINUS_EPSILON: Float = 1.0 - EPSILON;
pub const GAMMA3: Float = 3.0 * MACHINE_EPSILON / (1.0 - 3.0 * MACHINE_EPSILON);
pub const GAMMA5: Float = 5.0 * MACHINE_EPSILON / (1.0 - 5.0 * MACHINE_EPSILON);

#[inline]
pub fn float_to_bits(f: Float) -> Integer {
    f.to_bits()
}

#[inline]
pub fn bits_to_float(ui: Integer) -> Float {
    Float::from_bits(ui)
}

#[inline]
pub fn next_float_up(mut n: Float) -> Float {
    if n.is_infinite() && n > 0.0 {
        return n;
    }
    if n == -0.0 {
        n = 0.0;
    }
    let u = float_to_bits(n);
    if n >= 0.0 {
        bits_to_float(u + 1)
    } else {
        bits_to_float(u - 1)
    }
}

#[inline]
pub fn next_float_down(mut n: Float) -> Float {
    if n.is_infinite() && n < 0.0 {
        return n;
    }
    if n == 0.0 {
        n = -0.0;
    }
    let u = float_to_bits(n);
    if n > 0.0 {
        bits_to_float(u - 1)
    } else {
        bits_to_float(u + 1)
    }
}

/// (1+&epsilon;<sub>m</sub>)<sup>n</sup> can be tightly bounded to 1 + &theta;<sub>n</sub>,
/// where &theta;<sub>n</sub> is this gamma function.
#[inline]
pub fn gamma(n: i32) -> Float {
    let n = n as Float;
    n * MACHINE_EPSILON / (1.0 - n * MACHINE_EPSILON)
}

#[inline]
pub fn clamp<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

#[inline]
pub fn lerp<T: num::Float>(t: T, v1: T, v2: T) -> T {
    (T::one() - t) * v1 + t * v2
}

#[inline]
pub fn radians(deg: Float) -> Float {
    PI / 180.0 * deg
}

#[inline]
pub fn degrees(rad: Float) -> Float {
    180.0 / PI * rad
}

/// Solves a·t² + b·t + c = 0 and returns the roots in ascending order.
#[inline]
pub fn quadratic(a: Float, b: Float, c: Float) -> Option<(Float, Float)> {
    let discrim = b as f64 * b as f64 - 4.0 * a as f64 * c as f64;
    if discrim < 0.0 {
        return None;
    }
    let root_discrim = discrim.sqrt() as Float;

    let q = if b < 0.0 {
        -0.5 * (b - root_discrim)
    } else {
        -0.5 * (b + root_discrim)
    };
    let mut t0 = q / a;
    let mut t1 = c / q;
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1)
    }
    Some((t0, t1))
}
