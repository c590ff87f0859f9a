#![allow(dead_code)]

use pbrt_robust::core::geometry::{Point3f, Vector3f};
use pbrt_robust::core::pbrt::{Float, ONE_MINUS_EPSILON, PI};
use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the console logger from `log4rs.yml` once per test binary.
pub fn init_logger() {
    INIT.call_once(|| {
        log4rs::init_file("log4rs.yml", Default::default()).unwrap();
    });
}

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG32, so randomized checks see the same sequence on every run.
#[derive(Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Rng {
    pub fn new(sequence_index: u64) -> Self {
        let mut rng = Rng { state: 0, inc: 0 };
        rng.set_sequence(sequence_index);
        rng
    }

    pub fn set_sequence(&mut self, sequence_index: u64) {
        self.state = 0;
        self.inc = sequence_index << 1 | 1;
        self.uniform_u32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_u32();
    }

    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    pub fn uniform_float(&mut self) -> Float {
        ONE_MINUS_EPSILON.min(self.uniform_u32() as Float * 2.3283064365386963e-10)
    }

    pub fn range(&mut self, low: Float, high: Float) -> Float {
        low + (high - low) * self.uniform_float()
    }

    /// Random magnitude spread over several orders: 2^[-6, 6].
    pub fn exponential(&mut self) -> Float {
        (2.0 as Float).powf(self.range(-6.0, 6.0))
    }

    pub fn unit_vector(&mut self) -> Vector3f {
        let z = 1.0 - 2.0 * self.uniform_float();
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = 2.0 * PI * self.uniform_float();
        Vector3f::new(r * phi.cos(), r * phi.sin(), z)
    }

    pub fn point_in_cube(&mut self, half_extent: Float) -> Point3f {
        Point3f::new(
            self.range(-half_extent, half_extent),
            self.range(-half_extent, half_extent),
            self.range(-half_extent, half_extent),
        )
    }
}
