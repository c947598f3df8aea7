//! Seeded fractal noise shared by every generation stage.

use noise::{NoiseFn, Perlin};

/// Amplitude decay per octave
const PERSISTENCE: f64 = 0.5;

/// Frequency multiplier per octave
const LACUNARITY: f64 = 2.0;

/// Seeded fractal Brownian motion over Perlin noise.
#[derive(Clone)]
pub struct NoiseSource {
    perlin: Perlin,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Fractal noise at `point`, in [-1, 1]. Zero octaves yields 0.
    pub fn fbm(&self, point: [f64; 2], octaves: u32) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += amplitude * self.perlin.get([point[0] * frequency, point[1] * frequency]);
            max_value += amplitude;
            amplitude *= PERSISTENCE;
            frequency *= LACUNARITY;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        ((total / max_value) as f32).clamp(-1.0, 1.0)
    }
}
