//! Scrolling cloud overlay
//!
//! An independent noise field that drifts one column at a time. It is not
//! part of the terrain dataset and changes every frame.

use crate::config::CloudParams;
use crate::noise_source::NoiseSource;
use crate::tilemap::Tilemap;

/// Cloud cover grid in [0, 1], scrolled westward by whole columns.
pub struct CloudLayer {
    cover: Tilemap<f32>,
    noise: NoiseSource,
    params: CloudParams,
    /// Sub-column scroll progress in [0, 1)
    offset: f32,
    /// Noise-space column of the next refill
    next_column: u64,
}

impl CloudLayer {
    /// Fill a fresh layer from `noise_seed`.
    pub fn new(width: usize, height: usize, params: CloudParams, noise_seed: u32) -> Self {
        let mut layer = Self {
            cover: Tilemap::new_with(width, height, 0.0f32),
            noise: NoiseSource::new(noise_seed),
            params,
            offset: 0.0,
            next_column: 0,
        };
        for x in 0..width {
            layer.fill_column(x);
        }
        layer
    }

    fn sample(&self, column: u64, y: usize) -> f32 {
        let scale = self.params.frequency / self.cover.width.max(1) as f64;
        let n = self.noise.fbm([column as f64 * scale, y as f64 * scale], self.params.octaves);
        0.5 + 0.5 * n
    }

    fn fill_column(&mut self, x: usize) {
        let column = self.next_column;
        for y in 0..self.cover.height {
            let v = self.sample(column, y);
            self.cover.set(x, y, v);
        }
        self.next_column += 1;
    }

    /// Shift every row one column west and refill the east edge.
    fn shift(&mut self) {
        let width = self.cover.width;
        if width == 0 {
            return;
        }
        for row in self.cover.as_mut_slice().chunks_mut(width) {
            row.rotate_left(1);
        }
        self.fill_column(width - 1);
    }

    /// Advance the layer by `dt` seconds. Returns the number of columns scrolled.
    pub fn update(&mut self, dt: f32) -> usize {
        if !(dt > 0.0) {
            return 0;
        }
        self.offset += self.params.speed * dt;
        let columns = self.offset.floor();
        self.offset -= columns;
        let columns = columns as usize;
        for _ in 0..columns {
            self.shift();
        }
        columns
    }

    /// Cloud cover at a cell, in [0, 1].
    pub fn cloud_at(&self, x: usize, y: usize) -> f32 {
        *self.cover.get(x, y)
    }

    /// Fraction of the next column already scrolled, for smooth rendering.
    pub fn scroll_offset(&self) -> f32 {
        self.offset
    }

    pub fn cover(&self) -> &Tilemap<f32> {
        &self.cover
    }
}
