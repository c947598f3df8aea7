/// A dense 2D grid stored row-major (`x + y * width`). Edges do not wrap.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Get the index into the data array.
    ///
    /// # Panics
    /// If `(x, y)` lies outside the grid. Rows are not allowed to spill into
    /// their neighbors.
    pub fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) out of bounds for {}x{} tilemap",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Inverse of [`Tilemap::index`].
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Neighbor of `(x, y)` in direction `dir` (see [`DIR_OFFSETS`]), if inside the grid.
    pub fn neighbor(&self, x: usize, y: usize, dir: usize) -> Option<(usize, usize)> {
        let (dx, dy) = DIR_OFFSETS[dir];
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= self.width as i32 || ny >= self.height as i32 {
            return None;
        }
        Some((nx as usize, ny as usize))
    }

    /// Get 8-connected neighbors as `(direction, x, y)`.
    /// Cells on the border return fewer than 8 entries.
    pub fn neighbors_8(&self, x: usize, y: usize) -> Vec<(usize, usize, usize)> {
        let mut result = Vec::with_capacity(8);
        for dir in 1..=8 {
            if let Some((nx, ny)) = self.neighbor(x, y, dir) {
                result.push((dir, nx, ny));
            }
        }
        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            (idx % width, idx / width, val)
        })
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| {
            (idx % width, idx / width, val)
        })
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum value in the map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_v = f32::MAX;
        let mut max_v = f32::MIN;
        for &v in &self.data {
            if v < min_v { min_v = v; }
            if v > max_v { max_v = v; }
        }
        (min_v, max_v)
    }

    /// Rescale values to [0, 1]. A flat map becomes all zeros.
    pub fn normalize(&mut self) {
        let (min_v, max_v) = self.min_max();
        let range = max_v - min_v;
        if range <= f32::EPSILON {
            self.data.fill(0.0);
            return;
        }
        for v in &mut self.data {
            *v = ((*v - min_v) / range).clamp(0.0, 1.0);
        }
    }

    /// Sample using bilinear interpolation, clamping coordinates to the grid.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let x = if x.is_finite() { x.clamp(0.0, max_x) } else { 0.0 };
        let y = if y.is_finite() { y.clamp(0.0, max_y) } else { 0.0 };

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let v00 = *self.get(x0, y0);
        let v10 = *self.get(x1, y0);
        let v01 = *self.get(x0, y1);
        let v11 = *self.get(x1, y1);

        let v0 = v00 * (1.0 - fx) + v10 * fx;
        let v1 = v01 * (1.0 - fx) + v11 * fx;
        v0 * (1.0 - fy) + v1 * fy
    }
}

// =============================================================================
// 8-NEIGHBOR DIRECTIONS
// =============================================================================

/// Direction index meaning "this cell" (no flow)
pub const DIR_NONE: usize = 0;

/// Direction offsets (dx, dy) indexed by direction.
/// Order: self, N, NE, E, SE, S, SW, W, NW. Even non-zero indices are diagonals.
pub const DIR_OFFSETS: [(i32, i32); 9] = [
    (0, 0),   // self
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

/// Whether a direction index is a diagonal step
pub fn is_diagonal(dir: usize) -> bool {
    dir != DIR_NONE && dir % 2 == 0
}

/// The opposite direction (N <-> S, NE <-> SW, ...). `DIR_NONE` maps to itself.
pub fn reverse_dir(dir: usize) -> usize {
    if dir == DIR_NONE {
        DIR_NONE
    } else {
        (dir - 1 + 4) % 8 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_dir_pairs() {
        assert_eq!(reverse_dir(1), 5);
        assert_eq!(reverse_dir(5), 1);
        assert_eq!(reverse_dir(2), 6);
        assert_eq!(reverse_dir(8), 4);
        assert_eq!(reverse_dir(DIR_NONE), DIR_NONE);
        for dir in 1..=8 {
            let (dx, dy) = DIR_OFFSETS[dir];
            let (rx, ry) = DIR_OFFSETS[reverse_dir(dir)];
            assert_eq!((dx + rx, dy + ry), (0, 0), "dir {} does not cancel", dir);
        }
    }

    #[test]
    fn test_corner_has_three_neighbors() {
        let map = Tilemap::new_with(4, 4, 0.0f32);
        assert_eq!(map.neighbors_8(0, 0).len(), 3);
        assert_eq!(map.neighbors_8(3, 3).len(), 3);
        assert_eq!(map.neighbors_8(1, 1).len(), 8);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_column_past_width_panics() {
        let mut map = Tilemap::new_with(4, 4, 0.0f32);
        map.set(0, 1, 0.9);
        // (4, 0) would alias (0, 1) in the flat buffer
        map.get(4, 0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut map = Tilemap::new_with(2, 2, 0.0f32);
        map.set(1, 0, 1.0);
        map.set(1, 1, 1.0);
        assert!((map.sample_bilinear(0.5, 0.5) - 0.5).abs() < 1e-6);
        // Clamped outside the grid
        assert_eq!(map.sample_bilinear(-3.0, 0.0), 0.0);
        assert_eq!(map.sample_bilinear(9.0, 9.0), 1.0);
    }

    #[test]
    fn test_normalize_range() {
        let mut map = Tilemap::new_with(3, 1, 0.0f32);
        map.set(0, 0, -2.0);
        map.set(1, 0, 0.0);
        map.set(2, 0, 2.0);
        map.normalize();
        assert_eq!(*map.get(0, 0), 0.0);
        assert!((*map.get(1, 0) - 0.5).abs() < 1e-6);
        assert_eq!(*map.get(2, 0), 1.0);
    }
}
