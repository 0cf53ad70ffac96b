use serde::{Deserialize, Serialize};

/// A 3D scalar field over a structured voxel grid
///
/// Values are stored flat, x-fastest: `idx = i + nx * (j + ny * k)`. Every
/// field participating in one solver call must share the same dimensions;
/// the solvers assume this and do not re-validate it (the dataset layer owns
/// shape checking).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScalarField3 {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    data: Vec<f64>,
}

impl ScalarField3 {
    /// Create a field of the given dimensions, uniformly filled
    pub fn filled(nx: usize, ny: usize, nz: usize, value: f64) -> Self {
        Self {
            nx,
            ny,
            nz,
            data: vec![value; nx * ny * nz],
        }
    }

    /// Create a zero-filled field of the given dimensions
    pub fn zeros(nx: usize, ny: usize, nz: usize) -> Self {
        Self::filled(nx, ny, nz, 0.0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn same_shape(&self, other: &ScalarField3) -> bool {
        self.nx == other.nx && self.ny == other.ny && self.nz == other.nz
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.idx(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let idx = self.idx(i, j, k);
        self.data[idx] = value;
    }

    #[inline]
    pub fn add(&mut self, i: usize, j: usize, k: usize, delta: f64) {
        let idx = self.idx(i, j, k);
        self.data[idx] += delta;
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copy every value from `other` (same-shape) into this field
    pub fn copy_from(&mut self, other: &ScalarField3) {
        self.data.copy_from_slice(&other.data);
    }

    pub fn min_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_round_trip() {
        let mut field = ScalarField3::zeros(4, 3, 2);
        field.set(3, 2, 1, 42.0);
        assert_eq!(field.at(3, 2, 1), 42.0);
        assert_eq!(field.len(), 24);
    }

    #[test]
    fn test_x_fastest_layout() {
        let field = ScalarField3::zeros(4, 3, 2);
        assert_eq!(field.idx(1, 0, 0), 1);
        assert_eq!(field.idx(0, 1, 0), 4);
        assert_eq!(field.idx(0, 0, 1), 12);
    }

    #[test]
    fn test_min_max_sweep() {
        let mut field = ScalarField3::filled(2, 2, 2, 5.0);
        field.set(0, 0, 0, -1.0);
        field.set(1, 1, 1, 9.0);
        assert_eq!(field.min_value(), -1.0);
        assert_eq!(field.max_value(), 9.0);
    }
}
