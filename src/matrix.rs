//! Host-side matrices and the CPU reference transpose.
//!
//! A [`Matrix`] is nothing more than a flat row-major `Vec<f32>` with
//! its two dimensions attached.  The sequential fill and the
//! element-wise comparison here are what the driver uses to build its
//! deterministic test input and to validate GPU output against the
//! sequential [`Matrix::transposed`] oracle.

/// A dense row-major `f32` matrix.
///
/// Element `(x, y)` — column `x`, row `y` — lives at `data[x + y * width]`.
pub struct Matrix {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Matrix {
    /// Wrap an existing flat buffer.  `data.len()` must equal
    /// `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "matrix data length must be width * height"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// A matrix filled with 0.0, 1.0, 2.0, ... in row-major order.
    ///
    /// Deterministic by design: every element's expected transposed
    /// position can be computed without keeping the input around.
    pub fn sequential(width: usize, height: usize) -> Self {
        let data = (0..width * height).map(|i| i as f32).collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Element at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[x + y * self.width]
    }

    /// The sequential reference transpose.
    ///
    /// Produces a `height x width` matrix with `out(x, y) == in(y, x)`
    /// for every valid position.  No tiling, no parallelism; this is
    /// the correctness oracle for the GPU kernels.
    pub fn transposed(&self) -> Matrix {
        let mut out = vec![0.0f32; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                out[y + x * self.height] = self.data[x + y * self.width];
            }
        }
        Matrix {
            width: self.height,
            height: self.width,
            data: out,
        }
    }

    /// Element-wise comparison against a flat buffer of the same
    /// length, within an absolute tolerance.
    ///
    /// Returns the position of the first mismatch, or `None` if every
    /// element agrees.  A transpose moves values without arithmetic, so
    /// in practice the comparison is exact and the tolerance only
    /// guards against exotic backends.
    pub fn first_mismatch(&self, other: &[f32], tolerance: f32) -> Option<usize> {
        if self.data.len() != other.len() {
            return Some(self.data.len().min(other.len()));
        }
        self.data
            .iter()
            .zip(other.iter())
            .position(|(a, b)| (a - b).abs() > tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn four_by_four_transpose() {
        // 0..15 row-major transposes to columns-become-rows.
        let m = Matrix::sequential(4, 4);
        let t = m.transposed();
        let expected = [
            0.0, 4.0, 8.0, 12.0, //
            1.0, 5.0, 9.0, 13.0, //
            2.0, 6.0, 10.0, 14.0, //
            3.0, 7.0, 11.0, 15.0,
        ];
        assert_eq!(t.data, expected);
    }

    #[test]
    fn transpose_swaps_dimensions() {
        let m = Matrix::sequential(7, 3);
        let t = m.transposed();
        assert_eq!((t.width, t.height), (3, 7));
        assert_eq!(t.data.len(), m.data.len());
        for y in 0..m.height {
            for x in 0..m.width {
                assert_eq!(t.get(y, x), m.get(x, y));
            }
        }
    }

    #[test]
    fn double_transpose_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        for &(w, h) in &[(1usize, 1usize), (5, 4), (16, 16), (33, 17)] {
            let data: Vec<f32> = (0..w * h).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
            let m = Matrix::new(w, h, data.clone());
            let round_trip = m.transposed().transposed();
            assert_eq!(round_trip.data, data, "round trip failed for {w}x{h}");
        }
    }

    #[test]
    fn first_mismatch_reports_position() {
        let m = Matrix::sequential(4, 2);
        let mut other = m.data.clone();
        assert_eq!(m.first_mismatch(&other, 1e-6), None);
        other[5] += 0.5;
        assert_eq!(m.first_mismatch(&other, 1e-6), Some(5));
    }

    #[test]
    #[should_panic(expected = "width * height")]
    fn wrong_length_is_rejected() {
        let _ = Matrix::new(3, 3, vec![0.0; 8]);
    }
}
