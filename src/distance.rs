//! Distance engine seam.
//!
//! A [`SequenceDistance`] compares two coordinate sequences, each an `N × d`
//! matrix (`d = 2` for x/y, `3` with altitude) as produced by
//! [`Trajectory::coordinates`](crate::trajectory::Trajectory::coordinates).
//! Dynamic time warping is the intended metric; it is supplied by the caller.
//!
//! Closures implement the trait, so a one-off metric is a lambda away:
//!
//! ```rust
//! use flightframe::distance::SequenceDistance;
//! use nalgebra::DMatrix;
//!
//! let endpoints = |a: &DMatrix<f64>, b: &DMatrix<f64>| {
//!     (a.row(a.nrows() - 1) - b.row(b.nrows() - 1)).norm()
//! };
//! let a = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 3.0, 4.0]);
//! let b = DMatrix::from_row_slice(1, 2, &[0.0, 0.0]);
//! assert_eq!(endpoints.distance(&a, &b), 5.0);
//! ```
use nalgebra::DMatrix;

pub trait SequenceDistance {
    /// Distance between two coordinate sequences.
    fn distance(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64;

    /// Pairwise distances between `sequences`.
    ///
    /// Return
    /// ----------
    /// * An `N × N` matrix: the upper triangle is computed, mirrored into the
    ///   lower triangle, and the diagonal is zero.
    fn distance_matrix(&self, sequences: &[DMatrix<f64>]) -> DMatrix<f64> {
        let n = sequences.len();
        let mut out = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.distance(&sequences[i], &sequences[j]);
                out[(i, j)] = d;
                out[(j, i)] = d;
            }
        }
        out
    }
}

impl<F> SequenceDistance for F
where
    F: Fn(&DMatrix<f64>, &DMatrix<f64>) -> f64,
{
    fn distance(&self, a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
        self(a, b)
    }
}
