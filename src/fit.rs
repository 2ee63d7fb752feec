//! Incremental degree-2 least-squares fitting.
//!
//! # Theory
//!
//! Fitting $y = \beta_0 + \beta_1 x + \beta_2 x^2$ by ordinary least squares
//! reduces to the normal equations
//!
//! $$ X^T X \beta = X^T Y $$
//!
//! where $X^T X$ is the symmetric 3×3 matrix of power sums
//! $\{n, \sum x, \sum x^2, \sum x^3, \sum x^4\}$ and $X^T Y$ is
//! $[\sum y, \sum xy, \sum x^2 y]$.
//!
//! Both accumulators are plain sums, which buys two O(1) operations the
//! span optimizer leans on:
//! - [`QuadFit::add`] folds one sample into the sums.
//! - [`QuadFit::merge`] concatenates two sample sets by adding their
//!   accumulators componentwise, since
//!   $\begin{bmatrix} X_1 \\ X_2 \end{bmatrix}^T
//!    \begin{bmatrix} X_1 \\ X_2 \end{bmatrix} = X_1^T X_1 + X_2^T X_2$.
//!
//! [`QuadFit::solve`] applies Cramer's rule to the fixed 3×3 system; with
//! fewer than three samples it solves the top-left 1×1 or 2×2 subsystem and
//! zero-fills the higher coefficients, so a span of one or two elements gets
//! the exact constant or line through its points.

use crate::{POLY_COEFS, SEG_SIZE};

/// Evaluate `poly[0] + poly[1]*x + poly[2]*x*x`.
#[inline]
pub(crate) fn eval2(poly: &[f64; POLY_COEFS], x: f64) -> f64 {
    poly[0] + poly[1] * x + poly[2] * x * x
}

/// `XTX_PREFIX[k]` is XᵀX over the integer samples x = 0..k.
///
/// Span sample positions are in-segment indices, so every candidate fit's
/// XᵀX is the componentwise difference of two prefix entries instead of 16
/// accumulation passes. Only XᵀY depends on the y values.
static XTX_PREFIX: [[f64; 9]; SEG_SIZE + 1] = build_xtx_prefix();

const fn build_xtx_prefix() -> [[f64; 9]; SEG_SIZE + 1] {
    let mut out = [[0.0f64; 9]; SEG_SIZE + 1];
    let mut k = 0;
    while k < SEG_SIZE {
        let x = k as f64;
        let xp = [1.0, x, x * x, x * x * x, x * x * x * x];
        let mut i = 0;
        while i < 3 {
            let mut j = 0;
            while j < 3 {
                out[k + 1][i * 3 + j] = out[k][i * 3 + j] + xp[i + j];
                j += 1;
            }
            i += 1;
        }
        k += 1;
    }
    out
}

/// A degree-2 least-squares fit under construction.
///
/// Holds only the normal-equation accumulators, never the samples, so a fit
/// is 13 floats regardless of how many points it has absorbed.
#[derive(Debug, Clone, Default)]
pub struct QuadFit {
    n: usize,
    /// Row-major 3×3 XᵀX.
    xtx: [f64; 9],
    /// XᵀY.
    xty: [f64; 3],
}

impl QuadFit {
    /// Create an empty fit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fit over paired samples. `xs` and `ys` must have equal
    /// length.
    pub fn with_points(xs: &[f64], ys: &[f64]) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        let mut f = Self::new();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            f.add(x, y);
        }
        f
    }

    /// Create a fit over `ys` at the integer positions `x_start..x_end`,
    /// pulling XᵀX from the prefix cache.
    ///
    /// `x_end` must not exceed the segment size; the result matches
    /// [`with_points`](Self::with_points) up to summation order.
    pub fn with_int_range(x_start: usize, x_end: usize, ys: &[f64]) -> Self {
        debug_assert_eq!(ys.len(), x_end - x_start);
        debug_assert!(x_end <= SEG_SIZE);

        let mut f = Self::new();
        for i in 0..9 {
            f.xtx[i] = XTX_PREFIX[x_end][i] - XTX_PREFIX[x_start][i];
        }
        for (i, &y) in ys.iter().enumerate() {
            let x = (x_start + i) as f64;
            let xp = [1.0, x, x * x];
            for j in 0..POLY_COEFS {
                f.xty[j] += xp[j] * y;
            }
        }
        f.n = ys.len();
        f
    }

    /// Number of samples absorbed so far.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Fold one sample into the accumulators. O(1).
    pub fn add(&mut self, x: f64, y: f64) {
        let xp = [1.0, x, x * x];
        for i in 0..POLY_COEFS {
            for j in 0..POLY_COEFS {
                self.xtx[i * POLY_COEFS + j] += xp[i] * xp[j];
            }
            self.xty[i] += xp[i] * y;
        }
        self.n += 1;
    }

    /// Concatenate another fit's sample set into this one. O(1).
    pub fn merge(&mut self, other: &QuadFit) {
        self.n += other.n;
        for i in 0..9 {
            self.xtx[i] += other.xtx[i];
        }
        for i in 0..POLY_COEFS {
            self.xty[i] += other.xty[i];
        }
    }

    /// Solve for the coefficients `[β₀, β₁, β₂]`.
    ///
    /// With fewer than 3 samples the system is underdetermined; the top-left
    /// subsystem is solved instead and the remaining coefficients are zero.
    pub fn solve(&self) -> [f64; POLY_COEFS] {
        match self.n {
            0 => [0.0; POLY_COEFS],
            1 => [self.xty[0] / self.xtx[0], 0.0, 0.0],
            2 => {
                let mut out = [0.0; POLY_COEFS];
                solve2(
                    [self.xtx[0], self.xtx[1], self.xtx[3], self.xtx[4]],
                    [self.xty[0], self.xty[1]],
                    &mut out,
                );
                out
            }
            _ => {
                let mut out = [0.0; POLY_COEFS];
                solve3(&self.xtx, &self.xty, &mut out);
                out
            }
        }
    }
}

fn determinant2(v: [f64; 4]) -> f64 {
    v[0] * v[3] - v[1] * v[2]
}

fn determinant3(v: &[f64; 9]) -> f64 {
    let [a, b, c, d, e, f, g, h, i] = *v;
    a * e * i + b * f * g + c * d * h - c * e * g - b * d * i - a * f * h
}

fn solve2(v: [f64; 4], y: [f64; 2], into: &mut [f64; 3]) {
    let [a, b, c, d] = v;
    let dd = determinant2(v);
    into[0] = (y[0] * d - b * y[1]) / dd;
    into[1] = (a * y[1] - y[0] * c) / dd;
}

fn solve3(v: &[f64; 9], y: &[f64; 3], into: &mut [f64; 3]) {
    let [a, b, c, d, e, f, g, h, i] = *v;
    let dd = determinant3(v);
    // Column replacements, expanded along the replaced column.
    let dx1 = y[0] * e * i + b * f * y[2] + c * y[1] * h
        - c * e * y[2]
        - b * y[1] * i
        - y[0] * f * h;
    let dx2 = a * y[1] * i + y[0] * f * g + c * d * y[2]
        - c * y[1] * g
        - y[0] * d * i
        - a * f * y[2];
    let dx3 = a * e * y[2] + b * y[1] * g + y[0] * d * h
        - y[0] * e * g
        - b * d * y[2]
        - a * y[1] * h;
    into[0] = dx1 / dd;
    into[1] = dx2 / dd;
    into[2] = dx3 / dd;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_exact_quadratic_recovered() {
        // y = 3 + 2x + 0.5x² through 5 points is recovered exactly.
        let xs: Vec<f64> = (0..5).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 3.0 + 2.0 * x + 0.5 * x * x).collect();
        let poly = QuadFit::with_points(&xs, &ys).solve();
        assert_close(poly[0], 3.0);
        assert_close(poly[1], 2.0);
        assert_close(poly[2], 0.5);
    }

    #[test]
    fn test_line_through_two_points() {
        let f = QuadFit::with_points(&[1.0, 2.0], &[0.0, 1.0]);
        let poly = f.solve();
        assert_close(poly[0], -1.0);
        assert_close(poly[1], 1.0);
        assert_close(poly[2], 0.0);
    }

    #[test]
    fn test_single_point_is_constant() {
        let f = QuadFit::with_points(&[7.0], &[42.0]);
        let poly = f.solve();
        assert_close(poly[0], 42.0);
        assert_close(poly[1], 0.0);
        assert_close(poly[2], 0.0);
    }

    #[test]
    fn test_merge_equals_combined_fit() {
        let xs: Vec<f64> = (0..32).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 10.0 * x + (x * 7.0).sin()).collect();

        let mut left = QuadFit::with_points(&xs[..16], &ys[..16]);
        let right = QuadFit::with_points(&xs[16..], &ys[16..]);
        left.merge(&right);

        let whole = QuadFit::with_points(&xs, &ys);
        assert_eq!(left.n(), whole.n());

        let a = left.solve();
        let b = whole.solve();
        for i in 0..3 {
            // Summation order differs between the two paths, so allow a
            // few ulps of drift amplified by the solve.
            assert!((a[i] - b[i]).abs() < 1e-6, "{} != {}", a[i], b[i]);
        }
    }

    #[test]
    fn test_int_range_matches_pointwise_fit() {
        for (s, e) in [(0usize, 16usize), (16, 32), (32, 48), (0, 48), (1008, 1024)] {
            let window: Vec<f64> = (s..e).map(|i| (i as f64) * 0.5).collect();
            let xs: Vec<f64> = (s..e).map(|i| i as f64).collect();

            let a = QuadFit::with_int_range(s, e, &window).solve();
            let b = QuadFit::with_points(&xs, &window).solve();
            for k in 0..3 {
                assert!(
                    (a[k] - b[k]).abs() < 1e-6,
                    "coef {k} diverged for [{s},{e}): {} vs {}",
                    a[k],
                    b[k]
                );
            }
        }
    }

    #[test]
    fn test_known_least_squares_solution() {
        // Four points of the synopsis: 0, 15, 33, 50 at x = 0..4.
        let f = QuadFit::with_points(&[0.0, 1.0, 2.0, 3.0], &[0.0, 15.0, 33.0, 50.0]);
        let poly = f.solve();
        assert_close(poly[0], -0.2);
        assert_close(poly[1], 15.3);
        assert_close(poly[2], 0.5);
        assert_close(eval2(&poly, 3.0), 50.2);
    }
}
