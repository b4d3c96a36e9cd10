//! One-dimensional interpolation against a sorted table.
//!
//! Two interpolants are provided:
//!
//! - [`interp`]: piecewise-linear, clamping queries outside the table to
//!   the nearest endpoint value (no extrapolation).
//! - [`CubicSpline`]: a C² cubic spline through every table point with
//!   "not-a-knot" end conditions (the first two and last two pieces share
//!   a cubic).  Needs a strictly increasing abscissa.
//!
//! Both operate on plain slices so they can be applied to the `x`, `y`,
//! and every channel of a route against the same distance table.

use crate::types::RouteError;

/// Linear interpolation of `fp` over the non-decreasing table `xp` at
/// `x`.
///
/// Queries at or beyond either end of the table return the end value.
/// Where `xp` repeats a value, the later table entry wins for queries at
/// that exact position.
///
/// `xp` and `fp` must be non-empty and of equal length.
///
/// # Examples
///
/// ```
/// use routely::interpolate::interp;
///
/// let xp = [0.0, 10.0];
/// let fp = [0.0, 100.0];
/// assert_eq!(interp(&xp, &fp, 2.5), 25.0);
/// assert_eq!(interp(&xp, &fp, -1.0), 0.0);
/// assert_eq!(interp(&xp, &fp, 11.0), 100.0);
/// ```
#[must_use]
pub fn interp(xp: &[f64], fp: &[f64], x: f64) -> f64 {
    debug_assert!(!xp.is_empty() && xp.len() == fp.len());
    let last = xp.len() - 1;

    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }

    // First index with xp[j] > x; xp[0] <= x < xp[last] guarantees 1 <= j <= last.
    let j = xp.partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (f0, f1) = (fp[j - 1], fp[j]);
    let t = (x - x0) / (x1 - x0);
    (f1 - f0).mul_add(t, f0)
}

/// [`interp`] evaluated at every position in `at`.
#[must_use]
pub fn interp_many(xp: &[f64], fp: &[f64], at: &[f64]) -> Vec<f64> {
    at.iter().map(|&x| interp(xp, fp, x)).collect()
}

/// `num` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is exactly `end`.  `num == 1` yields `[start]`, and
/// `num == 0` yields nothing.
#[must_use]
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = (end - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let i = i as f64;
                    step.mul_add(i, start)
                })
                .collect();
            values[num - 1] = end;
            values
        }
    }
}

/// Cubic spline interpolant with not-a-knot end conditions.
///
/// Stored as knot positions, knot values, and the second derivative of
/// the spline at each knot.  With 2 knots the spline is the straight
/// line through them; with 3 it is the parabola through them.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(xs[i], ys[i])`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidArgument`] if the tables differ in length or
    ///   have fewer than 2 entries.
    /// - [`RouteError::NotStrictlyIncreasing`] if `xs` repeats or
    ///   decreases anywhere.
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, RouteError> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return Err(RouteError::InvalidArgument(format!(
                "cubic spline needs two equal-length tables of at least 2 entries, got {} and {}",
                xs.len(),
                ys.len(),
            )));
        }
        if let Some(index) = (1..xs.len()).find(|&i| xs[i] <= xs[i - 1]) {
            return Err(RouteError::NotStrictlyIncreasing { index });
        }

        let second = not_a_knot_second_derivatives(xs, ys);
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second,
        })
    }

    /// Evaluate the spline at `x`.
    ///
    /// Queries outside the knot range are clamped to it.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let x = x.clamp(self.xs[0], self.xs[n - 1]);

        // Interval i covers [xs[i], xs[i + 1]]; interior knots <= x select it.
        let i = self.xs[1..n - 1].partition_point(|&k| k <= x);

        let h = self.xs[i + 1] - self.xs[i];
        let t0 = x - self.xs[i];
        let t1 = self.xs[i + 1] - x;
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        let curvature = m0.mul_add(t1.powi(3), m1 * t0.powi(3)) / (6.0 * h);
        let a = y0 / h - m0 * h / 6.0;
        let b = y1 / h - m1 * h / 6.0;
        curvature + a.mul_add(t1, b * t0)
    }

    /// Evaluate the spline at every position in `at`.
    #[must_use]
    pub fn evaluate_many(&self, at: &[f64]) -> Vec<f64> {
        at.iter().map(|&x| self.evaluate(x)).collect()
    }
}

/// Second derivatives at each knot for the not-a-knot spline.
///
/// Requires `xs` strictly increasing and `xs.len() == ys.len() >= 2`.
///
/// The interior continuity equations
///
/// ```text
/// h[i-1]·M[i-1] + 2(h[i-1] + h[i])·M[i] + h[i]·M[i+1] = 6(s[i] - s[i-1])
/// ```
///
/// are closed by equating the third derivative across the first and last
/// interior knots, which expresses `M[0]` and `M[n-1]` in terms of their
/// neighbours.  Substituting those leaves a tridiagonal system in
/// `M[1..n-1]`, solved with the Thomas algorithm.
fn not_a_knot_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<f64> = ys
        .windows(2)
        .zip(&h)
        .map(|(w, &hi)| (w[1] - w[0]) / hi)
        .collect();

    match n {
        2 => return vec![0.0; 2],
        3 => return vec![2.0 * (s[1] - s[0]) / (h[0] + h[1]); 3],
        _ => {}
    }

    // Unknowns M[1]..=M[n-2], stored at k = i - 1.
    let m = n - 2;
    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];

    for k in 0..m {
        let i = k + 1;
        sub[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        sup[k] = h[i];
        rhs[k] = 6.0 * (s[i] - s[i - 1]);
    }

    // M[0] = ((h0 + h1)·M[1] - h0·M[2]) / h1
    diag[0] += h[0] * (h[0] + h[1]) / h[1];
    sup[0] -= h[0] * h[0] / h[1];
    sub[0] = 0.0;

    // M[n-1] = ((h[n-3] + h[n-2])·M[n-2] - h[n-2]·M[n-3]) / h[n-3]
    let (ha, hb) = (h[n - 3], h[n - 2]);
    diag[m - 1] += hb * (ha + hb) / ha;
    sub[m - 1] -= hb * hb / ha;
    sup[m - 1] = 0.0;

    let interior = solve_tridiagonal(&sub, &diag, &sup, &rhs);

    let mut second = Vec::with_capacity(n);
    second.push(((h[0] + h[1]) * interior[0] - h[0] * interior[1]) / h[1]);
    second.extend_from_slice(&interior);
    second.push(((ha + hb) * interior[m - 1] - hb * interior[m - 2]) / ha);
    second
}

/// Solve a tridiagonal system with the Thomas algorithm.
///
/// `sub[0]` and `sup[len - 1]` are ignored.  The systems built by
/// [`not_a_knot_second_derivatives`] are diagonally dominant, so no
/// pivoting is needed.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = sub[i].mul_add(-c[i - 1], diag[i]);
        c[i] = sup[i] / denom;
        d[i] = sub[i].mul_add(-d[i - 1], rhs[i]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = c[i].mul_add(-x[i + 1], d[i]);
    }
    x
}
