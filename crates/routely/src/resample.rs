//! Arc-length resampling of a route.
//!
//! A resample picks a new set of distance positions along the route and
//! evaluates `x`, `y`, and every channel at those positions by
//! interpolating against the current distance table `d`.  The new route's
//! own `d` is then recomputed from its coordinates, so it measures the
//! chords between the resampled points rather than the positions they
//! were sampled at.
//!
//! Step placement:
//!
//! | kind                | positions                                        | interpolant |
//! |---------------------|--------------------------------------------------|-------------|
//! | `equidistant_steps` | `d_min, d_min + num, ...`, last clamped to `d_max` | linear      |
//! | `absolute_steps`    | `num` positions, evenly spaced, inclusive        | linear      |
//! | `cubic`             | `num` positions, evenly spaced, inclusive        | cubic spline |
//!
//! All three keep the first and last point of the route.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dedup::DuplicatePolicy;
use crate::distance::deltas;
use crate::interpolate::{CubicSpline, interp_many, linspace};
use crate::route::Route;
use crate::types::RouteError;

/// Number of samples produced by the final cubic pass of
/// [`Route::smooth`].
pub const SMOOTH_SAMPLES: usize = 5000;

/// Largest number of points a resample may produce.
///
/// Larger requests are rejected before anything is allocated.
pub const MAX_RESAMPLE_POINTS: usize = 10_000_000;

/// Relative slack when deciding whether a span is a whole number of
/// steps.  Absorbs rounding in `span / step`.
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// Selects how resampled positions are placed and evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleKind {
    /// Fixed arc-length increments of `num`, linear interpolation.
    #[default]
    EquidistantSteps,
    /// Exactly `num` evenly spaced points, linear interpolation.
    AbsoluteSteps,
    /// Exactly `num` evenly spaced points, cubic spline interpolation.
    ///
    /// Requires strictly increasing distances: remove duplicate points
    /// first.
    Cubic,
}

impl ResampleKind {
    /// Every kind, in the order used by error messages.
    pub const ALL: [Self; 3] = [Self::EquidistantSteps, Self::AbsoluteSteps, Self::Cubic];

    /// The configuration spelling of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EquidistantSteps => "equidistant_steps",
            Self::AbsoluteSteps => "absolute_steps",
            Self::Cubic => "cubic",
        }
    }
}

impl fmt::Display for ResampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResampleKind {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RouteError::unknown_option("kind", s, Self::ALL.map(Self::as_str)))
    }
}

impl Route {
    /// Resample the route at new distance positions.
    ///
    /// For [`ResampleKind::EquidistantSteps`] `num` is the step distance;
    /// for the other kinds it is the number of output points.  Channels
    /// are resampled with the same positions and interpolant.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidArgument`] if `num` is not a positive
    ///   distance (equidistant) or not a whole count of at least 2, or
    ///   if the resample would produce more than [`MAX_RESAMPLE_POINTS`].
    /// - [`RouteError::NotStrictlyIncreasing`] for
    ///   [`ResampleKind::Cubic`] on a route with repeated points.
    /// - [`RouteError::TooFewPoints`] if the positions collapse to a single
    ///   point (a route of zero length resampled by distance).
    ///
    /// # Examples
    ///
    /// ```
    /// use routely::{ResampleKind, Route};
    ///
    /// let mut route = Route::new(vec![0.0, 10.0], vec![0.0, 0.0], None).unwrap();
    /// let resampled = route
    ///     .interpolate(ResampleKind::AbsoluteSteps, 5.0, false)
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(resampled.x(), &[0.0, 2.5, 5.0, 7.5, 10.0]);
    /// ```
    pub fn interpolate(
        &mut self,
        kind: ResampleKind,
        num: f64,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        let positions = self.positions(kind, num)?;
        let next = self.resample_at(kind, &positions)?;
        log::debug!(
            "resampled route ({kind}, num={num}): {} -> {} points",
            self.nr_points(),
            next.nr_points(),
        );
        Ok(self.commit(next, inplace))
    }

    /// Smooth the route with a cubic spline.
    ///
    /// With `Some(factor)`, `factor` in `[0, 1)`: the step
    /// `mean(segment length) / (1 - factor)` is derived, consecutive
    /// duplicate points are removed, the route is resampled in
    /// equidistant steps of that size, and the result is reconstructed as
    /// [`SMOOTH_SAMPLES`] cubic samples.  A higher factor means fewer
    /// intermediate points and so a smoother curve.
    ///
    /// With `None`, duplicates are removed and the cubic pass goes
    /// directly through the existing points.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidArgument`] if `factor` is outside `[0, 1)`.
    /// - [`RouteError::TooFewPoints`] if fewer than 2 distinct points
    ///   remain after duplicate removal.
    pub fn smooth(
        &mut self,
        smoothing_factor: Option<f64>,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        if let Some(factor) = smoothing_factor
            && !(0.0..1.0).contains(&factor)
        {
            return Err(RouteError::InvalidArgument(format!(
                "smoothing_factor must be in [0, 1), got {factor}"
            )));
        }

        let mut work = self.deduplicated(DuplicatePolicy::Consecutive)?;

        if let Some(factor) = smoothing_factor {
            let steps = deltas(self.d());
            #[allow(clippy::cast_precision_loss)]
            let mean = steps.iter().sum::<f64>() / steps.len() as f64;
            let step = mean / (1.0 - factor);
            log::debug!("smoothing with factor {factor}: equidistant step {step}");

            let positions = work.positions(ResampleKind::EquidistantSteps, step)?;
            work = work
                .resample_at(ResampleKind::EquidistantSteps, &positions)?
                .deduplicated(DuplicatePolicy::Consecutive)?;
        }

        let positions = linspace(work.d()[0], work.length(), SMOOTH_SAMPLES);
        let next = work.resample_at(ResampleKind::Cubic, &positions)?;
        log::debug!(
            "smoothed route: {} -> {} points",
            self.nr_points(),
            next.nr_points(),
        );
        Ok(self.commit(next, inplace))
    }

    /// Distance positions for a resample of the given kind.
    fn positions(&self, kind: ResampleKind, num: f64) -> Result<Vec<f64>, RouteError> {
        let d_min = self.d()[0];
        let d_max = self.length();
        match kind {
            ResampleKind::EquidistantSteps => equidistant_positions(d_min, d_max, num),
            ResampleKind::AbsoluteSteps | ResampleKind::Cubic => {
                let count = point_count(num)?;
                Ok(linspace(d_min, d_max, count))
            }
        }
    }

    /// Evaluate coordinates and channels at `positions`.
    fn resample_at(&self, kind: ResampleKind, positions: &[f64]) -> Result<Self, RouteError> {
        let d = self.d();
        let series = |values: &[f64]| -> Result<Vec<f64>, RouteError> {
            match kind {
                ResampleKind::EquidistantSteps | ResampleKind::AbsoluteSteps => {
                    Ok(interp_many(d, values, positions))
                }
                ResampleKind::Cubic => Ok(CubicSpline::new(d, values)?.evaluate_many(positions)),
            }
        };

        let x = series(self.x())?;
        let y = series(self.y())?;
        let z = self
            .z()
            .map(|channels| channels.try_map_values(&series))
            .transpose()?;
        Self::new(x, y, z)
    }
}

/// Positions `d_min + k·step` for `k = 0..=ceil((d_max - d_min) / step)`,
/// with the final position clamped to `d_max`.
///
/// This yields `1 + ceil(span / step)` positions; the last step is
/// shorter than `step` unless the span is a whole number of steps.
fn equidistant_positions(d_min: f64, d_max: f64, step: f64) -> Result<Vec<f64>, RouteError> {
    if !(step.is_finite() && step > 0.0) {
        return Err(RouteError::InvalidArgument(format!(
            "equidistant step must be a positive distance, got {step}"
        )));
    }

    let ratio = (d_max - d_min) / step;
    #[allow(clippy::cast_precision_loss)]
    let cap = MAX_RESAMPLE_POINTS as f64;
    if !(ratio.is_finite() && ratio < cap) {
        return Err(RouteError::InvalidArgument(format!(
            "equidistant step {step} would exceed {MAX_RESAMPLE_POINTS} points"
        )));
    }
    let whole = ratio.round();
    let steps = if (ratio - whole).abs() <= STEP_COUNT_TOLERANCE * whole.max(1.0) {
        whole
    } else {
        ratio.ceil()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = steps as usize;

    let mut positions: Vec<f64> = (0..=steps)
        .map(|k| {
            #[allow(clippy::cast_precision_loss)]
            let k = k as f64;
            step.mul_add(k, d_min).min(d_max)
        })
        .collect();
    if let Some(last) = positions.last_mut() {
        *last = d_max;
    }
    Ok(positions)
}

/// Validate a point count given as `f64`.
fn point_count(num: f64) -> Result<usize, RouteError> {
    if !(num.is_finite() && num >= 2.0 && num.fract() == 0.0) {
        return Err(RouteError::InvalidArgument(format!(
            "number of points must be a whole number of at least 2, got {num}"
        )));
    }
    #[allow(clippy::cast_precision_loss)]
    let cap = MAX_RESAMPLE_POINTS as f64;
    if num > cap {
        return Err(RouteError::InvalidArgument(format!(
            "number of points must be at most {MAX_RESAMPLE_POINTS}, got {num}"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num = num as usize;
    Ok(num)
}
