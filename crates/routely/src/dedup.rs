//! Duplicate point removal.
//!
//! Coincident points give zero-length segments, which leave the distance
//! table with repeated values.  Linear resampling tolerates that, but a
//! cubic spline fit against `d` does not, so routes are deduplicated
//! before smooth reconstruction.
//!
//! Two policies decide which points count as duplicates; the retained
//! indices are then applied to the coordinates and every channel alike.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::route::Route;
use crate::types::RouteError;

/// Which repeated points to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Drop a point only when it equals the point immediately before it.
    ///
    /// A route that returns to an earlier position keeps that point.
    #[default]
    Consecutive,
    /// Keep only the first occurrence of each `(x, y)` pair anywhere in
    /// the route.
    Any,
}

impl DuplicatePolicy {
    /// Every policy, in the order used by error messages.
    pub const ALL: [Self; 2] = [Self::Consecutive, Self::Any];

    /// The configuration spelling of this policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consecutive => "consecutive",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RouteError::unknown_option("duplicates", s, Self::ALL.map(Self::as_str)))
    }
}

/// Indices of the points kept under `policy`.
///
/// Index 0 is always kept.  `x` and `y` are zipped.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn retained_indices(x: &[f64], y: &[f64], policy: DuplicatePolicy) -> Vec<usize> {
    let len = x.len().min(y.len());
    match policy {
        DuplicatePolicy::Consecutive => (0..len)
            .filter(|&i| i == 0 || x[i] != x[i - 1] || y[i] != y[i - 1])
            .collect(),
        DuplicatePolicy::Any => {
            let mut seen = HashSet::with_capacity(len);
            (0..len)
                .filter(|&i| seen.insert((point_key(x[i]), point_key(y[i]))))
                .collect()
        }
    }
}

/// Hashable key for a coordinate; `-0.0` and `0.0` compare equal and so
/// share a key.
#[allow(clippy::float_cmp)]
fn point_key(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

impl Route {
    /// Remove duplicate points under `policy`.
    ///
    /// Distance is recomputed and every channel is reduced to the same
    /// retained positions.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::TooFewPoints`] if fewer than 2 points would
    /// remain (every point coincides).  The route is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use routely::{DuplicatePolicy, Route};
    ///
    /// let mut route = Route::new(
    ///     vec![0.0, 1.0, 1.0, 0.0],
    ///     vec![0.0, 0.0, 0.0, 0.0],
    ///     None,
    /// )
    /// .unwrap();
    /// let consecutive = route
    ///     .remove_duplicates(DuplicatePolicy::Consecutive, false)
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(consecutive.nr_points(), 3);
    ///
    /// let any = route.remove_duplicates(DuplicatePolicy::Any, false).unwrap().unwrap();
    /// assert_eq!(any.nr_points(), 2);
    /// ```
    pub fn remove_duplicates(
        &mut self,
        policy: DuplicatePolicy,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        let next = self.deduplicated(policy)?;
        Ok(self.commit(next, inplace))
    }

    /// Deduplicated copy of the route.
    pub(crate) fn deduplicated(&self, policy: DuplicatePolicy) -> Result<Self, RouteError> {
        let keep = retained_indices(self.x(), self.y(), policy);
        let pick = |values: &[f64]| keep.iter().map(|&i| values[i]).collect::<Vec<_>>();

        let next = Self::new(
            pick(self.x()),
            pick(self.y()),
            self.z().map(|channels| channels.map_values(pick)),
        )?;
        log::debug!(
            "removed {} duplicate points ({policy})",
            self.nr_points() - next.nr_points(),
        );
        Ok(next)
    }
}
