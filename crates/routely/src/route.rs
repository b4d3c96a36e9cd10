//! The [`Route`] entity: coordinates, optional channels, and the derived
//! arc-length parameter.
//!
//! A route always satisfies:
//!
//! - `x`, `y`, `d`, and every channel have the same length, which is at
//!   least 2;
//! - every entry is a finite real number;
//! - `d[0] == 0` and `d` never decreases.
//!
//! Operations that change a route either rewrite it in place or return a
//! new one, chosen by an `inplace` flag.  In both cases the replacement
//! data is built and validated as a complete [`Route`] first, and only
//! then committed, so a failing operation never leaves a half-updated
//! route behind.

use serde::{Deserialize, Serialize};

use crate::distance::cumulative_distance;
use crate::types::{BoundingBox, Channels, Point, RouteError};

/// A 2D route with optional named channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RouteData")]
pub struct Route {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Option<Channels>,
    d: Vec<f64>,
}

/// Unvalidated route input, as accepted by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    /// x-coordinates.
    pub x: Vec<f64>,
    /// y-coordinates.
    pub y: Vec<f64>,
    /// Optional channels.
    #[serde(default)]
    pub z: Option<Channels>,
}

impl TryFrom<RouteData> for Route {
    type Error = RouteError;

    fn try_from(data: RouteData) -> Result<Self, Self::Error> {
        Self::new(data.x, data.y, data.z)
    }
}

/// One point of [`Route::route`]: coordinates, channel values in channel
/// order, and distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRow {
    /// x-coordinate.
    pub x: f64,
    /// y-coordinate.
    pub y: f64,
    /// Channel values, in [`Channels::names`] order.
    pub z: Vec<f64>,
    /// Cumulative distance.
    pub d: f64,
}

/// Column-labelled table view of a route, see [`Route::dataframe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    /// `x`, `y`, each channel name, then `d`.
    pub columns: Vec<String>,
    /// One row per point, aligned with `columns`.
    pub rows: Vec<Vec<f64>>,
}

impl Route {
    /// Build a route, validating lengths and values and computing `d`.
    ///
    /// An empty channel collection is treated as no channels.
    ///
    /// # Errors
    ///
    /// - [`RouteError::TooFewPoints`] if `x` or `y` has fewer than 2 items.
    /// - [`RouteError::LengthMismatch`] if `x` and `y` differ in length.
    /// - [`RouteError::ReservedChannelName`] if a channel is named `x`,
    ///   `y`, or `d`.
    /// - [`RouteError::ChannelLengthMismatch`] if a channel's length
    ///   differs from `x`.
    /// - [`RouteError::NonNumeric`] if any entry is NaN or infinite.
    ///
    /// # Examples
    ///
    /// ```
    /// use routely::Route;
    ///
    /// let route = Route::new(vec![0.0, 3.0], vec![0.0, 4.0], None).unwrap();
    /// assert_eq!(route.d(), &[0.0, 5.0]);
    /// ```
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Option<Channels>) -> Result<Self, RouteError> {
        let z = z.filter(|channels| !channels.is_empty());
        check_inputs(&x, &y, z.as_ref())?;
        let d = cumulative_distance(&x, &y);
        Ok(Self { x, y, z, d })
    }

    /// Build a route from points.
    ///
    /// # Errors
    ///
    /// Same as [`Route::new`].
    pub fn from_points(points: &[Point], z: Option<Channels>) -> Result<Self, RouteError> {
        let (x, y) = points.iter().map(|p| (p.x, p.y)).unzip();
        Self::new(x, y, z)
    }

    /// x-coordinates.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// y-coordinates.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Cumulative distance along the route.
    #[must_use]
    pub fn d(&self) -> &[f64] {
        &self.d
    }

    /// Channels, if the route has any.
    #[must_use]
    pub const fn z(&self) -> Option<&Channels> {
        self.z.as_ref()
    }

    /// Values of a single channel.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.z.as_ref().and_then(|z| z.get(name))
    }

    /// Iterate over the route's points.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| Point::new(x, y))
    }

    /// First point of the route.
    #[must_use]
    pub fn start(&self) -> Point {
        Point::new(self.x[0], self.y[0])
    }

    /// Last point of the route.
    #[must_use]
    pub fn end(&self) -> Point {
        let last = self.x.len() - 1;
        Point::new(self.x[last], self.y[last])
    }

    /// Total path length (`d` of the last point).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.d[self.d.len() - 1]
    }

    /// Number of points.
    #[must_use]
    pub const fn nr_points(&self) -> usize {
        self.x.len()
    }

    /// Per-point rows of `(x, y, [z...], d)`.
    #[must_use]
    pub fn route(&self) -> Vec<RouteRow> {
        (0..self.nr_points())
            .map(|i| RouteRow {
                x: self.x[i],
                y: self.y[i],
                z: self
                    .z
                    .iter()
                    .flat_map(Channels::iter)
                    .map(|(_, values)| values[i])
                    .collect(),
                d: self.d[i],
            })
            .collect()
    }

    /// Table of columns `x`, `y`, each channel, `d`.
    #[must_use]
    pub fn dataframe(&self) -> RouteTable {
        let mut columns = vec!["x".to_owned(), "y".to_owned()];
        columns.extend(self.z.iter().flat_map(Channels::names).map(str::to_owned));
        columns.push("d".to_owned());

        let rows = self
            .route()
            .into_iter()
            .map(|row| {
                let mut values = Vec::with_capacity(columns.len());
                values.push(row.x);
                values.push(row.y);
                values.extend(row.z);
                values.push(row.d);
                values
            })
            .collect();

        RouteTable { columns, rows }
    }

    /// Axis-aligned bounding box of the coordinates.
    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        let (min_x, max_x) = min_max(&self.x);
        let (min_y, max_y) = min_max(&self.y);
        BoundingBox {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    /// Extent from min x to max x.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bbox().width()
    }

    /// Extent from min y to max y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bbox().height()
    }

    /// `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        let bbox = self.bbox();
        (bbox.width(), bbox.height())
    }

    /// Midpoint of the bounding box (not the centroid of the points).
    #[must_use]
    pub fn center(&self) -> Point {
        self.bbox().center()
    }

    /// Independent duplicate of the route.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Build a route with new coordinates and the same channels.
    pub(crate) fn with_coordinates(&self, x: Vec<f64>, y: Vec<f64>) -> Result<Self, RouteError> {
        Self::new(x, y, self.z.clone())
    }

    /// Build a route by mapping every point, keeping channels.
    pub(crate) fn map_points(&self, f: impl Fn(Point) -> Point) -> Result<Self, RouteError> {
        let (x, y) = self.points().map(f).map(|p| (p.x, p.y)).unzip();
        self.with_coordinates(x, y)
    }

    /// Commit a fully built replacement: overwrite `self` when `inplace`,
    /// otherwise hand it back to the caller.
    pub(crate) fn commit(&mut self, next: Self, inplace: bool) -> Option<Self> {
        if inplace {
            *self = next;
            None
        } else {
            Some(next)
        }
    }
}

/// Validate route inputs.
fn check_inputs(x: &[f64], y: &[f64], z: Option<&Channels>) -> Result<(), RouteError> {
    for (series, values) in [("x", x), ("y", y)] {
        if values.len() < 2 {
            return Err(RouteError::TooFewPoints {
                series: series.to_owned(),
                len: values.len(),
            });
        }
    }

    if x.len() != y.len() {
        return Err(RouteError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }

    if let Some(channels) = z {
        for (name, values) in channels.iter() {
            if Channels::RESERVED_NAMES.iter().any(|&reserved| reserved == name) {
                return Err(RouteError::ReservedChannelName {
                    name: name.to_owned(),
                });
            }
            if values.len() != x.len() {
                return Err(RouteError::ChannelLengthMismatch {
                    name: name.to_owned(),
                    expected: x.len(),
                    len: values.len(),
                });
            }
        }
    }

    let channel_series = z.into_iter().flat_map(Channels::iter);
    for (series, values) in [("x", x), ("y", y)].into_iter().chain(channel_series) {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(RouteError::NonNumeric {
                series: series.to_owned(),
                index,
            });
        }
    }

    Ok(())
}

/// Minimum and maximum of a non-empty slice of finite values.
fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// The five-point route with one channel used across the test suite.
    pub(crate) fn setup() -> Route {
        let z: Channels = [("foo", vec![0.0, 10.0, 40.0, 10.0, 5.0])]
            .into_iter()
            .collect();
        Route::new(
            vec![0.0, 5.0, 15.0, 20.0, 10.0],
            vec![0.0, 10.0, 40.0, 10.0, 5.0],
            Some(z),
        )
        .unwrap()
    }

    pub(crate) fn assert_invariants(route: &Route) {
        let n = route.nr_points();
        assert!(n > 1);
        assert_eq!(route.x().len(), n);
        assert_eq!(route.y().len(), n);
        assert_eq!(route.d().len(), n);
        if let Some(z) = route.z() {
            for (name, values) in z.iter() {
                assert_eq!(values.len(), n, "channel {name}");
            }
        }
        assert!(route.d()[0].abs() < f64::EPSILON);
        assert!(route.d().windows(2).all(|w| w[1] >= w[0]));
    }

    // --- Construction ---

    #[test]
    fn setup_satisfies_invariants() {
        assert_invariants(&setup());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Route::new(vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 5.0, 6.0], None).unwrap_err();
        assert_eq!(err, RouteError::LengthMismatch { x_len: 4, y_len: 3 });

        let err = Route::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0, 7.0], None).unwrap_err();
        assert!(matches!(err, RouteError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_single_item_inputs() {
        let err = Route::new(vec![1.0], vec![4.0, 5.0, 6.0, 7.0], None).unwrap_err();
        assert!(matches!(err, RouteError::TooFewPoints { ref series, len: 1 } if series == "x"));

        let err = Route::new(vec![1.0, 2.0, 3.0, 4.0], vec![4.0], None).unwrap_err();
        assert!(matches!(err, RouteError::TooFewPoints { ref series, len: 1 } if series == "y"));
    }

    #[test]
    fn rejects_channel_named_like_a_column() {
        for name in ["x", "y", "d"] {
            let z: Channels = [(name, vec![8.0, 9.0])].into_iter().collect();
            let err = Route::new(vec![1.0, 2.0], vec![4.0, 5.0], Some(z)).unwrap_err();
            assert_eq!(
                err,
                RouteError::ReservedChannelName {
                    name: name.to_owned()
                }
            );
        }

        let z: Channels = [("dist", vec![8.0, 9.0])].into_iter().collect();
        let route = Route::new(vec![1.0, 2.0], vec![4.0, 5.0], Some(z)).unwrap();
        assert_eq!(route.dataframe().columns, ["x", "y", "dist", "d"]);
    }

    #[test]
    fn rejects_short_channel() {
        let z: Channels = [("foo", vec![8.0, 9.0])].into_iter().collect();
        let err = Route::new(vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 5.0, 6.0, 7.0], Some(z))
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::ChannelLengthMismatch {
                name: "foo".to_owned(),
                expected: 4,
                len: 2,
            }
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = Route::new(vec![1.0, 2.0, f64::NAN], vec![4.0, 5.0, 6.0], None).unwrap_err();
        assert_eq!(
            err,
            RouteError::NonNumeric {
                series: "x".to_owned(),
                index: 2
            }
        );

        let err = Route::new(vec![1.0, 2.0, 3.0], vec![4.0, f64::INFINITY, 6.0], None)
            .unwrap_err();
        assert!(matches!(err, RouteError::NonNumeric { ref series, index: 1 } if series == "y"));

        let z: Channels = [("foo", vec![8.0, f64::NAN, 10.0, 11.0])]
            .into_iter()
            .collect();
        let err = Route::new(vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 5.0, 6.0, 7.0], Some(z))
            .unwrap_err();
        assert!(matches!(err, RouteError::NonNumeric { ref series, index: 1 } if series == "foo"));
    }

    #[test]
    fn empty_channels_become_none() {
        let route = Route::new(vec![0.0, 1.0], vec![0.0, 1.0], Some(Channels::new())).unwrap();
        assert!(route.z().is_none());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Route = serde_json::from_str(r#"{"x": [0.0, 3.0], "y": [0.0, 4.0]}"#).unwrap();
        assert!((ok.length() - 5.0).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<Route>(r#"{"x": [0.0], "y": [0.0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serialize_round_trip_keeps_channels() {
        let route = setup();
        let json = serde_json::to_string(&route).unwrap();
        let back: Route = serde_json::from_str(&json).unwrap();
        assert_eq!(route, back);
    }

    // --- Queries ---

    #[test]
    fn nr_points_matches_x() {
        let r = setup();
        assert_eq!(r.nr_points(), r.x().len());
    }

    #[test]
    fn bbox_of_setup() {
        let b = setup().bbox();
        assert_eq!(b.min, Point::new(0.0, 0.0));
        assert_eq!(b.max, Point::new(20.0, 40.0));
    }

    #[test]
    fn width_height_size() {
        let r = setup();
        assert!((r.width() - 20.0).abs() < f64::EPSILON);
        assert!((r.height() - 40.0).abs() < f64::EPSILON);
        assert_eq!(r.size(), (20.0, 40.0));
    }

    #[test]
    fn center_is_bbox_midpoint() {
        let r = setup();
        assert_eq!(r.center(), Point::new(10.0, 20.0));

        // The centroid of the points would be (10, 13); the bbox midpoint differs.
        let b = r.bbox();
        let c = r.center();
        assert!((c.x - (b.min.x + b.max.x) / 2.0).abs() < f64::EPSILON);
        assert!((c.y - (b.min.y + b.max.y) / 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn start_end_and_length() {
        let r = Route::new(vec![0.0, 3.0, 3.0], vec![0.0, 4.0, 10.0], None).unwrap();
        assert_eq!(r.start(), Point::new(0.0, 0.0));
        assert_eq!(r.end(), Point::new(3.0, 10.0));
        assert!((r.length() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn route_rows_include_channels() {
        let rows = setup().route();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2].x, 15.0);
        assert_eq!(rows[2].y, 40.0);
        assert_eq!(rows[2].z, vec![40.0]);
        assert!(rows[0].d.abs() < f64::EPSILON);
    }

    #[test]
    fn dataframe_columns_and_rows() {
        let r = setup();
        let table = r.dataframe();
        assert_eq!(table.columns, ["x", "y", "foo", "d"]);
        assert_eq!(table.rows.len(), r.nr_points());
        for (row, i) in table.rows.iter().zip(0..) {
            assert_eq!(row.len(), 4);
            assert_eq!(row[0], r.x()[i]);
            assert_eq!(row[1], r.y()[i]);
            assert_eq!(row[3], r.d()[i]);
        }
    }

    #[test]
    fn dataframe_without_channels() {
        let r = Route::new(vec![0.0, 1.0], vec![0.0, 0.0], None).unwrap();
        assert_eq!(r.dataframe().columns, ["x", "y", "d"]);
    }

    #[test]
    fn copy_is_independent() {
        let r = setup();
        let mut copy = r.copy();
        copy.align_to_origin(Point::new(10.0, 10.0), crate::Corner::BottomLeft, true)
            .unwrap();
        assert_ne!(copy.x(), r.x());
        assert_ne!(copy.y(), r.y());
        assert_eq!(r, setup());
    }
}
