//! Shared types for routely: points, bounding boxes, channels, errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A 2D point in route coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position (+Y up).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned bounding box of a route's coordinate extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower-left corner `(min_x, min_y)`.
    pub min: Point,
    /// Upper-right corner `(max_x, max_y)`.
    pub max: Point,
}

impl BoundingBox {
    /// Extent along the x axis.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along the y axis.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.max.x + self.min.x) / 2.0,
            (self.max.y + self.min.y) / 2.0,
        )
    }

    /// The requested corner of the box.
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::BottomLeft => self.min,
            Corner::TopRight => self.max,
            Corner::BottomRight => Point::new(self.max.x, self.min.y),
            Corner::TopLeft => Point::new(self.min.x, self.max.y),
        }
    }
}

/// A bounding-box corner, used by
/// [`Route::align_to_origin`](crate::Route::align_to_origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    /// `(min_x, min_y)`.
    #[default]
    BottomLeft,
    /// `(max_x, min_y)`.
    BottomRight,
    /// `(min_x, max_y)`.
    TopLeft,
    /// `(max_x, max_y)`.
    TopRight,
}

impl Corner {
    /// Every corner, in the order used by error messages.
    pub const ALL: [Self; 4] = [
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopLeft,
        Self::TopRight,
    ];

    /// The configuration spelling of this corner.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BottomLeft => "bottomleft",
            Self::BottomRight => "bottomright",
            Self::TopLeft => "topleft",
            Self::TopRight => "topright",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corner {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RouteError::unknown_option("align_corner", s, Self::ALL.map(Self::as_str)))
    }
}

/// A named, position-aligned data series attached to a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel name (e.g. `"elevation"`).
    pub name: String,
    /// One value per route point.
    pub values: Vec<f64>,
}

/// Ordered collection of named channels ("z" data).
///
/// Insertion order is kept for display. Names are unique: inserting an
/// existing name replaces its values in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channels(Vec<Channel>);

impl Channels {
    /// Column names of [`Route::dataframe`](crate::Route::dataframe) that
    /// no channel may take.
    pub const RESERVED_NAMES: [&str; 3] = ["x", "y", "d"];

    /// Create an empty channel collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a channel, replacing the values of an existing channel with
    /// the same name.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        if let Some(existing) = self.0.iter_mut().find(|c| c.name == name) {
            existing.values = values;
        } else {
            self.0.push(Channel { name, values });
        }
    }

    /// Values of the named channel, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.0
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Number of channels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no channels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Channel names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    /// `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.0.iter().map(|c| (c.name.as_str(), c.values.as_slice()))
    }

    /// Build a new collection with the same names, deriving each
    /// channel's values from the old ones.
    pub(crate) fn map_values(&self, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> Self {
        Self(
            self.0
                .iter()
                .map(|c| Channel {
                    name: c.name.clone(),
                    values: f(&c.values),
                })
                .collect(),
        )
    }

    /// Like [`map_values`](Self::map_values) for derivations that can fail.
    pub(crate) fn try_map_values(
        &self,
        mut f: impl FnMut(&[f64]) -> Result<Vec<f64>, RouteError>,
    ) -> Result<Self, RouteError> {
        self.0
            .iter()
            .map(|c| {
                Ok(Channel {
                    name: c.name.clone(),
                    values: f(&c.values)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for Channels {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f64>)>>(iter: I) -> Self {
        let mut channels = Self::new();
        for (name, values) in iter {
            channels.insert(name, values);
        }
        channels
    }
}

/// Errors raised by route construction and route operations.
///
/// Every failure is surfaced eagerly, before any route data is
/// overwritten, so an operation that errors leaves its route untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum RouteError {
    /// A coordinate series has fewer than 2 entries.
    #[error("route input '{series}' must contain more than 1 item, got {len}")]
    TooFewPoints {
        /// `"x"` or `"y"`.
        series: String,
        /// Number of entries supplied.
        len: usize,
    },

    /// `x` and `y` differ in length.
    #[error("route inputs 'x' and 'y' must be of equal length, got {x_len} and {y_len}")]
    LengthMismatch {
        /// Length of `x`.
        x_len: usize,
        /// Length of `y`.
        y_len: usize,
    },

    /// A channel's length differs from the coordinate length.
    #[error("route channel '{name}' must be of equal length to 'x' and 'y' ({expected}), got {len}")]
    ChannelLengthMismatch {
        /// Channel name.
        name: String,
        /// Length of `x`/`y`.
        expected: usize,
        /// Length of the channel.
        len: usize,
    },

    /// An entry is not a real number (NaN, infinite, or not a number at
    /// all when loaded from text).
    #[error("route input '{series}' must contain only real numbers, entry {index} is not")]
    NonNumeric {
        /// `"x"`, `"y"`, or the channel name.
        series: String,
        /// Position of the offending entry.
        index: usize,
    },

    /// An enumerated option received an unrecognised value.
    #[error("'{value}' is not a recognised value for '{parameter}', choose one of: {}", .valid.join(", "))]
    UnknownOption {
        /// Parameter name (`kind`, `duplicates`, `align_corner`).
        parameter: String,
        /// The rejected value.
        value: String,
        /// Accepted spellings.
        valid: Vec<String>,
    },

    /// Cubic reconstruction needs a strictly increasing distance table.
    #[error(
        "cubic interpolation requires strictly increasing distances, entry {index} does not increase (remove duplicate points first)"
    )]
    NotStrictlyIncreasing {
        /// First index whose distance is not greater than its predecessor.
        index: usize,
    },

    /// A channel uses a name that the route table reserves for its own
    /// columns.
    #[error("route channel name '{name}' is reserved, channels may not be named {}", Channels::RESERVED_NAMES.join(", "))]
    ReservedChannelName {
        /// Channel name.
        name: String,
    },

    /// A numeric argument is out of its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RouteError {
    pub(crate) fn unknown_option<const N: usize>(
        parameter: &str,
        value: &str,
        valid: [&str; N],
    ) -> Self {
        Self::UnknownOption {
            parameter: parameter.to_owned(),
            value: value.to_owned(),
            valid: valid.iter().map(|&v| v.to_owned()).collect(),
        }
    }
}
