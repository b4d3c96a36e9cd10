//! routely: 2D routes with arc-length parameterization.
//!
//! A [`Route`] is an ordered sequence of `(x, y)` coordinates with
//! optional named channels ("z" data) aligned to each point, plus the
//! cumulative distance `d` along the route, which is recomputed after
//! every coordinate change.
//!
//! Operations:
//!
//! - geometric transforms: center/align on an origin, rotate, mirror,
//!   fit to a box;
//! - resampling against `d`: equidistant or fixed-count linear steps, or
//!   cubic-spline reconstruction, and cubic smoothing;
//! - duplicate removal under two adjacency policies;
//! - bounding-box optimisation: the rotation best matching a target
//!   aspect ratio.
//!
//! Every operation takes an `inplace` flag and returns
//! `Result<Option<Route>, RouteError>`: `Ok(None)` after rewriting the
//! route in place, `Ok(Some(new))` otherwise.  Errors are raised before
//! anything is overwritten.
//!
//! This crate has **no I/O dependencies**.  File loading, CSV/SVG export
//! and the command line live in `routely-export` and `routely-cli`.

pub mod dedup;
pub mod distance;
pub mod interpolate;
pub mod optimize;
pub mod pipeline;
pub mod resample;
pub mod route;
pub mod transform;
pub mod types;

pub use dedup::DuplicatePolicy;
pub use distance::{cumulative_distance, distance_between_two_points};
pub use pipeline::{
    BoxSize, FitStep, InterpolateStep, MirrorStep, Placement, ProcessResult, ProcessSummary,
    RouteConfig, SmoothStep, process,
};
pub use resample::{MAX_RESAMPLE_POINTS, ResampleKind, SMOOTH_SAMPLES};
pub use route::{Route, RouteData, RouteRow, RouteTable};
pub use transform::rotate_point;
pub use types::{BoundingBox, Channel, Channels, Corner, Point, RouteError};
