//! Route pipeline: a serializable sequence of route operations.
//!
//! A [`RouteConfig`] names the steps to run; [`process`] runs them on a
//! copy of the input in a fixed order:
//!
//! remove duplicates -> smooth -> interpolate -> optimise bbox -> rotate
//! -> mirror -> fit to box -> placement
//!
//! Every step is optional.  A config with nothing set returns an
//! unchanged copy.

use serde::{Deserialize, Serialize};

use crate::dedup::DuplicatePolicy;
use crate::resample::ResampleKind;
use crate::route::Route;
use crate::types::{Corner, Point, RouteError};

/// Parameters for [`Route::smooth`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothStep {
    /// Smoothing factor in `[0, 1)`, or `None` to fit through the
    /// existing points.
    #[serde(default)]
    pub smoothing_factor: Option<f64>,
}

/// Parameters for [`Route::interpolate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolateStep {
    /// Resampling method.
    #[serde(default)]
    pub kind: ResampleKind,
    /// Step distance (`equidistant_steps`) or point count (the others).
    pub num: f64,
}

/// A target box, in route units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

/// Parameters for [`Route::mirror`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorStep {
    /// Reflect y (vertical flip).
    pub about_x: bool,
    /// Reflect x (horizontal flip).
    pub about_y: bool,
    /// Reflect about the coordinate axes instead of the route center.
    pub about_axis: bool,
}

/// Parameters for [`Route::fit_to_box`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitStep {
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Scale both axes by the same factor.
    #[serde(default = "default_keep_aspect")]
    pub keep_aspect: bool,
}

const fn default_keep_aspect() -> bool {
    true
}

/// Final translation of the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// [`Route::center_on_origin`].
    Center {
        /// Where the route center ends up.
        origin: Point,
    },
    /// [`Route::align_to_origin`].
    Align {
        /// Where the corner ends up.
        origin: Point,
        /// Which bounding-box corner is anchored.
        #[serde(default)]
        corner: Corner,
    },
}

/// Steps applied by [`process`].  `None` skips a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Duplicate point removal.
    pub remove_duplicates: Option<DuplicatePolicy>,
    /// Cubic smoothing.
    pub smooth: Option<SmoothStep>,
    /// Resampling.
    pub interpolate: Option<InterpolateStep>,
    /// Rotate to best fit this box's aspect ratio.
    pub optimise_bbox: Option<BoxSize>,
    /// Clockwise rotation in degrees, after any optimiser rotation.
    pub rotate: Option<f64>,
    /// Reflection.
    pub mirror: Option<MirrorStep>,
    /// Scaling into a box.
    pub fit_to_box: Option<FitStep>,
    /// Final translation.
    pub placement: Option<Placement>,
}

/// What [`process`] did, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Points in the input route.
    pub input_points: usize,
    /// Points in the output route.
    pub output_points: usize,
    /// Total length of the input route.
    pub input_length: f64,
    /// Total length of the output route.
    pub output_length: f64,
    /// Rotation chosen by the bounding-box optimiser, if it ran.
    pub bbox_angle: Option<u32>,
}

/// Output of [`process`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// The processed route.
    pub route: Route,
    /// Counts and measurements.
    pub summary: ProcessSummary,
}

/// Run every configured step on a copy of `route`.
///
/// # Errors
///
/// Returns the first [`RouteError`] raised by a step; `route` itself is
/// never modified.
///
/// # Examples
///
/// ```
/// use routely::{DuplicatePolicy, Route, RouteConfig, process};
///
/// let route = Route::new(vec![0.0, 0.0, 4.0], vec![0.0, 0.0, 3.0], None).unwrap();
/// let config = RouteConfig {
///     remove_duplicates: Some(DuplicatePolicy::Consecutive),
///     ..RouteConfig::default()
/// };
/// let result = process(&route, &config).unwrap();
/// assert_eq!(result.summary.output_points, 2);
/// assert_eq!(result.route.length(), 5.0);
/// ```
pub fn process(route: &Route, config: &RouteConfig) -> Result<ProcessResult, RouteError> {
    let mut out = route.copy();
    let mut bbox_angle = None;

    if let Some(policy) = config.remove_duplicates {
        out.remove_duplicates(policy, true)?;
    }
    if let Some(step) = config.smooth {
        out.smooth(step.smoothing_factor, true)?;
    }
    if let Some(step) = config.interpolate {
        out.interpolate(step.kind, step.num, true)?;
    }
    if let Some(size) = config.optimise_bbox {
        let angle = out.best_fit_angle(size.width, size.height)?;
        out.rotate(f64::from(angle), true)?;
        bbox_angle = Some(angle);
    }
    if let Some(angle) = config.rotate {
        out.rotate(angle, true)?;
    }
    if let Some(step) = config.mirror {
        out.mirror(step.about_x, step.about_y, step.about_axis, true)?;
    }
    if let Some(step) = config.fit_to_box {
        out.fit_to_box(step.width, step.height, step.keep_aspect, true)?;
    }
    match config.placement {
        Some(Placement::Center { origin }) => {
            out.center_on_origin(origin, true)?;
        }
        Some(Placement::Align { origin, corner }) => {
            out.align_to_origin(origin, corner, true)?;
        }
        None => {}
    }

    let summary = ProcessSummary {
        input_points: route.nr_points(),
        output_points: out.nr_points(),
        input_length: route.length(),
        output_length: out.length(),
        bbox_angle,
    };
    log::info!(
        "processed route: {} -> {} points, length {:.3} -> {:.3}",
        summary.input_points,
        summary.output_points,
        summary.input_length,
        summary.output_length,
    );
    Ok(ProcessResult {
        route: out,
        summary,
    })
}
