//! Bounding-box fit: rotate a route to best match a target aspect ratio.
//!
//! The width/height ratio of a rotated route is neither smooth nor
//! monotonic in the angle, so the search is a plain scan over whole
//! degrees from 0 to 90 (clockwise, about the route's center).  One
//! degree is fine enough for fitting a route into a display region.

use crate::route::Route;
use crate::transform::check_box;
use crate::types::{Point, RouteError};

/// Largest angle tried by the search, in degrees.
pub const MAX_ANGLE_DEG: u32 = 90;

impl Route {
    /// Clockwise rotation, in whole degrees from 0 to 90, whose bounding
    /// box best matches the aspect ratio `box_width / box_height`.
    ///
    /// Each candidate is scored by `|width / height - target|` of the
    /// rotated route; the lowest score wins and ties go to the smaller
    /// angle.  Angles where the score is undefined (a route with no extent
    /// at all) never win, so such a route reports 0.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidArgument`] if a box side is not a
    /// positive finite number.
    pub fn best_fit_angle(&self, box_width: f64, box_height: f64) -> Result<u32, RouteError> {
        check_box(box_width, box_height)?;
        let target = box_width / box_height;

        let mut best_angle = 0;
        let mut best_score = f64::INFINITY;
        for angle in 0..=MAX_ANGLE_DEG {
            let (width, height) = extent(self.rotated_points(f64::from(angle)));
            let score = (width / height - target).abs();
            if score < best_score {
                best_score = score;
                best_angle = angle;
            }
        }

        log::debug!(
            "best bbox fit for {box_width}x{box_height}: {best_angle} deg (score {best_score})"
        );
        Ok(best_angle)
    }

    /// Rotate the route by [`best_fit_angle`](Route::best_fit_angle).
    ///
    /// This does not scale the route; follow with
    /// [`fit_to_box`](Route::fit_to_box) to fill the box.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidArgument`] if a box side is not a
    /// positive finite number.
    pub fn optimise_bbox(
        &mut self,
        box_width: f64,
        box_height: f64,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        let angle = self.best_fit_angle(box_width, box_height)?;
        self.rotate(f64::from(angle), inplace)
    }
}

/// `(width, height)` of the bounding box of `points`.
fn extent(points: impl Iterator<Item = Point>) -> (f64, f64) {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x, max_y - min_y)
}
