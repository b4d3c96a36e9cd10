//! Geometric transforms: translation, rotation, mirroring, scaling.
//!
//! Each transform maps every point independently, so point count is
//! preserved and channel data is carried over untouched.  Distance is
//! recomputed afterwards.  All transforms take an `inplace` flag: with
//! `true` the route is rewritten and `Ok(None)` is returned, with `false`
//! the route is left alone and the transformed copy is returned as
//! `Ok(Some(route))`.

use crate::route::Route;
use crate::types::{Corner, Point, RouteError};

/// Rotate `point` counterclockwise about `origin` by `angle` radians.
#[must_use]
pub fn rotate_point(origin: Point, point: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - origin.x;
    let dy = point.y - origin.y;
    Point::new(
        origin.x + cos.mul_add(dx, -(sin * dy)),
        origin.y + sin.mul_add(dx, cos * dy),
    )
}

impl Route {
    /// Translate the route so its [`center`](Route::center) lands on
    /// `new_origin`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NonNumeric`] if the translation overflows.
    pub fn center_on_origin(
        &mut self,
        new_origin: Point,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        let center = self.center();
        let next = self.translate_by(new_origin.x - center.x, new_origin.y - center.y)?;
        Ok(self.commit(next, inplace))
    }

    /// Translate the route so the chosen bounding-box corner lands on
    /// `origin`.
    ///
    /// Use [`Corner::from_str`](std::str::FromStr) to accept the corner
    /// by name.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NonNumeric`] if the translation overflows.
    pub fn align_to_origin(
        &mut self,
        origin: Point,
        corner: Corner,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        let anchor = self.bbox().corner(corner);
        let next = self.translate_by(origin.x - anchor.x, origin.y - anchor.y)?;
        Ok(self.commit(next, inplace))
    }

    /// Rotate the route clockwise by `angle_deg` degrees about its center.
    ///
    /// Channel data is not altered.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidArgument`] if `angle_deg` is not finite.
    pub fn rotate(&mut self, angle_deg: f64, inplace: bool) -> Result<Option<Self>, RouteError> {
        if !angle_deg.is_finite() {
            return Err(RouteError::InvalidArgument(format!(
                "rotation angle must be finite, got {angle_deg}"
            )));
        }
        let (x, y) = self.rotated_points(angle_deg).map(|p| (p.x, p.y)).unzip();
        let next = self.with_coordinates(x, y)?;
        Ok(self.commit(next, inplace))
    }

    /// Points of the route rotated clockwise by `angle_deg` about its
    /// center.
    pub(crate) fn rotated_points(&self, angle_deg: f64) -> impl Iterator<Item = Point> + '_ {
        let center = self.center();
        let rad = -angle_deg.to_radians();
        self.points().map(move |p| rotate_point(center, p, rad))
    }

    /// Mirror the route.
    ///
    /// `about_x` flips the route vertically (reflects y), `about_y` flips
    /// it horizontally (reflects x); both may be combined.  With
    /// `about_axis` the reflection is about the coordinate axes
    /// (`y = 0` / `x = 0`), otherwise about the route's center.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NonNumeric`] if the reflection overflows.
    pub fn mirror(
        &mut self,
        about_x: bool,
        about_y: bool,
        about_axis: bool,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        let c = if about_axis {
            Point::new(0.0, 0.0)
        } else {
            self.center()
        };
        let next = self.map_points(|p| {
            Point::new(
                if about_y { 2.0f64.mul_add(c.x, -p.x) } else { p.x },
                if about_x { 2.0f64.mul_add(c.y, -p.y) } else { p.y },
            )
        })?;
        Ok(self.commit(next, inplace))
    }

    /// Scale the route to fit a `box_width` × `box_height` box.
    ///
    /// With `keep_aspect`, both axes are divided by the same factor
    /// `max(height / box_height, width / box_width)`, so the route fits
    /// inside the box and touches it along the binding dimension.
    /// Without it, x is divided by `width / box_width` and y by
    /// `height / box_height`, so the result fills the box exactly and the
    /// aspect ratio may change.
    ///
    /// Scaling is about the coordinate origin, like a plain division of
    /// the coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidArgument`] if a box side is not a
    /// positive finite number, or if the route has no extent along an
    /// axis that must be scaled.
    pub fn fit_to_box(
        &mut self,
        box_width: f64,
        box_height: f64,
        keep_aspect: bool,
        inplace: bool,
    ) -> Result<Option<Self>, RouteError> {
        check_box(box_width, box_height)?;
        let (width, height) = self.size();

        let (factor_x, factor_y) = if keep_aspect {
            let factor = (height / box_height).max(width / box_width);
            (factor, factor)
        } else {
            ((width / box_width).abs(), (height / box_height).abs())
        };

        for (axis, factor) in [("x", factor_x), ("y", factor_y)] {
            if factor <= 0.0 {
                return Err(RouteError::InvalidArgument(format!(
                    "cannot scale a route with no extent along {axis} to fit a box"
                )));
            }
        }

        let next = self.map_points(|p| Point::new(p.x / factor_x, p.y / factor_y))?;
        Ok(self.commit(next, inplace))
    }

    fn translate_by(&self, dx: f64, dy: f64) -> Result<Self, RouteError> {
        self.map_points(|p| Point::new(p.x + dx, p.y + dy))
    }
}

/// Validate target box dimensions.
pub(crate) fn check_box(box_width: f64, box_height: f64) -> Result<(), RouteError> {
    for (name, value) in [("box_width", box_width), ("box_height", box_height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(RouteError::InvalidArgument(format!(
                "{name} must be a positive number, got {value}"
            )));
        }
    }
    Ok(())
}
