//! Arc-length parameterization of a coordinate sequence.
//!
//! Every route carries a cumulative distance `d` alongside its
//! coordinates: `d[0] = 0` and `d[i] = d[i-1] + |p[i] - p[i-1]|`.  The
//! sequence is always rebuilt from scratch after a coordinate change,
//! since inserting, removing, or moving any point shifts every distance
//! after it.

use crate::types::Point;

/// Euclidean distance between two `(x, y)` points.
///
/// # Examples
///
/// ```
/// use routely::Point;
/// use routely::distance::distance_between_two_points;
///
/// let d = distance_between_two_points(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
/// assert_eq!(d, 5.0);
/// ```
#[must_use]
pub fn distance_between_two_points(p1: Point, p2: Point) -> f64 {
    p1.distance(p2)
}

/// Cumulative distance from the first point to each point of the
/// sequence.
///
/// `x` and `y` are zipped, so the result has `min(x.len(), y.len())`
/// entries.  An empty input yields an empty output.
#[must_use]
pub fn cumulative_distance(x: &[f64], y: &[f64]) -> Vec<f64> {
    let mut d = Vec::with_capacity(x.len().min(y.len()));
    let mut total = 0.0;
    let mut prev: Option<Point> = None;

    for (&px, &py) in x.iter().zip(y) {
        let p = Point::new(px, py);
        if let Some(q) = prev {
            total += distance_between_two_points(q, p);
        }
        d.push(total);
        prev = Some(p);
    }

    d
}

/// Differences between consecutive entries (`d[i+1] - d[i]`).
#[must_use]
pub fn deltas(d: &[f64]) -> Vec<f64> {
    d.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_four_five_triangle() {
        let d = distance_between_two_points(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn evenly_spaced_collinear_points() {
        let x = [0.0, 7.5, 15.0, 22.5, 30.0];
        let y = [0.0; 5];
        let d = cumulative_distance(&x, &y);
        assert_eq!(d.len(), 5);
        for delta in deltas(&d) {
            assert!((delta - 7.5).abs() < 1e-12, "delta {delta}");
        }
    }

    #[test]
    fn diagonal_steps_of_five() {
        let x = [0.0, 3.0, 6.0, 9.0, 12.0];
        let y = [0.0, 4.0, 8.0, 12.0, 16.0];
        let d = cumulative_distance(&x, &y);
        assert!((d[4] - 20.0).abs() < 1e-12);
        assert!((deltas(&d)[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn starts_at_zero_and_never_decreases() {
        let x = [5.0, 5.0, -3.0, 10.0, 10.0];
        let y = [1.0, 1.0, 2.0, -7.0, -7.0];
        let d = cumulative_distance(&x, &y);
        assert!(d[0].abs() < f64::EPSILON);
        assert!(d.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn repeated_point_adds_nothing() {
        let d = cumulative_distance(&[0.0, 1.0, 1.0], &[0.0, 0.0, 0.0]);
        assert!((d[1] - d[2]).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(cumulative_distance(&[], &[]).is_empty());
    }
}
