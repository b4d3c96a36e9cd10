//! SVG plot serializer.
//!
//! Renders a route as an SVG string using the [`svg`] crate for document
//! construction, XML escaping, and path data formatting:
//!
//! - [`to_svg`] plots the route itself (x against y) as a single
//!   `<path>` using `M` (move to) and `L` (line to) commands;
//! - [`to_channel_svg`] plots each channel against the distance `d`, one
//!   stacked panel per channel.
//!
//! Route coordinates have +Y up; SVG has +Y down, so y is flipped when
//! mapping into the document.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! These are pure functions with no I/O -- they return a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use routely::{Point, Route};

/// Extra space around the route for [`SvgOptions::equal_lims`], as a
/// fraction of the half-extent.
pub const EQUAL_LIMS_MARGIN: f64 = 0.1;

/// Padding on each side of the data when limits are not equal, as a
/// fraction of the data span.
const PADDING_FRACTION: f64 = 0.05;

/// Width over height of one channel panel.
const PANEL_ASPECT: f64 = 3.0;

/// Marker radius in pixels.
const MARKER_RADIUS_PX: f64 = 2.5;

/// Font size of channel panel labels, in pixels.
const LABEL_FONT_PX: f64 = 12.0;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional.  When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source file name (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Plot appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgOptions {
    /// Draw a circle at every route point.
    pub markers: bool,

    /// Use the same extent for both axes, centered on the route center
    /// with [`EQUAL_LIMS_MARGIN`] of headroom.  Otherwise the limits hug
    /// the data.
    pub equal_lims: bool,

    /// Width of the document in pixels.  Route plots scale the height to
    /// keep the aspect ratio; channel plots stack panels of
    /// `size_px / 3` pixels.
    pub size_px: u32,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            markers: true,
            equal_lims: true,
            size_px: 600,
        }
    }
}

/// Data-space rectangle mapped onto a pixel-space rectangle.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width_px: f64,
    height_px: f64,
    top_px: f64,
}

impl Frame {
    /// Map a data point into the document, flipping y.
    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = (x - self.x_min) / (self.x_max - self.x_min) * self.width_px;
        let sy = (self.y_max - y) / (self.y_max - self.y_min) * self.height_px;
        (sx, self.top_px + sy)
    }
}

/// `(lo, hi)` padded by [`PADDING_FRACTION`]; a zero span becomes
/// `(lo - 1, hi + 1)` so the axis stays usable.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 {
        let pad = span * PADDING_FRACTION;
        (lo - pad, hi + pad)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

/// Data limits for the route plot.
fn route_limits(route: &Route, equal_lims: bool) -> (f64, f64, f64, f64) {
    if equal_lims {
        let c = route.center();
        let (width, height) = route.size();
        let mut lim = width.max(height) / 2.0 * (1.0 + EQUAL_LIMS_MARGIN);
        if lim <= 0.0 {
            lim = 1.0;
        }
        (c.x - lim, c.x + lim, c.y - lim, c.y + lim)
    } else {
        let bbox = route.bbox();
        let (x_min, x_max) = padded(bbox.min.x, bbox.max.x);
        let (y_min, y_max) = padded(bbox.min.y, bbox.max.y);
        (x_min, x_max, y_min, y_max)
    }
}

/// Build an SVG path `d` attribute string from a sequence of points.
///
/// Uses `M` for the first point and `L` for subsequent points, with
/// coordinates taken as-is.  Returns an empty string for fewer than 2
/// points.
///
/// Coordinates are formatted by the [`svg`] crate using `f32` precision.
///
/// # Examples
///
/// ```
/// use routely::Point;
/// use routely_export::build_path_data;
///
/// let d = build_path_data(&[Point::new(10.0, 20.0), Point::new(30.0, 40.0)]);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point]) -> String {
    build_projected_path(points.iter().map(|p| (p.x, p.y)))
}

fn build_projected_path(mut points: impl Iterator<Item = (f64, f64)>) -> String {
    let Some(first) = points.next() else {
        return String::new();
    };
    let mut data = Data::new().move_to(first);
    let mut segments = 0;
    for p in points {
        data = data.line_to(p);
        segments += 1;
    }
    if segments == 0 {
        return String::new();
    }
    String::from(Value::from(data))
}

fn with_metadata(mut doc: Document, metadata: &SvgMetadata<'_>) -> Document {
    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }
    doc
}

fn line(d: String) -> Path {
    Path::new()
        .set("d", d)
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1)
}

fn markers(points: impl Iterator<Item = (f64, f64)>) -> Group {
    points.fold(Group::new().set("fill", "black"), |group, (cx, cy)| {
        group.add(
            Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", MARKER_RADIUS_PX),
        )
    })
}

fn finish(doc: &Document) -> String {
    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Plot the route (x against y) as an SVG document.
///
/// The plot has equal scale on both axes, so the document height follows
/// from [`SvgOptions::size_px`] and the aspect ratio of the limits.
///
/// # Examples
///
/// ```
/// use routely::Route;
/// use routely_export::{SvgMetadata, SvgOptions, to_svg};
///
/// let route = Route::new(vec![0.0, 10.0], vec![0.0, 10.0], None).unwrap();
/// let metadata = SvgMetadata {
///     title: Some("diagonal"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&route, &SvgOptions::default(), &metadata);
/// assert!(svg.contains("<title>diagonal</title>"));
/// assert!(svg.contains("<path"));
/// ```
#[must_use]
pub fn to_svg(route: &Route, options: &SvgOptions, metadata: &SvgMetadata<'_>) -> String {
    let (x_min, x_max, y_min, y_max) = route_limits(route, options.equal_lims);
    let width_px = f64::from(options.size_px.max(1));
    let height_px = width_px * (y_max - y_min) / (x_max - x_min);
    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        width_px,
        height_px,
        top_px: 0.0,
    };

    let doc = Document::new()
        .set("width", width_px)
        .set("height", height_px)
        .set("viewBox", (0.0, 0.0, width_px, height_px));
    let mut doc = with_metadata(doc, metadata);

    let projected = move || route.points().map(move |p| frame.project(p.x, p.y));
    doc = doc.add(line(build_projected_path(projected())));
    if options.markers {
        doc = doc.add(markers(projected()));
    }

    finish(&doc)
}

/// Plot every channel against the distance `d`, one panel per channel,
/// stacked top to bottom in channel order with a shared d-axis.
///
/// Each panel is labelled with its channel name.  Returns `None` when
/// the route has no channels.
#[must_use]
pub fn to_channel_svg(
    route: &Route,
    options: &SvgOptions,
    metadata: &SvgMetadata<'_>,
) -> Option<String> {
    let channels = route.z()?;
    if channels.is_empty() {
        return None;
    }

    let width_px = f64::from(options.size_px.max(1));
    let panel_px = width_px / PANEL_ASPECT;
    #[allow(clippy::cast_precision_loss)]
    let height_px = panel_px * channels.len() as f64;
    let (d_min, d_max) = padded(0.0, route.length());

    let doc = Document::new()
        .set("width", width_px)
        .set("height", height_px)
        .set("viewBox", (0.0, 0.0, width_px, height_px));
    let mut doc = with_metadata(doc, metadata);

    for (i, (name, values)) in channels.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let top_px = panel_px * i as f64;
        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let (y_min, y_max) = padded(lo, hi);
        let frame = Frame {
            x_min: d_min,
            x_max: d_max,
            y_min,
            y_max,
            width_px,
            height_px: panel_px,
            top_px,
        };

        let projected = move || {
            route
                .d()
                .iter()
                .zip(values)
                .map(move |(&d, &v)| frame.project(d, v))
        };

        let mut label = Element::new("text");
        label.assign("x", 4);
        label.assign("y", top_px + LABEL_FONT_PX + 2.0);
        label.assign("font-size", LABEL_FONT_PX);
        label.append(Text::new(name));

        let mut panel = Group::new()
            .set("id", format!("channel-{i}"))
            .add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", top_px)
                    .set("width", width_px)
                    .set("height", panel_px)
                    .set("fill", "none")
                    .set("stroke", "#cccccc"),
            )
            .add(label)
            .add(line(build_projected_path(projected())));
        if options.markers {
            panel = panel.add(markers(projected()));
        }
        doc = doc.add(panel);
    }

    Some(finish(&doc))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use routely::Channels;

    use super::*;

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn plain() -> SvgOptions {
        SvgOptions {
            markers: false,
            ..SvgOptions::default()
        }
    }

    fn square() -> Route {
        Route::new(
            vec![0.0, 10.0, 10.0, 0.0, 0.0],
            vec![0.0, 0.0, 10.0, 10.0, 0.0],
            None,
        )
        .unwrap()
    }

    fn with_channels() -> Route {
        let z: Channels = [
            ("speed", vec![1.0, 2.0, 3.0]),
            ("elevation", vec![100.0, 90.0, 95.0]),
        ]
        .into_iter()
        .collect();
        Route::new(vec![0.0, 3.0, 6.0], vec![0.0, 4.0, 8.0], Some(z)).unwrap()
    }

    // --- build_path_data ---

    #[test]
    fn build_path_data_empty() {
        assert_eq!(build_path_data(&[]), "");
    }

    #[test]
    fn build_path_data_single_point() {
        assert_eq!(build_path_data(&[Point::new(5.0, 5.0)]), "");
    }

    #[test]
    fn build_path_data_three_points() {
        let d = build_path_data(&[
            Point::new(10.0, 15.0),
            Point::new(12.5, 18.3),
            Point::new(14.0, 20.1),
        ]);
        assert!(d.starts_with("M10,15 L12.5,"));
        assert!(d.contains("L14,"));
    }

    // --- Route plot ---

    #[test]
    fn route_plot_is_a_complete_document() {
        let svg = to_svg(&square(), &plain(), &no_meta());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(!svg.contains("<circle"));
    }

    /// Coordinates of the first `<path>` in `svg`, flattened.
    fn path_coords(svg: &str) -> Vec<f64> {
        let start = svg.find("d=\"M").unwrap() + 3;
        let rest = &svg[start..];
        rest[..rest.find('"').unwrap()]
            .split(['M', 'L', ',', ' '])
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().unwrap())
            .collect()
    }

    #[test]
    fn equal_lims_give_square_document() {
        // 10 x 10 square: limits 5 +/- 5.5 on both axes, so 11 units map
        // onto 600 px and the first point sits 0.5 units in from the
        // left and bottom edges.
        let svg = to_svg(&square(), &plain(), &no_meta());
        assert!(svg.contains(r#"width="600""#));
        assert!(svg.contains(r#"height="600""#));
        let coords = path_coords(&svg);
        let inset = 0.5 / 11.0 * 600.0;
        assert!((coords[0] - inset).abs() < 1e-3, "{coords:?}");
        assert!((coords[1] - (600.0 - inset)).abs() < 1e-3, "{coords:?}");
    }

    #[test]
    fn y_axis_points_up() {
        // A route going straight up must move toward smaller SVG y.
        let route = Route::new(vec![0.0, 0.0], vec![0.0, 10.0], None).unwrap();
        let coords = path_coords(&to_svg(&route, &plain(), &no_meta()));
        assert_eq!(coords.len(), 4);
        assert!(coords[3] < coords[1], "{coords:?}");
    }

    #[test]
    fn unequal_lims_follow_route_aspect() {
        let route = Route::new(vec![0.0, 20.0], vec![0.0, 10.0], None).unwrap();
        let options = SvgOptions {
            equal_lims: false,
            ..plain()
        };
        let svg = to_svg(&route, &options, &no_meta());
        // Spans 22 x 11 after padding, so 600 x 300 px.
        assert!(svg.contains(r#"height="300""#), "{svg}");
    }

    #[test]
    fn degenerate_route_still_renders() {
        let route = Route::new(vec![1.0, 1.0], vec![1.0, 1.0], None).unwrap();
        let svg = to_svg(&route, &plain(), &no_meta());
        assert!(!svg.contains("NaN"));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn markers_add_one_circle_per_point() {
        let options = SvgOptions::default();
        let svg = to_svg(&square(), &options, &no_meta());
        assert_eq!(svg.matches("<circle").count(), 5);
    }

    // --- Metadata ---

    #[test]
    fn title_and_desc_emitted() {
        let meta = SvgMetadata {
            title: Some("loop"),
            description: Some("smoothed, factor 0.5"),
        };
        let svg = to_svg(&square(), &plain(), &meta);
        assert!(svg.contains("<title>loop</title>"));
        assert!(svg.contains("<desc>smoothed, factor 0.5</desc>"));
        let title_pos = svg.find("<title>").unwrap();
        let path_pos = svg.find("<path").unwrap();
        assert!(title_pos < path_pos);
    }

    #[test]
    fn title_and_desc_omitted_when_none() {
        let svg = to_svg(&square(), &plain(), &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
    }

    #[test]
    fn special_characters_in_title_are_escaped() {
        let meta = SvgMetadata {
            title: Some("a<b>&c"),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&square(), &plain(), &meta);
        assert!(svg.contains("a&lt;b&gt;&amp;c"));
    }

    // --- Channel plot ---

    #[test]
    fn channel_plot_none_without_channels() {
        assert!(to_channel_svg(&square(), &plain(), &no_meta()).is_none());
    }

    #[test]
    fn channel_plot_has_a_panel_per_channel() {
        let svg = to_channel_svg(&with_channels(), &plain(), &no_meta()).unwrap();
        assert!(svg.contains(r#"id="channel-0""#));
        assert!(svg.contains(r#"id="channel-1""#));
        assert!(!svg.contains(r#"id="channel-2""#));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains(">speed</text>"));
        assert!(svg.contains(">elevation</text>"));
        assert!(svg.find("speed").unwrap() < svg.find("elevation").unwrap());
        // Two 600 x 200 panels.
        assert!(svg.contains(r#"height="400""#));
    }

    #[test]
    fn channel_plot_markers() {
        let svg = to_channel_svg(&with_channels(), &SvgOptions::default(), &no_meta()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 6);
    }

    #[test]
    fn flat_channel_does_not_produce_nan() {
        let z: Channels = [("flat", vec![7.0, 7.0])].into_iter().collect();
        let route = Route::new(vec![0.0, 1.0], vec![0.0, 0.0], Some(z)).unwrap();
        let svg = to_channel_svg(&route, &plain(), &no_meta()).unwrap();
        assert!(!svg.contains("NaN"));
    }
}
