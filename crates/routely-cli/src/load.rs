//! Route loading from JSON, CSV and GPX files.
//!
//! JSON and CSV carry columns by name: `x` and `y` are required, every
//! other numeric column becomes a channel in file order.  A `d` column is
//! skipped since distance is always recomputed.
//!
//! GPX track points are projected to web mercator (EPSG:3857) metres, so
//! `d` comes out in metres too.

use std::f64::consts::FRAC_PI_4;
use std::io::Read;
use std::path::{Path, PathBuf};

use routely::{Channels, Route, RouteError};
use serde_json::Value;

/// Errors raised while loading a route.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Input path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The JSON text is malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV text is malformed (e.g. ragged rows).
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The GPX text is not well-formed XML.
    #[error("invalid GPX: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A GPX track point lacks a usable `lat` or `lon` attribute.
    #[error("GPX track point {index} has no valid '{attr}' attribute")]
    BadCoordinate {
        /// Attribute name.
        attr: &'static str,
        /// Track point index in document order.
        index: usize,
    },

    /// The data does not form a valid route.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A required column is absent.
    #[error("input has no '{0}' column")]
    MissingColumn(&'static str),

    /// The JSON document is not an object of arrays.
    #[error("JSON input must be an object mapping column names to arrays")]
    NotAnObject,
}

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// An object of named arrays.
    Json,
    /// A header row of column names, then one row per point.
    Csv,
    /// GPS exchange format; track points in document order.
    Gpx,
}

impl InputFormat {
    /// Guess the format from a file extension; anything but `.csv` or
    /// `.gpx` is treated as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            Some(ext) if ext.eq_ignore_ascii_case("gpx") => Self::Gpx,
            _ => Self::Json,
        }
    }
}

/// Load a route from `path`, picking the format from its extension.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or does not hold a
/// valid route.
pub fn load_route(path: &Path) -> Result<Route, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let route = match InputFormat::from_path(path) {
        InputFormat::Json => route_from_json(&text)?,
        InputFormat::Csv => route_from_csv(text.as_bytes())?,
        InputFormat::Gpx => route_from_gpx(&text)?,
    };
    log::info!(
        "loaded {} points and {} channels from {}",
        route.nr_points(),
        route.z().map_or(0, Channels::len),
        path.display(),
    );
    Ok(route)
}

/// Parse a route from a JSON object such as
/// `{"x": [...], "y": [...], "speed": [...]}`.
///
/// Non-array values are skipped with a warning.
///
/// # Errors
///
/// - [`LoadError::Json`] for malformed JSON.
/// - [`LoadError::NotAnObject`] if the top level is not an object, or
///   `x`/`y` is not an array.
/// - [`LoadError::MissingColumn`] if `x` or `y` is absent.
/// - [`LoadError::Route`] with [`RouteError::NonNumeric`] if an array
///   holds anything but numbers, or with another [`RouteError`] if the
///   columns do not form a valid route.
pub fn route_from_json(text: &str) -> Result<Route, LoadError> {
    let Value::Object(map) = serde_json::from_str(text)? else {
        return Err(LoadError::NotAnObject);
    };

    let column = |key: &'static str| -> Result<Vec<f64>, LoadError> {
        match map.get(key) {
            Some(Value::Array(items)) => Ok(numbers(key, items)?),
            Some(_) => Err(LoadError::NotAnObject),
            None => Err(LoadError::MissingColumn(key)),
        }
    };
    let x = column("x")?;
    let y = column("y")?;

    let mut channels = Channels::new();
    for (key, value) in &map {
        match (key.as_str(), value) {
            ("x" | "y", _) => {}
            ("d", _) => log::debug!("ignoring 'd' column, distance is recomputed"),
            (_, Value::Array(items)) => channels.insert(key.as_str(), numbers(key, items)?),
            _ => log::warn!("skipping '{key}': not an array"),
        }
    }

    Ok(Route::new(x, y, Some(channels))?)
}

fn numbers(series: &str, items: &[Value]) -> Result<Vec<f64>, RouteError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_f64().ok_or_else(|| RouteError::NonNumeric {
                series: series.to_owned(),
                index,
            })
        })
        .collect()
}

/// Parse a route from CSV with a header row.
///
/// # Errors
///
/// - [`LoadError::Csv`] for malformed CSV.
/// - [`LoadError::MissingColumn`] if there is no `x` or `y` column.
/// - [`LoadError::Route`] with [`RouteError::NonNumeric`] naming the
///   column and row of the first field that is not a number, or with
///   another [`RouteError`] if the columns do not form a valid route.
pub fn route_from_csv(reader: impl Read) -> Result<Route, LoadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

    let position = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let x_col = position("x")?;
    let y_col = position("y")?;

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            let value = field.parse::<f64>().map_err(|_| RouteError::NonNumeric {
                series: headers[col].clone(),
                index: row,
            })?;
            columns[col].push(value);
        }
    }

    let mut channels = Channels::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (col, (name, values)) in headers.iter().zip(columns).enumerate() {
        if col == x_col {
            x = values;
        } else if col == y_col {
            y = values;
        } else if name == "d" {
            log::debug!("ignoring 'd' column, distance is recomputed");
        } else {
            channels.insert(name.as_str(), values);
        }
    }

    Ok(Route::new(x, y, Some(channels))?)
}

/// WGS84 semi-major axis used by web mercator, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Largest latitude web mercator covers, in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Channel holding GPX `<ele>` values.
pub const ELEVATION_CHANNEL: &str = "e";

/// Project a WGS84 latitude/longitude in degrees to web mercator `(x, y)`
/// in metres.
#[must_use]
pub fn web_mercator(lat: f64, lon: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Parse a route from the `<trkpt>` elements of a GPX document, across
/// all tracks and segments in document order.
///
/// Elevation becomes the [`ELEVATION_CHANNEL`] channel when every point
/// has an `<ele>`; otherwise it is dropped with a warning.
///
/// # Errors
///
/// - [`LoadError::Xml`] for malformed XML.
/// - [`LoadError::BadCoordinate`] if a track point's `lat` is missing or
///   beyond [`MAX_LATITUDE`], or its `lon` is missing or outside
///   -180..=180.
/// - [`LoadError::Route`] if there are fewer than two track points.
pub fn route_from_gpx(text: &str) -> Result<Route, LoadError> {
    let doc = roxmltree::Document::parse(text)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut elevation = Vec::new();
    let track_points = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "trkpt");
    for (index, node) in track_points.enumerate() {
        let lat =
            degrees(&node, "lat", MAX_LATITUDE).ok_or(LoadError::BadCoordinate { attr: "lat", index })?;
        let lon =
            degrees(&node, "lon", 180.0).ok_or(LoadError::BadCoordinate { attr: "lon", index })?;
        let (px, py) = web_mercator(lat, lon);
        x.push(px);
        y.push(py);

        let ele = node
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "ele")
            .and_then(|n| n.text())
            .and_then(|t| t.trim().parse::<f64>().ok());
        elevation.push(ele);
    }
    log::debug!("read {} GPX track points", x.len());

    let channels: Option<Channels> = if elevation.iter().all(Option::is_some) && !elevation.is_empty() {
        let values: Vec<f64> = elevation.into_iter().flatten().collect();
        Some([(ELEVATION_CHANNEL, values)].into_iter().collect())
    } else {
        if elevation.iter().any(Option::is_some) {
            log::warn!("dropping GPX elevation, some track points have none");
        }
        None
    };

    Ok(Route::new(x, y, channels)?)
}

fn degrees(node: &roxmltree::Node<'_, '_>, attr: &str, limit: f64) -> Option<f64> {
    node.attribute(attr)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.abs() <= limit)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn json_channels_keep_file_order() {
        let route = route_from_json(
            r#"{"y": [0, 4], "x": [0, 3], "speed": [1, 2], "d": [9, 9], "elevation": [5.5, 6]}"#,
        )
        .unwrap();
        assert_eq!(route.x(), &[0.0, 3.0]);
        assert_eq!(route.d(), &[0.0, 5.0]);
        let names: Vec<&str> = route.z().unwrap().names().collect();
        assert_eq!(names, ["speed", "elevation"]);
    }

    #[test]
    fn json_without_channels_has_none() {
        let route = route_from_json(r#"{"x": [0, 1], "y": [0, 1], "name": "track"}"#).unwrap();
        assert!(route.z().is_none());
    }

    #[test]
    fn json_string_entry_is_non_numeric() {
        let err = route_from_json(r#"{"x": [1, 2, "a"], "y": [4, 5, 6]}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Route(RouteError::NonNumeric { ref series, index: 2 }) if series == "x"
        ));

        let err = route_from_json(r#"{"x": [1, 2], "y": [4, 5], "foo": [null, 1]}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Route(RouteError::NonNumeric { ref series, index: 0 }) if series == "foo"
        ));
    }

    #[test]
    fn json_missing_or_wrong_shape() {
        assert!(matches!(
            route_from_json(r#"{"x": [1, 2]}"#),
            Err(LoadError::MissingColumn("y"))
        ));
        assert!(matches!(
            route_from_json("[1, 2, 3]"),
            Err(LoadError::NotAnObject)
        ));
        assert!(matches!(route_from_json("{"), Err(LoadError::Json(_))));
    }

    #[test]
    fn json_length_mismatch_surfaces_route_error() {
        let err = route_from_json(r#"{"x": [1, 2, 3, 4], "y": [4, 5, 6]}"#).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Route(RouteError::LengthMismatch { x_len: 4, y_len: 3 })
        ));
    }

    #[test]
    fn csv_columns_by_header() {
        let text = "speed, y, x, d\n1, 0, 0, 0\n2, 4, 3, 5\n";
        let route = route_from_csv(text.as_bytes()).unwrap();
        assert_eq!(route.x(), &[0.0, 3.0]);
        assert_eq!(route.y(), &[0.0, 4.0]);
        assert_eq!(route.channel("speed"), Some([1.0, 2.0].as_slice()));
        assert_eq!(route.z().unwrap().len(), 1);
    }

    #[test]
    fn csv_bad_field_names_column_and_row() {
        let text = "x,y,hr\n0,0,100\n1,1,fast\n";
        let err = route_from_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Route(RouteError::NonNumeric { ref series, index: 1 }) if series == "hr"
        ));
    }

    #[test]
    fn csv_missing_column() {
        let err = route_from_csv("x,z\n0,0\n1,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("y")));
    }

    #[test]
    fn csv_ragged_rows_are_rejected() {
        let err = route_from_csv("x,y\n0,0\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn load_route_picks_format_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x,y\n0,0\n0,2").unwrap();
        let route = load_route(file.path()).unwrap();
        assert!((route.length() - 2.0).abs() < 1e-12);

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"x": [0, 1], "y": [0, 0]}}"#).unwrap();
        let route = load_route(file.path()).unwrap();
        assert_eq!(route.nr_points(), 2);
    }

    #[test]
    fn csv_second_x_column_is_reserved() {
        let err = route_from_csv("x,y,x\n0,0,1\n1,1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Route(RouteError::ReservedChannelName { ref name }) if name == "x"
        ));
    }

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="10" lon="10"><name>ignored</name></wpt>
  <trk>
    <name>loop</name>
    <trkseg>
      <trkpt lat="0" lon="0"><ele>12.5</ele></trkpt>
      <trkpt lat="0" lon="1"><ele>13</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="45.0" lon="1"><ele>20</ele></trkpt>
    </trkseg>
  </trk>
</gpx>
"#;

    #[test]
    fn gpx_track_points_project_to_web_mercator() {
        let route = route_from_gpx(TRACK).unwrap();
        assert_eq!(route.nr_points(), 3);

        let one_degree = EARTH_RADIUS * std::f64::consts::PI / 180.0;
        assert!(route.x()[0].abs() < 1e-6);
        assert!(route.y()[0].abs() < 1e-6);
        assert!((route.x()[1] - one_degree).abs() < 1e-6);
        assert!((route.x()[1] - 111_319.490_793).abs() < 1e-3);
        assert!((route.y()[2] - 5_621_521.486_192).abs() < 1e-3);
        assert!((route.d()[1] - one_degree).abs() < 1e-6);

        assert_eq!(
            route.channel(ELEVATION_CHANNEL),
            Some([12.5, 13.0, 20.0].as_slice())
        );
    }

    #[test]
    fn gpx_partial_elevation_is_dropped() {
        let text = r#"<gpx><trk><trkseg>
            <trkpt lat="0" lon="0"><ele>1</ele></trkpt>
            <trkpt lat="0" lon="1"/>
        </trkseg></trk></gpx>"#;
        let route = route_from_gpx(text).unwrap();
        assert_eq!(route.nr_points(), 2);
        assert!(route.z().is_none());
    }

    #[test]
    fn gpx_bad_coordinates() {
        let text = r#"<gpx><trk><trkseg>
            <trkpt lat="0" lon="0"/>
            <trkpt lat="north" lon="1"/>
        </trkseg></trk></gpx>"#;
        assert!(matches!(
            route_from_gpx(text),
            Err(LoadError::BadCoordinate { attr: "lat", index: 1 })
        ));

        let text = r#"<gpx><trk><trkseg><trkpt lat="0"/><trkpt lat="0" lon="1"/></trkseg></trk></gpx>"#;
        assert!(matches!(
            route_from_gpx(text),
            Err(LoadError::BadCoordinate { attr: "lon", index: 0 })
        ));

        let text = r#"<gpx><trk><trkseg><trkpt lat="0" lon="190"/><trkpt lat="0" lon="1"/></trkseg></trk></gpx>"#;
        assert!(matches!(
            route_from_gpx(text),
            Err(LoadError::BadCoordinate { attr: "lon", index: 0 })
        ));

        let text = r#"<gpx><trk><trkseg><trkpt lat="0" lon="0"/><trkpt lat="-90" lon="1"/></trkseg></trk></gpx>"#;
        assert!(matches!(
            route_from_gpx(text),
            Err(LoadError::BadCoordinate { attr: "lat", index: 1 })
        ));
    }

    #[test]
    fn gpx_malformed_or_empty() {
        assert!(matches!(route_from_gpx("<gpx><trk>"), Err(LoadError::Xml(_))));
        assert!(matches!(
            route_from_gpx("<gpx/>"),
            Err(LoadError::Route(RouteError::TooFewPoints { .. }))
        ));
    }

    #[test]
    fn load_route_reads_gpx_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".gpx").tempfile().unwrap();
        write!(file, "{TRACK}").unwrap();
        let route = load_route(file.path()).unwrap();
        assert_eq!(route.nr_points(), 3);
        assert_eq!(InputFormat::from_path(file.path()), InputFormat::Gpx);
    }

    #[test]
    fn load_route_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_route(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
