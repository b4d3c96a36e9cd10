//! routely: CLI tool for transforming and exporting routes.
//!
//! Loads a route from a JSON, CSV or GPX file, runs the configured pipeline
//! steps, prints a summary to stderr, and writes any requested outputs.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin routely -- [OPTIONS] <INPUT>
//! ```
//!
//! Set `RUST_LOG=debug` to see what each step does.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod load;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use routely::{
    BoxSize, Corner, DuplicatePolicy, FitStep, InterpolateStep, MirrorStep, Placement, Point,
    ProcessResult, ResampleKind, RouteConfig, RouteError, SmoothStep,
};
use routely_export::{ExportError, SvgMetadata, SvgOptions};

use crate::load::LoadError;

/// Transform and export 2D routes.
///
/// Steps run in a fixed order: dedup, smooth, resample, optimise bbox,
/// rotate, mirror, fit to box, then align or center.
#[derive(Parser)]
#[command(name = "routely", version)]
struct Cli {
    /// Route file: a JSON object of arrays, a `.csv` with a header row, or
    /// a `.gpx` track projected to web mercator metres.
    /// `x` and `y` are required; other numeric columns become channels.
    input: PathBuf,

    /// Remove duplicate points (consecutive, any).
    #[arg(long)]
    dedup: Option<DuplicatePolicy>,

    /// Smooth with a cubic spline, optionally with a smoothing factor in
    /// [0, 1).
    #[arg(long, value_name = "FACTOR", num_args = 0..=1)]
    smooth: Option<Option<f64>>,

    /// Resample (equidistant_steps, absolute_steps, cubic).
    #[arg(long, requires = "num")]
    resample: Option<ResampleKind>,

    /// Step distance for `equidistant_steps`, point count otherwise.
    #[arg(long, requires = "resample")]
    num: Option<f64>,

    /// Rotate to best match the aspect ratio of a WIDTH x HEIGHT box.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    optimise_bbox: Option<Vec<f64>>,

    /// Rotate clockwise by this many degrees.
    #[arg(long, allow_negative_numbers = true)]
    rotate: Option<f64>,

    /// Mirror vertically (reflect y).
    #[arg(long)]
    mirror_x: bool,

    /// Mirror horizontally (reflect x).
    #[arg(long)]
    mirror_y: bool,

    /// Mirror about the coordinate axes instead of the route center.
    #[arg(long)]
    about_axis: bool,

    /// Scale to fit a WIDTH x HEIGHT box.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    fit_to_box: Option<Vec<f64>>,

    /// With `--fit-to-box`, fill the box instead of keeping the aspect
    /// ratio.
    #[arg(long, requires = "fit_to_box")]
    stretch: bool,

    /// Move this bounding-box corner onto `--origin` (bottomleft,
    /// bottomright, topleft, topright).
    #[arg(long, conflicts_with = "center")]
    align: Option<Corner>,

    /// Target point for `--align` or `--center` (default 0 0).
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    origin: Option<Vec<f64>>,

    /// Move the route center onto `--origin`.
    #[arg(long)]
    center: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other step flags are ignored.  The JSON must be
    /// a valid `RouteConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the processed route table as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write an SVG plot of the route.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write an SVG plot of the channels against distance.
    #[arg(long)]
    channels_svg: Option<PathBuf>,

    /// Print the processed route table as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Draw point markers in SVG plots.
    #[arg(long)]
    markers: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("error parsing --config-json: {0}")]
    Config(serde_json::Error),

    #[error("pipeline error: {0}")]
    Route(#[from] RouteError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("error serializing route: {0}")]
    Serialize(serde_json::Error),

    #[error("error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Build a [`RouteConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual step flags are ignored.  Otherwise, a config is assembled
/// from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<RouteConfig, CliError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(CliError::Config);
    }

    let pair = |values: Option<&[f64]>| match values {
        Some(&[a, b]) => Some((a, b)),
        _ => None,
    };
    let origin = pair(cli.origin.as_deref()).map_or(Point::new(0.0, 0.0), Point::from);

    let placement = if cli.center {
        Some(Placement::Center { origin })
    } else if cli.align.is_some() || cli.origin.is_some() {
        Some(Placement::Align {
            origin,
            corner: cli.align.unwrap_or_default(),
        })
    } else {
        None
    };

    let mirror = (cli.mirror_x || cli.mirror_y).then_some(MirrorStep {
        about_x: cli.mirror_x,
        about_y: cli.mirror_y,
        about_axis: cli.about_axis,
    });

    Ok(RouteConfig {
        remove_duplicates: cli.dedup,
        smooth: cli
            .smooth
            .map(|smoothing_factor| SmoothStep { smoothing_factor }),
        interpolate: cli
            .resample
            .zip(cli.num)
            .map(|(kind, num)| InterpolateStep { kind, num }),
        optimise_bbox: pair(cli.optimise_bbox.as_deref())
            .map(|(width, height)| BoxSize { width, height }),
        rotate: cli.rotate,
        mirror,
        fit_to_box: pair(cli.fit_to_box.as_deref()).map(|(width, height)| FitStep {
            width,
            height,
            keep_aspect: !cli.stretch,
        }),
        placement,
    })
}

fn write_output(path: &Path, contents: &str, what: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    eprintln!(
        "{what} written to {} ({} bytes)",
        path.display(),
        contents.len()
    );
    Ok(())
}

fn print_summary(result: &ProcessResult) {
    let s = &result.summary;
    eprintln!("Points: {} -> {}", s.input_points, s.output_points);
    eprintln!("Length: {:.3} -> {:.3}", s.input_length, s.output_length);
    if let Some(angle) = s.bbox_angle {
        eprintln!("Bbox rotation: {angle} deg");
    }
    let (width, height) = result.route.size();
    let center = result.route.center();
    eprintln!(
        "Size: {width:.3} x {height:.3}, center ({:.3}, {:.3})",
        center.x, center.y
    );
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    let route = load::load_route(&cli.input)?;

    eprintln!("Input: {}", cli.input.display());
    log::debug!("config: {config:?}");

    let result = routely::process(&route, &config)?;
    print_summary(&result);

    if let Some(ref path) = cli.csv {
        write_output(path, &routely_export::to_csv(&result.route)?, "CSV")?;
    }

    let title = cli
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("route");
    let desc = serde_json::to_string(&config).map_err(CliError::Serialize)?;
    let metadata = SvgMetadata {
        title: Some(title),
        description: Some(&desc),
    };
    let options = SvgOptions {
        markers: cli.markers,
        ..SvgOptions::default()
    };

    if let Some(ref path) = cli.svg {
        let svg = routely_export::to_svg(&result.route, &options, &metadata);
        write_output(path, &svg, "SVG")?;
    }

    if let Some(ref path) = cli.channels_svg {
        match routely_export::to_channel_svg(&result.route, &options, &metadata) {
            Some(svg) => write_output(path, &svg, "Channel SVG")?,
            None => log::warn!("route has no channels, not writing {}", path.display()),
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&result.route.dataframe())
            .map_err(CliError::Serialize)?;
        println!("{json}");
    }

    Ok(())
}

fn main() -> ExitCode {
    // Initialize logger with default level (overridden by RUST_LOG)
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
