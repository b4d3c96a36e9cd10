//! routely-export: Pure table and plot serializers (sans-IO)
//!
//! Converts routes into output formats: CSV tables and SVG plots of the
//! route and of its channels.

pub mod csv;
pub mod svg;

pub use crate::csv::{ExportError, to_csv};
pub use crate::svg::{SvgMetadata, SvgOptions, build_path_data, to_channel_svg, to_svg};
