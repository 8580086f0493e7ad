//! Output formatting for route rendering.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use osmroute_lib::RouteSummary;

use crate::terminal::ColorPalette;

/// How the planned route is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary ending in the total distance.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// JSON document emitted by `--format json`.
#[derive(Debug, Serialize)]
pub struct RouteReport<'a> {
    pub map: &'a Path,
    /// Metres per normalized unit of the loaded map.
    pub metric_scale: f64,
    #[serde(flatten)]
    pub route: &'a RouteSummary,
}

/// Render a summary as styled text. With a plain palette this is exactly
/// [`RouteSummary::render_text`].
pub fn render_text(summary: &RouteSummary, show_path: bool, palette: &ColorPalette) -> String {
    let text = summary.render_text(show_path);
    let mut rendered = String::with_capacity(text.len());
    for (position, line) in text.lines().enumerate() {
        let style = if position == 0 {
            palette.white_bold
        } else if line.starts_with("Distance:") {
            palette.green
        } else {
            palette.gray
        };
        if style.is_empty() {
            rendered.push_str(line);
        } else {
            rendered.push_str(style);
            rendered.push_str(line);
            rendered.push_str(palette.reset);
        }
        rendered.push('\n');
    }
    rendered
}

pub fn render_json(report: &RouteReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialise route as JSON")
}

/// Render a summary in the requested format.
pub fn render(
    summary: &RouteSummary,
    map: &Path,
    metric_scale: f64,
    format: OutputFormat,
    show_path: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(summary, show_path, &ColorPalette::detect())),
        OutputFormat::Json => {
            let report = RouteReport {
                map,
                metric_scale,
                route: summary,
            };
            render_json(&report).map(|mut json| {
                json.push('\n');
                json
            })
        }
    }
}
