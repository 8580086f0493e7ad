//! Query coordinates supplied on the command line or typed at a prompt.
//!
//! Coordinates live in the normalized `[0, 100] x [0, 100]` plane. Input that
//! cannot be parsed falls back to the endpoint's default, and each component
//! outside the plane is replaced by the matching default component.

use std::fmt;
use std::io::{self, BufRead, Write};

use osmroute_lib::{Position, PLANE_EXTENT};
use tracing::warn;

/// Point typed by the user, before it is resolved to a graph node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Which end of the route a coordinate describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    pub const fn default_coordinate(self) -> Coordinate {
        match self {
            Endpoint::Start => Coordinate::new(10.0, 10.0),
            Endpoint::End => Coordinate::new(90.0, 90.0),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Endpoint::Start => "start",
            Endpoint::End => "end",
        }
    }
}

/// Parse `x,y` (whitespace around either number is ignored).
pub fn parse_coordinate(input: &str) -> Option<Coordinate> {
    let (x, y) = input.trim().split_once(',')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some(Coordinate::new(x, y))
}

/// `clap` value parser for `--start` and `--end`.
pub fn parse_coordinate_arg(input: &str) -> Result<Coordinate, String> {
    parse_coordinate(input).ok_or_else(|| format!("expected X,Y but got '{input}'"))
}

/// Replace components outside the plane with the endpoint's defaults.
pub fn within_plane(endpoint: Endpoint, coordinate: Coordinate) -> Coordinate {
    let fallback = endpoint.default_coordinate();
    let in_range = |value: f64| (0.0..=PLANE_EXTENT).contains(&value);

    let resolved = Coordinate::new(
        if in_range(coordinate.x) {
            coordinate.x
        } else {
            fallback.x
        },
        if in_range(coordinate.y) {
            coordinate.y
        } else {
            fallback.y
        },
    );
    if resolved != coordinate {
        warn!(
            endpoint = endpoint.label(),
            requested = %coordinate,
            using = %resolved,
            "coordinate outside the map plane"
        );
    }
    resolved
}

/// Turn one line of user input into a coordinate, applying every fallback.
pub fn resolve_input(endpoint: Endpoint, input: &str) -> Coordinate {
    match parse_coordinate(input) {
        Some(coordinate) => within_plane(endpoint, coordinate),
        None => {
            let fallback = endpoint.default_coordinate();
            if !input.trim().is_empty() {
                warn!(
                    endpoint = endpoint.label(),
                    input = input.trim(),
                    using = %fallback,
                    "could not parse coordinate"
                );
            }
            fallback
        }
    }
}

/// Ask for a coordinate on `prompt` and read the answer from `reader`.
///
/// End of input counts as an empty answer and yields the default.
pub fn prompt_coordinate<R, W>(
    endpoint: Endpoint,
    reader: &mut R,
    prompt: &mut W,
) -> io::Result<Coordinate>
where
    R: BufRead,
    W: Write,
{
    write!(
        prompt,
        "Enter {} x,y in [0, {}] (default {}): ",
        endpoint.label(),
        PLANE_EXTENT,
        endpoint.default_coordinate()
    )?;
    prompt.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(resolve_input(endpoint, &line))
}
