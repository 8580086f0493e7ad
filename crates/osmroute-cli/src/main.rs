use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use osmroute_cli::input::{
    parse_coordinate_arg, prompt_coordinate, within_plane, Coordinate, Endpoint,
};
use osmroute_cli::output::{self, OutputFormat};
use osmroute_lib::{load_route_model, plan_route, RouteAlgorithm, RouteRequest, RouteSummary};

const DEFAULT_MAP: &str = "map.osm";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plan the shortest road route across an OpenStreetMap extract"
)]
struct Cli {
    /// OSM map file (`.osm` XML or `.osm.pbf`). Defaults to `map.osm`.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Start point as X,Y in the normalized [0, 100] plane. Prompted for when omitted.
    #[arg(long, value_parser = parse_coordinate_arg, allow_hyphen_values = true)]
    start: Option<Coordinate>,

    /// End point as X,Y in the normalized [0, 100] plane. Prompted for when omitted.
    #[arg(long, value_parser = parse_coordinate_arg, allow_hyphen_values = true)]
    end: Option<Coordinate>,

    /// Search algorithm.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::AStar)]
    algorithm: AlgorithmArg,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// List every node of the route in text output.
    #[arg(long)]
    show_path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    AStar,
    Dijkstra,
}

impl From<AlgorithmArg> for RouteAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::AStar => RouteAlgorithm::AStar,
            AlgorithmArg::Dijkstra => RouteAlgorithm::Dijkstra,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let map_path = match cli.file {
        Some(path) => path,
        None => {
            eprintln!("To specify a map file use the following format:");
            eprintln!("Usage: osmroute [-f filename.osm]");
            PathBuf::from(DEFAULT_MAP)
        }
    };

    info!(path = %map_path.display(), "reading map data");
    let model = load_route_model(&map_path)
        .with_context(|| format!("failed to read map data from {}", map_path.display()))?;
    model
        .ensure_routable()
        .with_context(|| format!("no road network found in {}", map_path.display()))?;

    let start = endpoint_coordinate(Endpoint::Start, cli.start)?;
    let end = endpoint_coordinate(Endpoint::End, cli.end)?;
    info!(%start, %end, algorithm = ?cli.algorithm, "planning route");

    let request = RouteRequest {
        start: start.to_position(),
        goal: end.to_position(),
        algorithm: cli.algorithm.into(),
    };
    let plan = plan_route(&model, &request)
        .with_context(|| format!("failed to plan a route from {start} to {end}"))?;
    let summary =
        RouteSummary::from_plan(&model, &plan).context("failed to summarise the route")?;

    let rendered = output::render(
        &summary,
        &map_path,
        model.projection().metric_scale(),
        cli.format,
        cli.show_path,
    )?;
    print!("{rendered}");
    Ok(())
}

/// Use the flag value when given, otherwise prompt on stderr and read stdin.
fn endpoint_coordinate(endpoint: Endpoint, flag: Option<Coordinate>) -> Result<Coordinate> {
    if let Some(coordinate) = flag {
        return Ok(within_plane(endpoint, coordinate));
    }

    let stdin = io::stdin();
    let mut stderr = io::stderr();
    let coordinate = prompt_coordinate(endpoint, &mut stdin.lock(), &mut stderr)
        .with_context(|| format!("failed to read the {} coordinate", endpoint.label()))?;
    if !stdin.is_terminal() {
        // Keep the prompt and the following output on separate lines.
        eprintln!();
    }
    Ok(coordinate)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
