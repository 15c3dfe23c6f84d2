use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use quiver_cli::charts::{
    self, heatmap, histogram, join_demo, line, log_scale, map, pie, scatter, stacked_bar,
};
use quiver_cli::config::{load_override, DimensionsOverride};
use quiver_common::dimensions::Dimensions;
use quiver_common::value::Dataset;
use quiver_loader::dsv::{load_csv, CsvOptions};
use quiver_loader::json::load_json;
use quiver_loader::topojson::load_topology;
use quiver_scenegraph::scene_graph::SceneGraph;

/// Quiver renders the tutorial charts to static SVG files
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Output {
    /// Output path for the SVG file
    #[arg(short, long, default_value = "chart.svg")]
    out: PathBuf,

    /// JSON file overriding width, height and margin
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Humidity against apparent temperature
    Scatter {
        #[arg(short, long, default_value = "data/weather.json")]
        data: PathBuf,
        /// Simulate hovering at this x,y position inside the plot area
        #[arg(long, value_delimiter = ',', num_args = 2)]
        hover: Option<Vec<f64>>,
        #[command(flatten)]
        output: Output,
    },

    /// Grid of boxes colored by value
    Heatmap {
        #[arg(short, long, default_value = "data/heatmap.json")]
        data: PathBuf,
        /// quantize, quantile or threshold
        #[arg(long, default_value_t = heatmap::ColorScaleKind::default())]
        scale: heatmap::ColorScaleKind,
        #[command(flatten)]
        output: Output,
    },

    /// Planet sizes on a logarithmic axis
    LogScale {
        #[arg(short, long, default_value = "data/universe.json")]
        data: PathBuf,
        #[command(flatten)]
        output: Output,
    },

    /// Binned weather metric. Repeating --metric redraws with transitions
    /// and writes the last state.
    Histogram {
        #[arg(short, long, default_value = "data/weather.json")]
        data: PathBuf,
        #[arg(short, long = "metric")]
        metrics: Vec<histogram::Metric>,
        #[command(flatten)]
        output: Output,
    },

    /// Closing prices over time
    Line {
        #[arg(short, long, default_value = "data/prices.csv")]
        data: PathBuf,
        /// Simulate hovering at this x position inside the plot area
        #[arg(long)]
        hover: Option<f64>,
        #[command(flatten)]
        output: Output,
    },

    /// Share of each name
    Pie {
        #[arg(short, long, default_value = "data/age-groups.csv")]
        data: PathBuf,
        #[command(flatten)]
        output: Output,
    },

    /// Population by state and age group
    StackedBar {
        #[arg(short, long, default_value = "data/population.csv")]
        data: PathBuf,
        #[command(flatten)]
        output: Output,
    },

    /// Country outlines from a TopoJSON file
    Map {
        #[arg(short, long, default_value = "data/countries-110m.json")]
        data: PathBuf,
        /// Topology object holding the countries
        #[arg(long, default_value = map::COUNTRIES)]
        object: String,
        #[command(flatten)]
        output: Output,
    },

    /// Selection and data join walkthrough
    JoinDemo {
        #[arg(long, value_delimiter = ',', default_values_t = join_demo::DEFAULT_DATA)]
        values: Vec<f64>,
        /// Values joined into the same list afterwards
        #[arg(long, value_delimiter = ',')]
        then: Option<Vec<f64>>,
        #[command(flatten)]
        output: Output,
    },
}

async fn json(path: &Path) -> Result<Dataset> {
    load_json(path)
        .await
        .ok_or_else(|| anyhow!("no data loaded from {}", path.display()))
}

async fn csv(path: &Path, options: &CsvOptions) -> Result<Dataset> {
    load_csv(path, options)
        .await
        .ok_or_else(|| anyhow!("no data loaded from {}", path.display()))
}

async fn dimensions(output: &Output, defaults: Dimensions) -> Result<Dimensions> {
    let config = match &output.config {
        Some(path) => load_override(path).await?,
        None => DimensionsOverride::default(),
    };
    Ok(config.apply(defaults))
}

async fn build(command: &Commands) -> Result<(SceneGraph, &Output)> {
    let built = match command {
        Commands::Scatter {
            data,
            hover,
            output,
        } => {
            let dims = dimensions(output, scatter::default_dimensions()).await?;
            let pointer = match hover.as_deref() {
                Some(&[x, y]) => Some([x, y]),
                Some(other) => bail!("--hover takes x,y, got {other:?}"),
                None => None,
            };
            (scatter::render(&json(data).await?, &dims, pointer)?, output)
        }
        Commands::Heatmap {
            data,
            scale,
            output,
        } => {
            let dims = dimensions(output, heatmap::default_dimensions()).await?;
            (heatmap::render(&json(data).await?, &dims, *scale)?, output)
        }
        Commands::LogScale { data, output } => {
            let dims = dimensions(output, log_scale::default_dimensions()).await?;
            (log_scale::render(&json(data).await?, &dims)?, output)
        }
        Commands::Histogram {
            data,
            metrics,
            output,
        } => {
            let dims = dimensions(output, histogram::default_dimensions()).await?;
            (histogram::render(&json(data).await?, &dims, metrics)?, output)
        }
        Commands::Line {
            data,
            hover,
            output,
        } => {
            let dims = dimensions(output, line::default_dimensions()).await?;
            let data = csv(data, &CsvOptions::default()).await?;
            (line::render(&data, &dims, *hover)?, output)
        }
        Commands::Pie { data, output } => {
            let dims = dimensions(output, pie::default_dimensions()).await?;
            let data = csv(data, &CsvOptions::default()).await?;
            (pie::render(&data, &dims)?, output)
        }
        Commands::StackedBar { data, output } => {
            let dims = dimensions(output, stacked_bar::default_dimensions()).await?;
            let data = csv(data, &stacked_bar::csv_options()).await?;
            (stacked_bar::render(&data, &dims)?, output)
        }
        Commands::Map {
            data,
            object,
            output,
        } => {
            let dims = dimensions(output, map::default_dimensions()).await?;
            let Some(topology) = load_topology(data).await else {
                bail!("no topology loaded from {}", data.display());
            };
            (map::render(&topology.features(object)?, &dims)?, output)
        }
        Commands::JoinDemo {
            values,
            then,
            output,
        } => (join_demo::render(values, then.as_deref())?, output),
    };
    Ok(built)
}

async fn run(cli: Cli) -> Result<()> {
    let (scene, output) = build(&cli.command).await?;
    charts::write_svg(&scene, &output.out).await
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    info!("Quiver {}", env!("CARGO_PKG_VERSION"));
    runtime.block_on(run(cli)).inspect_err(|err| error!("{err:#}"))
}
