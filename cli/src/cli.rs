use std::path::PathBuf;

use walkability::PlanarCrs;

/// Walkability scoring CLI
#[derive(clap::Parser, Debug)]
#[command(name = "walkability", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fetch data for a place, score every unit and write the output files
    Run(RunArgs),

    /// Print means, score histogram and lowest-scoring units from a results file
    Summary(SummaryArgs),

    /// Render a results file as an SVG choropleth
    Render(RenderArgs),
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum CrsArg {
    WebMercator,
    Utm,
}

impl From<CrsArg> for PlanarCrs {
    fn from(crs: CrsArg) -> Self {
        match crs {
            CrsArg::WebMercator => PlanarCrs::WebMercator,
            CrsArg::Utm => PlanarCrs::Utm,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Place to geocode, e.g. "Bandung, Indonesia" (defaults to the config value)
    pub place: Option<String>,

    /// Output directory, defaults to "./output"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Planar CRS for distances and areas
    #[arg(long, value_enum)]
    pub crs: Option<CrsArg>,

    /// Walking radius in meters for amenity accessibility
    #[arg(long)]
    pub buffer: Option<f64>,

    /// Always query the remote services
    #[arg(long)]
    pub no_cache: bool,

    /// Compute unit metrics on a single thread
    #[arg(long)]
    pub sequential: bool,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Results file written by `run`
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub geojson: PathBuf,

    /// Restrict to one district (kecamatan)
    #[arg(short, long)]
    pub district: Option<String>,

    /// Restrict to one unit (kelurahan) within the district
    #[arg(short, long, requires = "district")]
    pub unit: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Results file written by `run`
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub geojson: PathBuf,

    /// Output SVG file, defaults to "./walkability_map.svg"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1000.0)]
    pub width: f64,
}
