mod commands;
mod config;

use std::path::PathBuf;

use canvas::geom::Point;
use canvas::persist::{JsonFileStore, PersistError};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no scene has been saved yet")]
    MissingScene,
    #[error("no object with id `{0}`")]
    UnknownObject(String),
    #[error("object `{0}` is not a shape")]
    NotAShape(String),
    #[error("object `{0}` has no area to rasterize")]
    NoRasterWindow(String),
    #[error("an eraser needs at least two points")]
    EraserTooShort,
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("failed to write mask: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sketchboard", about = "Inspect, migrate and erase sketchboard scene files")]
struct Cli {
    /// Scene file (a JSON array of drawable objects).
    #[arg(long, env = "SKETCHBOARD_SCENE", default_value = "scene.json")]
    scene: PathBuf,

    /// Overrides SKETCHBOARD_ALPHA_THRESHOLD.
    #[arg(long)]
    alpha_threshold: Option<u8>,

    /// Overrides SKETCHBOARD_MIN_ISLAND_PIXELS.
    #[arg(long)]
    min_island_pixels: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay legacy eraser records and write the cleaned scene back.
    Migrate {
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Apply one eraser stroke to the scene and save it.
    Erase(EraserArgs),
    /// List objects in paint order.
    Inspect,
    /// Write the erased alpha mask of one shape as a PNG.
    Mask {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        eraser: EraserArgs,
        #[arg(long, default_value = "mask.png")]
        out: PathBuf,
    },
    /// Print the draw calls of one frame.
    Render {
        /// Leave out selection chrome.
        #[arg(long, default_value_t = false)]
        exporting: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct EraserArgs {
    /// Eraser vertex in world space as `x,y`; repeat for each vertex.
    #[arg(long = "point", value_parser = commands::parse_point, required = true)]
    points: Vec<Point>,

    #[arg(long, default_value_t = 20.0)]
    width: f64,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut settings = config::Settings::from_env();
    if let Some(threshold) = cli.alpha_threshold {
        settings.alpha_threshold = threshold;
    }
    if let Some(min) = cli.min_island_pixels {
        settings.min_island_pixels = min;
    }
    init_tracing(&settings.log_filter);

    let mut store = JsonFileStore::new(&cli.scene);
    tracing::debug!(scene = %cli.scene.display(), "using scene file");
    let stdout = std::io::stdout();
    commands::run(&cli.command, &mut store, &settings, &mut stdout.lock())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
