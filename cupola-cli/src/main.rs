//! Cupola CLI - command-line viewer for ISS Cupola imagery
//!
//! Fetches the image catalog with a live progress bar, renders single
//! images with view transforms, runs slideshows and manages settings.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use cupola::config::ConfigFile;
use cupola::logging::init_logging;
use cupola::transform::Viewport;

use commands::common::{load_config, parse_viewport};
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::render::RenderArgs;
use commands::slideshow::SlideshowArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "cupola")]
#[command(about = "Browse Earth imagery from the ISS Cupola windows")]
#[command(version = cupola::VERSION)]
struct Cli {
    /// JSON catalog file to use instead of the configured one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and decode every image in the catalog
    Fetch {
        /// Retry failed images up to this many extra rounds
        #[arg(long, default_value_t = 0)]
        retry_rounds: u32,
    },

    /// Render one image with view transforms and save it
    Render {
        /// Collection name, e.g. "Window 0"
        #[arg(long)]
        collection: String,

        /// Zero-based image index; the next loaded image is used if it failed
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Zoom in this many steps (x1.2 each)
        #[arg(long, default_value_t = 0)]
        zoom_in: u32,

        /// Zoom out this many steps
        #[arg(long, default_value_t = 0)]
        zoom_out: u32,

        /// Rotate clockwise this many quarter turns
        #[arg(long, default_value_t = 0)]
        rotate_right: u32,

        /// Rotate counter-clockwise this many quarter turns
        #[arg(long, default_value_t = 0)]
        rotate_left: u32,

        /// Enhance brightness
        #[arg(long)]
        brighten: bool,

        /// Enhance contrast
        #[arg(long)]
        contrast: bool,

        /// Viewport the image is fitted to
        #[arg(long, value_parser = parse_viewport, default_value = "1200x800")]
        viewport: Viewport,

        /// Output file (default: <collection>_img<n>_<timestamp>.png in the save directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Step through a collection on the slideshow timer
    Slideshow {
        /// Collection name, e.g. "Window 0"
        #[arg(long)]
        collection: String,

        /// Zero-based index to start at
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Number of advances before stopping
        #[arg(long, default_value_t = 5)]
        count: u32,

        /// Interval between advances in milliseconds (default from config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// List catalog collections
    Catalog {
        /// Also print every image locator
        #[arg(long)]
        locators: bool,
    },

    /// View or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = load_config();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    // Held until exit so buffered file log lines are flushed.
    let _log_guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} could not open log directory: {}", style("warning:").yellow(), e);
            None
        }
    };

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Could not read config file; using defaults");
    }

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: ConfigFile) -> Result<(), CliError> {
    let catalog = cli.catalog;
    match cli.command {
        Commands::Fetch { retry_rounds } => commands::fetch::run(
            FetchArgs {
                catalog,
                retry_rounds,
            },
            &config,
        ),
        Commands::Render {
            collection,
            index,
            zoom_in,
            zoom_out,
            rotate_right,
            rotate_left,
            brighten,
            contrast,
            viewport,
            output,
        } => commands::render::run(
            RenderArgs {
                catalog,
                collection,
                index,
                zoom_in,
                zoom_out,
                rotate_right,
                rotate_left,
                brighten,
                contrast,
                viewport,
                output,
            },
            &config,
        ),
        Commands::Slideshow {
            collection,
            index,
            count,
            interval_ms,
        } => commands::slideshow::run(
            SlideshowArgs {
                catalog,
                collection,
                index,
                count,
                interval_ms,
            },
            config,
        ),
        Commands::Catalog { locators } => commands::catalog::run(catalog, locators, &config),
        Commands::Config { command } => commands::config::run(command, &config),
    }
}
