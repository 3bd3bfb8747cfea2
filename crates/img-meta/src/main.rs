//! img-meta CLI - describe every image in a directory in one file.
//!
//! Walks a directory for images and prints a single report mapping each
//! image's path (relative to the directory, `/`-rooted) to its displayed
//! width and height, plus capture time and a map link when the EXIF data has
//! them.
//!
//! # Usage
//!
//! ```bash
//! # JSON report on stdout
//! img-meta ./public
//!
//! # TypeScript module for bundlers
//! img-meta ./public --format source --output src/images.generated.ts
//!
//! # Only some extensions
//! img-meta ./public --ext jpg,webp
//!
//! # View configuration
//! img-meta config show
//! ```

use clap::{Parser, Subcommand};
use std::ffi::OsString;

mod cli;
mod logging;

/// img-meta - Emit dimension and geolocation metadata for a directory of images.
#[derive(Parser, Debug)]
#[command(name = "img-meta")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    scan: cli::scan::ScanArgs,
}

/// Available commands. Without one, the directory argument is scanned.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match img_meta_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default settings. Check your config file with `img-meta config path`."
            );
            img_meta_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("img-meta v{}", img_meta_core::VERSION);

    match cli.command {
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::scan::execute(cli.scan, config, invocation(std::env::args_os())).await,
    }
}

/// The command line as typed, with the program path normalized to `img-meta`
/// so generated headers don't depend on where the binary is installed.
/// Arguments that aren't valid UTF-8 are converted lossily.
fn invocation<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = OsString>,
{
    std::iter::once("img-meta".to_string())
        .chain(
            args.into_iter()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
        .collect()
}
