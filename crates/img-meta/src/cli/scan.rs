//! Default command: scan a directory and write the report.

use clap::{Args, ValueEnum};
use img_meta_core::config::ProcessingConfig;
use img_meta_core::{write_report, BatchPipeline, Config, OutputFormat as CoreOutputFormat};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Report formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON object keyed by image path
    Data,
    /// TypeScript module with the mapping and a key union type
    Source,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Data => CoreOutputFormat::Data,
            OutputFormat::Source => CoreOutputFormat::Source,
        }
    }
}

/// Arguments for scanning a directory.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Directory containing images to process
    #[arg(value_name = "DIR", required = true)]
    pub input: Option<PathBuf>,

    /// Comma-separated list of file extensions to process [default: jpg,jpeg,png,ico]
    #[arg(long, value_name = "LIST")]
    pub ext: Option<String>,

    /// Output format [default: data]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of images processed at once [default: 20]
    #[arg(short, long)]
    pub parallel: Option<usize>,
}

impl ScanArgs {
    /// Fold CLI overrides into the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(ext) = &self.ext {
            config.processing.extensions = ProcessingConfig::parse_extensions(ext);
        }
        if let Some(parallel) = self.parallel {
            config.processing.concurrency = parallel;
        }
        if let Some(format) = self.format {
            config.output.format = match format {
                OutputFormat::Data => "data",
                OutputFormat::Source => "source",
            }
            .to_string();
        }
        config.validate()?;
        Ok(())
    }
}

/// Scan the input directory and write the formatted report.
pub async fn execute(
    args: ScanArgs,
    mut config: Config,
    invocation: Vec<String>,
) -> anyhow::Result<()> {
    let Some(input) = args.input.as_ref() else {
        anyhow::bail!("No input directory provided");
    };
    let root = expand_root(input);

    args.apply_to(&mut config)?;
    let format = CoreOutputFormat::parse(&config.output.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format {:?}", config.output.format))?;

    let pipeline = BatchPipeline::from_config(&config);
    let files = pipeline.discover(&root)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", root);
    } else {
        tracing::info!("Found {} image(s) to process", files.len());
    }

    let progress = create_progress_bar(files.len() as u64);
    let tick = progress.clone();
    let result = pipeline
        .process_files(&root, files, move |_| tick.inc(1))
        .await;
    progress.finish_and_clear();
    let report = result?;

    match &args.output {
        Some(output_path) => {
            let file = File::create(output_path)?;
            write_report(BufWriter::new(file), &report, format, &invocation)?;
            tracing::info!("Output written to {:?}", output_path);
        }
        None => {
            write_report(std::io::stdout().lock(), &report, format, &invocation)?;
        }
    }

    Ok(())
}

/// Expand a leading `~`. Paths that aren't valid UTF-8 are used as given.
fn expand_root(input: &Path) -> PathBuf {
    match input.to_str() {
        Some(text) => PathBuf::from(shellexpand::tilde(text).into_owned()),
        None => input.to_path_buf(),
    }
}

/// Create a progress bar for batch processing (drawn on stderr).
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
