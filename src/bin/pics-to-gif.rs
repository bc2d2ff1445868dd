use std::{path::PathBuf, sync::Mutex};

use anyhow::Context as _;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pics_to_gif::{ConvertConfig, DelayTicks, NoProgress, ProgressObserver, Stage};

#[derive(Parser, Debug)]
#[command(
    name = "pics-to-gif",
    version,
    about = "Batch-convert a folder of images into one animated GIF"
)]
struct Cli {
    /// Folder holding the input images (processed in file-name order).
    #[arg(short = 'f', long)]
    folder: PathBuf,

    /// Output GIF path.
    #[arg(short = 'o', long, default_value = "out.gif")]
    out: PathBuf,

    /// Number of parallel decode workers [default: 10].
    #[arg(short = 'p', long)]
    concurrency: Option<usize>,

    /// Per-frame delay in 1/100 s [default: 0].
    #[arg(short = 'd', long)]
    delay: Option<u16>,

    /// Colors per frame after quantization, 2..=256 [default: 64].
    #[arg(short = 'c', long)]
    colors: Option<usize>,

    /// JSON config file; flags given on the command line override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print run statistics as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors, and hide progress bars.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let cfg = resolve_config(&cli)?;
    let progress: Box<dyn ProgressObserver> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(BarProgress::default())
    };

    let stats = pics_to_gif::convert_dir(&cli.folder, &cli.out, &cfg, progress.as_ref())
        .with_context(|| {
            format!(
                "convert '{}' into '{}'",
                cli.folder.display(),
                cli.out.display()
            )
        })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if !cli.quiet {
        eprintln!(
            "wrote {} ({} frames, {} bytes)",
            cli.out.display(),
            stats.frames,
            stats.bytes_written
        );
    }
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ConvertConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ConvertConfig::from_json_path(path)?,
        None => ConvertConfig::default(),
    };
    if let Some(n) = cli.concurrency {
        cfg = cfg.with_concurrency(n);
    }
    if let Some(ticks) = cli.delay {
        cfg = cfg.with_delay(DelayTicks(ticks));
    }
    if let Some(colors) = cli.colors {
        cfg = cfg.with_palette_size(colors);
    }
    cfg.validate().context("invalid options")?;
    Ok(cfg)
}

/// One indicatif bar per stage, replaced when the next stage starts.
#[derive(Default)]
struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressObserver for BarProgress {
    fn start(&self, stage: Stage, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix:>9} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        bar.set_prefix(stage.label());

        if let Ok(mut slot) = self.bar.lock()
            && let Some(old) = slot.replace(bar)
        {
            old.finish_and_clear();
        }
    }

    fn advance(&self, _stage: Stage, done: usize) {
        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            // Workers report out of order; never move backwards.
            bar.set_position(bar.position().max(done as u64));
        }
    }

    fn finish(&self, _stage: Stage) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            bar.finish();
        }
    }
}
