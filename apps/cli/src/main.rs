use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use cuekit_core::{Notice, SourceFormat};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    batch::{BatchOptions, FileOutcome, FileStatus, run_batch},
    config::ConfigFile,
};

mod batch;
mod config;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for SourceFormat enum (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliFormat {
    Json,
    Srt,
}

impl From<CliFormat> for SourceFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Json => SourceFormat::Json,
            CliFormat::Srt => SourceFormat::Srt,
        }
    }
}

#[derive(Parser)]
#[command(name = "cuekit")]
#[command(about = "Convert JSON transcripts and SRT subtitles to WebVTT")]
struct Cli {
    /// Input files (.json transcript chunks or .srt subtitles)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the .vtt files. Defaults to each input's directory.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Input format, instead of detecting it from the file extension
    #[arg(short, long)]
    format: Option<CliFormat>,

    /// Print the document to stdout instead of writing a file (single input only)
    #[arg(long, conflicts_with = "output_dir")]
    stdout: bool,

    /// Overwrite existing .vtt files
    #[arg(long)]
    force: bool,

    /// Also write documents that contain no cues
    #[arg(long)]
    allow_empty: bool,

    /// Maximum number of files converted at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Configuration file. Defaults to <config dir>/cuekit/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cuekit={level},cuekit_core={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message("Converting...");
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn notice_line(notice: &Notice) -> String {
    match notice {
        Notice::MissingChunks | Notice::SkippedChunks { .. } | Notice::MalformedBlock { .. } => {
            format!("    {} {}", style("!").yellow().bold(), notice)
        }
        Notice::NoChunks | Notice::NothingConvertible { .. } | Notice::NoCues => {
            format!("    {} {}", style("i").blue().bold(), style(notice).dim())
        }
    }
}

fn outcome_lines(outcome: &FileOutcome) -> Vec<String> {
    let input = outcome.input.display();
    let cues = outcome
        .report
        .as_ref()
        .map(|r| format!("({} cues, {})", r.cue_count, r.format.name()))
        .unwrap_or_default();

    let mut lines = vec![match &outcome.status {
        FileStatus::Written { output } => format!(
            "{} {} → {} {}",
            style("✓").green().bold(),
            input,
            style(output.display()).cyan(),
            style(cues).dim()
        ),
        FileStatus::Printed => format!(
            "{} {} {}",
            style("✓").green().bold(),
            input,
            style(cues).dim()
        ),
        FileStatus::SkippedExisting { output } => format!(
            "{} {} {}",
            style("-").dim(),
            input,
            style(format!("({} exists, use --force)", output.display())).dim()
        ),
        FileStatus::Empty => format!(
            "{} {} {}",
            style("-").dim(),
            input,
            style("(nothing to write)").dim()
        ),
        FileStatus::Failed(e) => format!("{} {}: {}", style("✗").red().bold(), input, e),
    }];

    if let Some(report) = &outcome.report {
        lines.extend(report.notices.iter().map(notice_line));
    }
    lines
}

impl Cli {
    /// Checks clap cannot express on its own
    fn validate(&self) -> Result<()> {
        if self.stdout && self.inputs.len() > 1 {
            anyhow::bail!(
                "--stdout takes a single input ({} given); use --output-dir for batches",
                self.inputs.len()
            );
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.validate() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    let config = match ConfigFile::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    init_logging(&config.logging.level);
    tracing::debug!(?config, "configuration loaded");

    let options = BatchOptions {
        format: cli.format.map(SourceFormat::from),
        output_dir: cli.output_dir.or(config.output.dir),
        overwrite: cli.force || config.output.overwrite,
        write_empty: cli.allow_empty || config.output.write_empty,
        to_stdout: cli.stdout,
        jobs: cli.jobs.unwrap_or(config.batch.jobs),
    };

    let total = cli.inputs.len();
    let total_start = Instant::now();
    let pb = if total > 1 {
        create_progress_bar(total)
    } else {
        create_spinner("Converting...")
    };

    let outcomes = run_batch(cli.inputs, options, |outcome| {
        pb.suspend(|| {
            for line in outcome_lines(outcome) {
                eprintln!("{}", line);
            }
        });
        pb.inc(1);
    })
    .await?;
    pb.finish_and_clear();

    for outcome in &outcomes {
        if let (FileStatus::Printed, Some(report)) = (&outcome.status, &outcome.report) {
            print!("{}", report.document);
        }
    }

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    eprintln!(
        "\n{} {} of {} files converted {}",
        style("Done:").dim(),
        style(total - failed).cyan().bold(),
        total,
        style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
    );

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
