//! Drivelog Extractor CLI
//!
//! Turns recorded vehicle telemetry into batched training data files.

use clap::{Parser, Subcommand};
use drivelog_extractor::{
    config::Config, reader::RecordReader, writer::BatchFile, Pipeline, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "drivelog-extract")]
#[command(version = VERSION)]
#[command(about = "Offline feature/label extractor for driving records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the extraction pipeline over one or more record files
    Extract {
        /// Record files (JSON Lines, one channel-tagged sample per line)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for batch files
        #[arg(long, short)]
        output_dir: Option<PathBuf>,

        /// Localization samples per label window
        #[arg(long)]
        label_interval: Option<usize>,

        /// Frames per output file
        #[arg(long)]
        frames_per_file: Option<usize>,

        /// Window stride between trajectory label points
        #[arg(long)]
        point_interval: Option<usize>,

        /// Window samples evicted per frame close
        #[arg(long)]
        window_step: Option<usize>,

        /// Write human-readable JSON batches instead of binary
        #[arg(long)]
        text: bool,
    },

    /// Read one batch file back and summarize it
    Inspect {
        /// Batch file written by a previous run
        file: PathBuf,
    },

    /// Show the resolved configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            inputs,
            output_dir,
            label_interval,
            frames_per_file,
            point_interval,
            window_step,
            text,
        } => {
            cmd_extract(
                inputs,
                output_dir,
                label_interval,
                frames_per_file,
                point_interval,
                window_step,
                text,
            );
        }
        Commands::Inspect { file } => {
            cmd_inspect(&file);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn cmd_extract(
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    label_interval: Option<usize>,
    frames_per_file: Option<usize>,
    point_interval: Option<usize>,
    window_step: Option<usize>,
    text: bool,
) {
    let mut config = Config::load().unwrap_or_default();

    // CLI flags override the persisted configuration.
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(v) = label_interval {
        config.label_sample_interval = v;
    }
    if let Some(v) = frames_per_file {
        config.frames_per_file = v;
    }
    if let Some(v) = point_interval {
        config.trajectory_point_interval = v;
    }
    if let Some(v) = window_step {
        config.move_window_step = v;
    }
    if text {
        config.binary_output = false;
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Error: could not create output directory: {e}");
        std::process::exit(1);
    }

    println!("Drivelog Extractor v{VERSION}");
    println!("  Output directory: {:?}", config.output_dir);
    println!("  Label window: {} samples", config.label_sample_interval);
    println!("  Label point stride: {}", config.trajectory_point_interval);
    println!("  Move window step: {}", config.move_window_step);
    println!("  Frames per file: {}", config.frames_per_file);
    println!(
        "  Output form: {}",
        if config.binary_output { "binary" } else { "text" }
    );
    println!();

    // Ctrl+C stops ingestion; the partial batch is still finalized.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let mut pipeline = Pipeline::new(&config);

    'files: for input in &inputs {
        let mut reader = match RecordReader::open(input) {
            Ok(reader) => reader,
            Err(e) => {
                eprintln!("Error: cannot open {input:?}: {e}");
                std::process::exit(1);
            }
        };
        println!("Reading {input:?}...");

        while let Some(sample) = reader.next_sample() {
            if !running.load(Ordering::SeqCst) {
                println!();
                println!("Interrupted, finalizing...");
                pipeline.record_malformed_lines(reader.malformed_lines());
                break 'files;
            }
            match pipeline.ingest(sample) {
                Ok(Some(report)) => {
                    println!(
                        "  Wrote {:?} ({} frames)",
                        report.path.file_name().unwrap_or_default(),
                        report.frames
                    );
                }
                Ok(None) => {}
                // A mid-stream flush failure keeps the frames queued; keep
                // streaming and let a later flush (or finalize) retry.
                Err(e) => warn!("flush failed, will retry: {e}"),
            }
        }
        pipeline.record_malformed_lines(reader.malformed_lines());
    }

    let summary = match pipeline.finalize() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: finalize failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = summary.save(&config.output_dir) {
        eprintln!("Warning: could not save run summary: {e}");
    }

    println!();
    println!("Extraction run {} finished:", summary.run_id);
    println!("  Localization samples: {}", summary.localization_samples);
    println!("  Chassis samples: {}", summary.chassis_samples);
    println!("  Malformed lines skipped: {}", summary.malformed_lines);
    println!("  Frames closed: {}", summary.frames_closed);
    println!(
        "  Files written: {} ({} frames total)",
        summary.files_written, summary.frames_written
    );
}

fn cmd_inspect(file: &PathBuf) {
    let batch = match BatchFile::read(file) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Error: cannot read batch file {file:?}: {e}");
            std::process::exit(1);
        }
    };

    println!("Batch file {file:?}");
    println!("  Format version: {}", batch.format_version);
    println!("  Extraction id: {}", batch.extraction_id);
    println!("  Produced at: {}", batch.produced_at.to_rfc3339());
    println!("  File index: {}", batch.file_index);
    println!("  Frames: {}", batch.frames.len());

    for (i, frame) in batch.frames.iter().enumerate() {
        let speed = frame
            .chassis_feature
            .as_ref()
            .map(|c| format!("{:.2} m/s", c.speed_mps))
            .unwrap_or_else(|| "-".to_string());
        let pos = frame
            .localization_feature
            .as_ref()
            .map(|l| format!("({:.2}, {:.2})", l.position.x, l.position.y))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{i}] pos {pos}, speed {speed}, {} label points",
            frame.label_trajectory_points.len()
        );
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
