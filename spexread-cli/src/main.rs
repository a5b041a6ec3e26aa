//! spexread CLI - Command-line interface for SPE camera files.
//!
//! Inspects metadata and exports ROI pixels or tracked per-frame values.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Parser, Subcommand};
use spexread_io::{DataFileWriter, ReaderConfig, SpeFile};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    SpexreadIo(#[from] spexread_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] spexread_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported output extension '{0}' (expected csv or bin)")]
    OutputFormat(String),
}

/// Reader for Princeton Instruments SPE files.
#[derive(Parser)]
#[command(name = "spexread")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Accept files whose legacy header sentinels do not match
    #[arg(long, global = true)]
    no_strict: bool,

    /// Reader configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of an SPE file
    Info {
        /// Input SPE file
        input: PathBuf,
    },

    /// Print the decoded metadata as JSON
    Metadata {
        /// Input SPE file
        input: PathBuf,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Export one ROI (and optionally the tracked values)
    Export {
        /// Input SPE file
        input: PathBuf,

        /// ROI index
        #[arg(long, default_value = "0")]
        roi: usize,

        /// Output file (.csv or .bin)
        #[arg(short, long)]
        output: PathBuf,

        /// Write tracked per-frame values to this CSV file
        #[arg(long)]
        tracking: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ReaderConfig::from_file(path)?,
        None => ReaderConfig::default(),
    };
    if cli.no_strict {
        config.strict = false;
    }
    log::debug!("reader configuration: {config:?}");

    match cli.command {
        Commands::Info { input } => info(&input, config),
        Commands::Metadata { input, compact } => {
            let spe = SpeFile::open_with_config(&input, config)?;
            let json = if compact {
                serde_json::to_string(spe.metadata())?
            } else {
                serde_json::to_string_pretty(spe.metadata())?
            };
            println!("{json}");
            Ok(())
        }
        Commands::Export {
            input,
            roi,
            output,
            tracking,
        } => export(&input, config, roi, &output, tracking.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn info(input: &Path, config: ReaderConfig) -> Result<()> {
    let spe = SpeFile::open_with_config(input, config)?;
    let metadata = spe.metadata();
    let frame = &metadata.frame_info;

    println!("File: {}", input.display());
    println!(
        "Size: {} bytes ({:.2} MB)",
        spe.file_size(),
        spe.file_size() as f64 / 1_000_000.0
    );
    let layout = if metadata.version.has_footer() {
        "XML footer"
    } else {
        "legacy header"
    };
    println!("Version: {} ({})", metadata.version.number(), layout);
    println!("Frames: {}", frame.count);
    println!("Pixel format: {}", frame.pixel_format);
    println!("Frame stride: {} bytes", frame.stride);

    println!("ROIs: {}", frame.rois.len());
    for (i, roi) in frame.rois.iter().enumerate() {
        println!(
            "  [{}] {}x{} (w x h), size {} bytes, stride {} bytes, offset {}",
            i,
            roi.width,
            roi.height,
            roi.size,
            roi.stride,
            frame.roi_offset(i)?
        );
    }

    match metadata.active_meta_block() {
        Some(block) => {
            println!("Tracked fields (block {}):", block.id);
            for (offset, field) in block.layout() {
                println!(
                    "  {} ({:?}) at +{}, divisor {}",
                    field.kind,
                    field.value_type,
                    offset,
                    field.divisor()
                );
            }
        }
        None => println!("Tracked fields: none"),
    }

    let (rows, columns) = metadata.dimension_order();
    println!(
        "Sensor: {}x{}, orientation {}, frame dims ({rows}, {columns})",
        metadata.calibrations.sensor_information.width,
        metadata.calibrations.sensor_information.height,
        metadata.calibrations.sensor_orientation().label()
    );

    let mapping = spe.wavelength_mapping();
    match mapping
        .as_ref()
        .and_then(|m| Some((m, m.values.first()?, m.values.last()?)))
    {
        Some((mapping, first, last)) => {
            println!(
                "Wavelength: {} points along {}, {:.3} - {:.3}",
                mapping.values.len(),
                mapping.axis,
                first,
                last
            );
        }
        _ => println!("Wavelength: none"),
    }

    let general = &metadata.general;
    if let Some(date) = &general.date {
        println!("Date: {}", date);
    }
    if let Some(software) = &general.software {
        println!("Software: {}", software);
    }
    Ok(())
}

fn export(
    input: &Path,
    config: ReaderConfig,
    roi: usize,
    output: &Path,
    tracking: Option<&Path>,
) -> Result<()> {
    let spe = SpeFile::open_with_config(input, config)?;
    let data = spe.read_roi(roi)?;

    let format = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(|| "bin".to_string(), str::to_lowercase);
    let csv = match format.as_str() {
        "csv" => true,
        "bin" | "dat" => false,
        other => return Err(CliError::OutputFormat(other.to_string())),
    };
    let mut writer = DataFileWriter::create(output)?;
    if csv {
        writer.write_roi_csv(&data)?;
    } else {
        writer.write_roi_binary(&data)?;
    }
    let (frames, height, width) = data.shape();
    println!(
        "ROI {}: {} frame(s) of {}x{} written to {}",
        roi,
        frames,
        width,
        height,
        output.display()
    );

    if let Some(path) = tracking {
        let tracked = spe.read_tracked_metadata()?;
        DataFileWriter::create(path)?.write_tracking_csv(&tracked)?;
        println!(
            "{} tracked field(s) over {} frame(s) written to {}",
            tracked.len(),
            tracked.frames(),
            path.display()
        );
    }
    Ok(())
}
