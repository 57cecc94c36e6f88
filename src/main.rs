//! xurkit CLI - Command-line tool for converting XUI documents and XUR binaries.
//!
//! This is the main entry point for the xurkit command-line application.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use xurkit::prelude::*;
use xurkit::xur::DEFAULT_TOOL_VERSION;

/// xurkit - XUI / XUR UI resource converter
#[derive(Parser)]
#[command(name = "xurkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema files to register, comma separated
    #[arg(short, long, env = "XURKIT_SCHEMA", value_delimiter = ',', global = true)]
    schema: Vec<PathBuf>,

    /// Schema group the schema files are registered into and used from
    #[arg(short, long, env = "XURKIT_GROUP", default_value = "xui", global = true)]
    group: String,

    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single file
    Convert {
        /// Input XUI or XUR file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Target format: xui, xur5 or xur8
        #[arg(short, long, value_parser = parse_format)]
        format: FileFormat,

        /// Omit the count header from version 8 output
        #[arg(long)]
        no_count_header: bool,

        /// Tool version stamped into XUR headers
        #[arg(long, default_value_t = DEFAULT_TOOL_VERSION)]
        tool_version: u16,
    },

    /// Convert every .xui and .xur file in a directory
    Batch {
        /// Input directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Target format: xui, xur5 or xur8
        #[arg(short, long, value_parser = parse_format)]
        format: FileFormat,

        /// Omit the count header from version 8 output
        #[arg(long)]
        no_count_header: bool,
    },

    /// Print the detected format of files
    Detect {
        /// Files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Convert {
            ref input,
            ref output,
            format,
            no_count_header,
            tool_version,
        } => {
            let registry = load_schemas(&cli.schema, &cli.group)?;
            let options = XurWriteOptions {
                count_header: !no_count_header,
                tool_version,
                ..XurWriteOptions::default()
            };
            cmd_convert(registry.current_group(), options, input, output, format)?;
        }
        Commands::Batch {
            ref input,
            ref output,
            format,
            no_count_header,
        } => {
            let registry = load_schemas(&cli.schema, &cli.group)?;
            let options = XurWriteOptions {
                count_header: !no_count_header,
                ..XurWriteOptions::default()
            };
            cmd_batch(registry.current_group(), options, input, output, format)?;
        }
        Commands::Detect { ref files } => {
            cmd_detect(files);
        }
    }

    Ok(())
}

fn parse_format(s: &str) -> std::result::Result<FileFormat, String> {
    s.parse().map_err(|e: xurkit::Error| e.to_string())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_schemas(paths: &[PathBuf], group: &str) -> Result<SchemaRegistry> {
    if paths.is_empty() {
        bail!("No schema files given; pass --schema or set XURKIT_SCHEMA");
    }

    let mut registry = SchemaRegistry::new();
    for path in paths {
        registry
            .register_group(group, path)
            .with_context(|| format!("Failed to register schema {}", path.display()))?;
    }
    registry.set_current_group(group);
    Ok(registry)
}

fn cmd_convert(
    group: &SchemaGroup,
    options: XurWriteOptions,
    input: &Path,
    output: &Path,
    format: FileFormat,
) -> Result<()> {
    let start = Instant::now();
    let converter = Converter::new(group).with_xur_options(options);
    converter
        .convert(input, format, output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!("Converted {} -> {} ({}) in {:?}", input.display(), output.display(), format, start.elapsed());
    Ok(())
}

/// Drives a progress bar from batch status updates.
struct BarSink {
    bar: ProgressBar,
}

impl ProgressSink for BarSink {
    fn report(&mut self, status: &BatchStatus) {
        self.bar.set_position(status.processed() as u64);
        self.bar.set_message(format!("{} ok, {} failed", status.succeeded, status.failed));
    }
}

fn cmd_batch(
    group: &SchemaGroup,
    options: XurWriteOptions,
    input: &Path,
    output: &Path,
    format: FileFormat,
) -> Result<()> {
    let start = Instant::now();
    let converter = Converter::new(group).with_xur_options(options);

    let entries = scan_directory(input).with_context(|| format!("Failed to read directory {}", input.display()))?;

    let bar = ProgressBar::new(entries.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    let mut sink = BarSink { bar };

    let status = converter
        .convert_entries(&entries, format, output, Some(&mut sink as &mut dyn ProgressSink))
        .with_context(|| format!("Failed to convert directory {}", input.display()))?;
    sink.bar.finish_with_message("Done");

    info!("{}", status.description);
    println!(
        "Converted {}/{} files ({} failed) in {:?}",
        status.succeeded,
        status.total,
        status.failed,
        start.elapsed()
    );
    if status.failed > 0 {
        bail!("{} of {} files failed to convert", status.failed, status.total);
    }
    Ok(())
}

fn cmd_detect(files: &[PathBuf]) {
    for path in files {
        match detect_format(path) {
            Ok(format) => println!("{}: {}", path.display(), format),
            Err(e) => println!("{}: {}", path.display(), e),
        }
    }
}
