//! CLI argument parsing for pdfmaster.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pdfmaster::config::{
    Command, CompressionLevel, Config, MergeInput, OverwriteMode, SplitMode,
};
use pdfmaster::error::{PdfMasterError, Result};
use pdfmaster::range::PageRange;
use pdfmaster::workflow::MERGED_FILENAME;

/// Merge PDF files or split one into page ranges.
///
/// pdfmaster works entirely on local files. Merging copies the selected
/// pages of every input, in order, into one document. Splitting cuts one
/// document into single pages or ranges and packs the parts into a zip
/// archive.
#[derive(Parser, Debug)]
#[command(name = "pdfmaster")]
#[command(version)]
#[command(about = "Merge PDF files or split one into page ranges", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Commands,

    /// Directory that receives the output files
    #[arg(short, long, value_name = "DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Dry run - load inputs and show the plan without creating output
    ///
    /// Every input is still parsed, so unreadable files are reported
    /// exactly as in a real run.
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Verbose output - show detailed information about each PDF
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Force overwrite of existing output files without confirmation
    ///
    /// By default, pdfmaster will prompt before overwriting a file.
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Never overwrite existing output files
    ///
    /// If an output file already exists, exit with an error
    /// instead of prompting or overwriting.
    #[arg(long, conflicts_with = "force", global = true)]
    pub no_clobber: bool,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    pub quiet: bool,

    /// Compression level for output PDFs
    ///
    /// - none: No compression (preserves exact structure)
    /// - standard: Balanced compression (default)
    /// - maximum: Prune unused objects and compress
    #[arg(short, long, value_name = "LEVEL", default_value = "standard", global = true)]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Number of files loaded concurrently
    ///
    /// Default is number of CPU cores. Use 1 for sequential loading.
    #[arg(short, long, value_name = "N", env = "PDFMASTER_JOBS", global = true)]
    pub jobs: Option<usize>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge PDF files into one document
    ///
    /// Inputs are merged in the order given. Append "@RANGE" to an input
    /// to take only some of its pages. Glob patterns are expanded.
    ///
    /// Examples:
    ///   pdfmaster merge a.pdf b.pdf
    ///   pdfmaster merge cover.pdf@1 report.pdf@2-10 "appendix/*.pdf"
    Merge {
        /// Input PDF files, each optionally followed by @RANGE
        #[arg(required = true, value_name = "FILE[@RANGE]")]
        inputs: Vec<String>,

        /// File name of the merged document
        #[arg(long, value_name = "FILE", default_value = MERGED_FILENAME)]
        name: String,
    },

    /// Split one PDF into a zip archive of parts
    ///
    /// Examples:
    ///   pdfmaster split book.pdf --burst
    ///   pdfmaster split book.pdf -r 1-10 -r 11-20 -r 21-
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// One output file per page
        #[arg(short, long, conflicts_with = "ranges", required_unless_present = "ranges")]
        burst: bool,

        /// One output file per range, in order (e.g. "1-3,5")
        #[arg(short = 'r', long = "range", value_name = "RANGE")]
        ranges: Vec<String>,
    },

    /// Show page counts and sizes of PDF files
    Info {
        /// Input PDF files
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Split a merge argument into its path and optional range.
///
/// The range follows the last `@` and may only contain digits, commas,
/// hyphens and spaces. Anything else is taken as part of the path, so file
/// names containing `@` keep working.
pub fn parse_merge_input(arg: &str) -> MergeInput {
    match arg.rsplit_once('@') {
        Some((path, range))
            if !path.is_empty()
                && !range.trim().is_empty()
                && range
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, ',' | '-' | ' ')) =>
        {
            MergeInput::with_range(path, range)
        }
        _ => MergeInput::new(arg),
    }
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is invalid
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        // Parse compression level
        let compression = CompressionLevel::from_str(&self.compression)?;

        // Determine overwrite mode
        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let command = match &self.command {
            Commands::Merge { inputs, name } => Command::Merge {
                inputs: inputs.iter().map(|arg| parse_merge_input(arg)).collect(),
                output_name: name.clone(),
            },
            Commands::Split {
                input,
                burst,
                ranges,
            } => Command::Split {
                input: input.clone(),
                mode: if *burst {
                    SplitMode::Burst
                } else {
                    SplitMode::Ranges(ranges.iter().map(PageRange::new).collect())
                },
            },
            Commands::Info { inputs, json } => Command::Info {
                inputs: inputs.clone(),
                json: *json,
            },
        };

        let config = Config {
            command,
            output_dir: self.output_dir.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            overwrite_mode,
            quiet: self.quiet,
            compression,
            jobs: self.jobs,
        };

        // Validate the configuration
        config.validate().map_err(|e| {
            PdfMasterError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs early validation that doesn't require file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        // Validate jobs count
        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PdfMasterError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        // Validate compression level
        if !["none", "standard", "maximum"].contains(&self.compression.as_str()) {
            return Err(PdfMasterError::invalid_config(format!(
                "Invalid compression level: {}",
                self.compression
            )));
        }

        if let Commands::Split { burst, ranges, .. } = &self.command
            && !*burst
            && ranges.iter().all(|range| range.trim().is_empty())
        {
            return Err(PdfMasterError::invalid_config(
                "No ranges specified. Use --burst or at least one --range",
            ));
        }

        Ok(())
    }

    /// Whether the command prints machine-readable output.
    pub fn wants_json(&self) -> bool {
        matches!(self.command, Commands::Info { json: true, .. })
    }
}
