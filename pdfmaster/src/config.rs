//! Configuration module for pdfmaster.
//!
//! This module holds the validated, normalized configuration that drives a
//! merge or split run. It handles:
//! - Validation of argument combinations
//! - Resolution of conflicting options
//! - Application of defaults

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

use crate::PdfMasterError;
use crate::range::PageRange;

/// Compression level for output PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Balanced compression - good trade-off between size and processing time.
    #[default]
    Standard,
    /// Maximum compression - smallest file size, longer processing time.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfMasterError;

    /// Parse compression level from string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation: "none", "standard", or "maximum"
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfMasterError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// One input of a merge with an optional page range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInput {
    /// Path to the PDF file.
    pub path: PathBuf,
    /// Pages to take from it. All pages when absent.
    pub range: Option<PageRange>,
}

impl MergeInput {
    /// Input taking every page of `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            range: None,
        }
    }

    /// Input taking the pages selected by `range`.
    pub fn with_range(path: impl Into<PathBuf>, range: impl Into<PageRange>) -> Self {
        Self {
            path: path.into(),
            range: Some(range.into()),
        }
    }
}

/// How a split cuts its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMode {
    /// One output per page.
    Burst,
    /// One output per range, in order.
    Ranges(Vec<PageRange>),
}

/// What to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge inputs into one document.
    Merge {
        /// Inputs in merge order.
        inputs: Vec<MergeInput>,
        /// File name of the merged output.
        output_name: String,
    },
    /// Split one document into an archive of parts.
    Split {
        /// Document to split.
        input: PathBuf,
        /// How to cut it.
        mode: SplitMode,
    },
    /// Print what the engine reads from each file.
    Info {
        /// Files to inspect.
        inputs: Vec<PathBuf>,
        /// Print JSON instead of text.
        json: bool,
    },
}

impl Command {
    /// Every input path of the command, in order.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        match self {
            Self::Merge { inputs, .. } => inputs.iter().map(|input| input.path.clone()).collect(),
            Self::Split { input, .. } => vec![input.clone()],
            Self::Info { inputs, .. } => inputs.clone(),
        }
    }
}

/// Complete configuration for one run.
///
/// This structure contains all settings needed to perform a merge, split or
/// inspection, derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Operation to run.
    pub command: Command,

    /// Directory that receives the outputs.
    pub output_dir: PathBuf,

    /// Dry run mode - load and plan without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Number of parallel jobs (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Config {
    /// Create a configuration with default settings for `command`.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            output_dir: PathBuf::from("."),
            dry_run: false,
            verbose: false,
            overwrite_mode: OverwriteMode::default(),
            quiet: false,
            compression: CompressionLevel::default(),
            jobs: None,
        }
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The merged file name is empty or contains a path separator
    /// - A range split lists no ranges
    pub fn validate(&self) -> Result<()> {
        if self.command.input_paths().is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        match &self.command {
            Command::Merge { output_name, .. } => {
                if output_name.trim().is_empty() {
                    bail!("Output file name cannot be empty");
                }
                if output_name.contains(['/', '\\']) {
                    bail!(
                        "Output file name must not contain a path separator: {output_name}. Use --output-dir to choose the directory"
                    );
                }
            }
            Command::Split {
                mode: SplitMode::Ranges(ranges),
                ..
            } if ranges.is_empty() => {
                bail!("No ranges specified. Use --burst or at least one --range");
            }
            _ => {}
        }

        Ok(())
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
