//! Glob expansion of input arguments.
//!
//! Arguments containing `*`, `?` or `[` are expanded in sorted order.
//! A pattern matching nothing is kept as given so the missing file is
//! reported by the loader like any other.

use std::path::{Path, PathBuf};

use pdfmaster::config::{Command, MergeInput};
use pdfmaster::error::{PdfMasterError, Result};

/// Expand every input pattern of `command`.
pub fn expand_command(command: Command) -> Result<Command> {
    Ok(match command {
        Command::Merge {
            inputs,
            output_name,
        } => Command::Merge {
            inputs: expand_merge_inputs(inputs)?,
            output_name,
        },
        Command::Info { inputs, json } => Command::Info {
            inputs: expand_paths(inputs)?,
            json,
        },
        split @ Command::Split { .. } => split,
    })
}

/// Expand merge inputs. Every match inherits the range of its pattern.
pub fn expand_merge_inputs(inputs: Vec<MergeInput>) -> Result<Vec<MergeInput>> {
    let mut expanded = Vec::with_capacity(inputs.len());
    for input in inputs {
        for path in collect_paths_for_pattern(&input.path)? {
            expanded.push(MergeInput {
                path,
                range: input.range.clone(),
            });
        }
    }
    Ok(expanded)
}

/// Expand plain input paths.
pub fn expand_paths(paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        expanded.extend(collect_paths_for_pattern(&path)?);
    }
    Ok(expanded)
}

fn is_pattern(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

fn collect_paths_for_pattern(path: &Path) -> Result<Vec<PathBuf>> {
    let pattern = path.to_string_lossy();
    if !is_pattern(&pattern) {
        return Ok(vec![path.to_path_buf()]);
    }

    let paths = glob::glob(&pattern).map_err(|err| {
        PdfMasterError::invalid_config(format!("Invalid pattern {pattern}: {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PdfMasterError::other(err.to_string()))?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() {
        log::warn!("Pattern {pattern} matched no file");
        resolved_paths.push(path.to_path_buf());
    }

    Ok(resolved_paths)
}
