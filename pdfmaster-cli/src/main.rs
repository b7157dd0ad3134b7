//! pdfmaster - Merge PDF files or split one into page ranges.
//!
//! Everything happens locally: inputs are read from disk and outputs are
//! written into the output directory.

mod cli;
mod inputs;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use crate::cli::Cli;
use pdfmaster::config::{Command, Config, MergeInput, OverwriteMode, SplitMode};
use pdfmaster::engine::{LopdfEngine, ZipArchiveEngine};
use pdfmaster::error::PdfMasterError;
use pdfmaster::io::{FileDelivery, IngestReport, PdfReader};
use pdfmaster::output::{
    DocumentSummary, OutputFormatter, create_formatter, describe_document,
    display_ingest_report, display_merge_plan, display_receipt, display_split_plan,
};
use pdfmaster::readiness::{LinkedEngines, ReadinessStatus};
use pdfmaster::workflow::{
    SplitPart, Workflow, WorkflowOptions, archive_name, burst_parts, range_parts,
};
use pdfmaster::workspace::{MergeQueue, SplitPlan};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(&cli);

    // Run the application and handle errors
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Route library logs to stderr. `RUST_LOG` overrides the default filter.
fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose {
        "pdfmaster=debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfMasterError> {
    // Validate CLI arguments
    cli.validate()?;
    let json = cli.wants_json();

    // Convert CLI to config and expand glob patterns
    let mut config = cli.to_config()?;
    config.command = inputs::expand_command(config.command)?;

    // JSON output stays machine-readable
    let formatter = if json {
        OutputFormatter::quiet()
    } else {
        create_formatter(&config)
    };

    // Print header
    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfmaster::NAME, pdfmaster::VERSION));
        formatter.blank_line();
    }

    let engine = LopdfEngine::with_compression(config.compression);

    match &config.command {
        Command::Merge {
            inputs,
            output_name,
        } => run_merge(&config, &formatter, engine, inputs, output_name).await,
        Command::Split { input, mode } => {
            run_split(&config, &formatter, engine, input, mode).await
        }
        Command::Info { inputs, json } => run_info(&config, &formatter, engine, inputs, *json).await,
    }
}

async fn run_merge(
    config: &Config,
    formatter: &OutputFormatter,
    engine: LopdfEngine,
    inputs: &[MergeInput],
    output_name: &str,
) -> Result<(), PdfMasterError> {
    formatter.info("Loading input files...");
    let paths: Vec<PathBuf> = inputs.iter().map(|input| input.path.clone()).collect();
    let report = PdfReader::new(&engine)
        .ingest_all(&paths, config.effective_jobs())
        .await;
    display_ingest_report(formatter, &report);

    let loaded_indices = report.loaded_indices();
    let mut queue = MergeQueue::new();
    queue.extend(into_loaded(report)?);

    // Apply the range given with each input
    let ids: Vec<_> = queue.documents().iter().map(|doc| doc.id()).collect();
    for (id, index) in ids.into_iter().zip(loaded_indices) {
        if let Some(range) = &inputs[index].range {
            queue.set_range(id, range.as_str());
        }
    }

    if config.dry_run {
        display_merge_plan(formatter, queue.documents(), output_name);
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info("  Run without --dry-run to create the merged PDF");
        return Ok(());
    }

    let delivery = prepare_delivery(config, formatter, output_name).await?;
    let workflow = Workflow::new(engine, ZipArchiveEngine::new(), delivery).with_options(
        WorkflowOptions {
            merged_filename: output_name.to_string(),
            ..WorkflowOptions::default()
        },
    );
    ensure_ready(&workflow).await?;

    formatter.info(&format!(
        "Merging {} page(s) from {} file(s)...",
        queue.selected_page_count(),
        queue.len()
    ));

    match workflow.combine(queue.documents()).await? {
        Some(receipt) => {
            formatter.blank_line();
            display_receipt(formatter, &receipt);

            if formatter.is_verbose() {
                formatter.blank_line();
                formatter.section("Statistics");
                formatter.detail("Input files", &queue.len().to_string());
                formatter.detail("Total pages", &queue.selected_page_count().to_string());
                formatter.detail("Compression", &format!("{:?}", config.compression));
            }
        }
        None => formatter.warning("Nothing to merge"),
    }

    Ok(())
}

async fn run_split(
    config: &Config,
    formatter: &OutputFormatter,
    engine: LopdfEngine,
    input: &Path,
    mode: &SplitMode,
) -> Result<(), PdfMasterError> {
    formatter.info(&format!("Loading {}...", input.display()));
    let document = PdfReader::new(&engine).ingest_path(input).await?;

    let mut plan = SplitPlan::new();
    plan.load(document);
    if let SplitMode::Ranges(ranges) = mode {
        plan.set_entries(ranges.iter().cloned());
    }

    let Some(document) = plan.document() else {
        return Err(PdfMasterError::NoDocumentLoaded);
    };
    let archive = archive_name(document.base_name());
    let parts: Vec<SplitPart> = match mode {
        SplitMode::Burst => burst_parts(document),
        SplitMode::Ranges(_) => range_parts(document, plan.entries()),
    };

    if config.dry_run {
        display_split_plan(formatter, document, &parts, &archive);
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info("  Run without --dry-run to create the archive");
        return Ok(());
    }

    let delivery = prepare_delivery(config, formatter, &archive).await?;
    let workflow = Workflow::new(engine, ZipArchiveEngine::new(), delivery);
    ensure_ready(&workflow).await?;

    formatter.info(&format!(
        "Splitting {} into {} file(s)...",
        describe_document(document),
        parts.len()
    ));

    let receipt = match mode {
        SplitMode::Burst => workflow.burst(plan.document()).await?,
        SplitMode::Ranges(_) => workflow.split_plan(&plan).await?,
    };

    formatter.blank_line();
    display_receipt(formatter, &receipt);

    if formatter.is_verbose() {
        for (index, part) in parts.iter().enumerate() {
            formatter.list_item(index + 1, &part.filename);
        }
    }

    Ok(())
}

async fn run_info(
    config: &Config,
    formatter: &OutputFormatter,
    engine: LopdfEngine,
    inputs: &[PathBuf],
    json: bool,
) -> Result<(), PdfMasterError> {
    let report = PdfReader::new(&engine)
        .ingest_all(inputs, config.effective_jobs())
        .await;

    if json {
        let documents: Vec<DocumentSummary> =
            report.loaded.iter().map(DocumentSummary::from).collect();
        let failed: Vec<serde_json::Value> = report
            .failed
            .iter()
            .map(|failure| {
                serde_json::json!({
                    "path": failure.path.display().to_string(),
                    "error": failure.error.to_string(),
                })
            })
            .collect();
        let value = serde_json::json!({ "documents": documents, "failed": failed });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| PdfMasterError::other(format!("Failed to encode JSON: {e}")))?;
        formatter.raw(&text);
    } else {
        display_ingest_report(formatter, &report);
        formatter.blank_line();
        for (index, doc) in report.loaded.iter().enumerate() {
            formatter.list_item(
                index + 1,
                &format!("{}, range \"{}\"", describe_document(doc), doc.range),
            );
            formatter.detail("Id", &doc.id().to_string());
        }
    }

    into_loaded(report).map(|_| ())
}

/// Documents of a batch, or the first failure when nothing loaded.
fn into_loaded(report: IngestReport) -> Result<Vec<pdfmaster::SourceDocument>, PdfMasterError> {
    if report.loaded.is_empty()
        && let Some(failure) = report.failed.into_iter().next()
    {
        return Err(failure.error);
    }
    Ok(report.loaded)
}

/// Check the output directory and settle overwriting before any work.
async fn prepare_delivery(
    config: &Config,
    formatter: &OutputFormatter,
    filename: &str,
) -> Result<FileDelivery, PdfMasterError> {
    let target = config.output_dir.join(filename);
    let mode = handle_output_overwrite(config.overwrite_mode, &target, formatter).await?;

    let delivery = FileDelivery::new(&config.output_dir, mode);
    delivery.check(filename).await?;
    Ok(delivery)
}

async fn ensure_ready<E, A, D>(workflow: &Workflow<E, A, D>) -> Result<(), PdfMasterError>
where
    E: pdfmaster::engine::PdfEngine,
    A: pdfmaster::engine::ArchiveEngine,
    D: pdfmaster::engine::Delivery,
{
    match workflow.wait_ready(&LinkedEngines).await {
        ReadinessStatus::Ready => Ok(()),
        status => Err(PdfMasterError::not_ready(status)),
    }
}

/// Handle output file overwrite scenarios.
///
/// Returns the mode the delivery should use. A confirmed prompt becomes
/// [`OverwriteMode::Force`].
async fn handle_output_overwrite(
    mode: OverwriteMode,
    target: &Path,
    formatter: &OutputFormatter,
) -> Result<OverwriteMode, PdfMasterError> {
    // Check if output exists
    if !tokio::fs::try_exists(target).await.unwrap_or(false) {
        return Ok(mode);
    }

    match mode {
        OverwriteMode::Force => {
            // Just overwrite, no questions asked
            Ok(OverwriteMode::Force)
        }
        OverwriteMode::NoClobber => {
            // Error if file exists
            Err(PdfMasterError::output_exists(target.to_path_buf()))
        }
        OverwriteMode::Prompt => {
            // In quiet mode, treat as no-clobber
            if formatter.is_quiet() {
                return Err(PdfMasterError::output_exists(target.to_path_buf()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                target.display()
            ));

            // Simple yes/no prompt
            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfMasterError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(OverwriteMode::Force)
            } else {
                Err(PdfMasterError::Cancelled)
            }
        }
    }
}
