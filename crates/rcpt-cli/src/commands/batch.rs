//! Batch processing command for multiple receipt images.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use rcpt_core::{ProcessedReceipt, ReceiptPipeline};

use super::process::source_label;
use super::{Context, is_image, load_image};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for receipt images
    #[arg(required = true)]
    input: String,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of concurrent pipeline runs
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Exit successfully even if some files failed
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<ProcessedReceipt, String>,
}

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pipeline = Arc::new(ReceiptPipeline::from_config(&config, store));

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let jobs = args.jobs.max(1);
    let results: Vec<FileResult> = stream::iter(files)
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let pb = overall_pb.clone();
            async move {
                let outcome = process_file(&pipeline, &path).await;
                pb.inc(1);
                FileResult { path, outcome }
            }
        })
        .buffer_unordered(jobs)
        .collect()
        .await;

    overall_pb.finish_and_clear();

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.outcome.is_err()).collect();
    let succeeded = results.len() - failed.len();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(e) = &result.outcome {
                println!("  - {}: {}", result.path.display(), e);
            }
        }

        if !args.continue_on_error {
            anyhow::bail!("{} of {} files failed", failed.len(), results.len());
        }
    }

    Ok(())
}

async fn process_file(pipeline: &ReceiptPipeline, path: &Path) -> Result<ProcessedReceipt, String> {
    let payload = load_image(path).map_err(|e| e.to_string())?;

    match pipeline.process(&payload).await {
        Ok(processed) => {
            debug!("Stored {} as {}", path.display(), processed.record.id);
            Ok(processed)
        }
        Err(e) => {
            warn!("Failed to process {}: {}", path.display(), e);
            Err(e.to_string())
        }
    }
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "id",
        "merchant",
        "category",
        "amount",
        "text_source",
        "fields_source",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let row = match &result.outcome {
            Ok(processed) => [
                filename,
                "success".to_string(),
                processed.record.id.clone(),
                processed.record.merchant_name.clone(),
                processed.record.category.to_string(),
                format!("{:.2}", processed.record.total_amount),
                source_label(processed.text_source).to_string(),
                source_label(processed.fields_source).to_string(),
                processed.processing_time_ms.to_string(),
                String::new(),
            ],
            Err(e) => [
                filename,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                e.clone(),
            ],
        };
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
