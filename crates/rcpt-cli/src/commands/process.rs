//! Process command - turn a single receipt image into a stored expense.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rcpt_core::models::ExtractionSource;
use rcpt_core::{ProcessedReceipt, ReceiptPipeline};

use super::list::{OutputFormat, format_records};
use super::{Context, load_image};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Receipt image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which stages used their remote service and the processing time
    #[arg(long)]
    show_sources: bool,
}

pub async fn run(args: ProcessArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = ctx.load_config()?;
    let store = ctx.open_store(&config);

    info!("Processing file: {}", args.input.display());
    let payload = load_image(&args.input)?;

    let pipeline = ReceiptPipeline::from_config(&config, store);
    let (remote_ocr, remote_llm) = pipeline.remote_status();
    debug!("Remote OCR: {}, remote categorization: {}", remote_ocr, remote_llm);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading receipt...");

    let result = pipeline.process(&payload).await;
    pb.finish_and_clear();
    let processed = result?;

    let output = format_records(std::slice::from_ref(&processed.record), args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    if args.show_sources {
        print_sources(&processed);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn source_label(source: ExtractionSource) -> &'static str {
    match source {
        ExtractionSource::Remote => "remote",
        ExtractionSource::Fallback => "fallback",
    }
}

fn print_sources(processed: &ProcessedReceipt) {
    eprintln!();
    eprintln!(
        "{} Text: {}, fields: {}",
        style("ℹ").blue(),
        source_label(processed.text_source),
        source_label(processed.fields_source)
    );
    if processed.text_source == ExtractionSource::Fallback {
        eprintln!(
            "{} No OCR service was reachable; a sample receipt was used instead.",
            style("!").yellow()
        );
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        processed.processing_time_ms
    );
}
