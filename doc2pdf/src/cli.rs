/// Command-line glue for doc2pdf: argument parsing, config merging and the
/// user-visible summaries. All conversion logic lives in `doc2pdf-core`.
///
/// For programmatic or integration use, call [`run`] with a constructed [`Cli`].
use crate::load_config::{load_config, CliConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc2pdf_core::collect::{collect_inputs, CollectedInputs, InputSummary};
use doc2pdf_core::config::ConversionSettings;
use doc2pdf_core::convert::converter_factory;
use doc2pdf_core::dispatch::dispatch;
use doc2pdf_core::pool::resolve_max_workers;
use doc2pdf_core::scratch::ScratchRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_CONVERTER: &str = "libreoffice";

/// CLI for doc2pdf: convert documents while keeping their folder structure.
#[derive(Parser)]
#[clap(
    name = "doc2pdf",
    version,
    about = "Convert documents, directory trees and zip archives to PDF, preserving structure"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert the given files, directories and zip archives
    Convert {
        /// Files, directories or zip archives to process
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory (default: ./output)
        #[clap(long, short)]
        output: Option<PathBuf>,
        /// Path to a YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Converter to use (libreoffice, copy)
        #[clap(long, env = "DOCUMENT_CONVERTER")]
        converter: Option<String>,
    },
    /// List what would be processed without converting anything
    Scan {
        /// Files, directories or zip archives to inspect
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
        /// Path to a YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Print work items as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            config,
            converter,
        } => {
            let file_config = read_config(config.as_deref())?;
            let output_dir = output
                .or(file_config.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
            let converter = converter
                .or(file_config.converter)
                .unwrap_or_else(|| DEFAULT_CONVERTER.to_string());
            convert(&inputs, &output_dir, &converter, file_config.conversion).await
        }
        Commands::Scan {
            inputs,
            config,
            json,
        } => {
            let file_config = read_config(config.as_deref())?;
            scan(&inputs, file_config.conversion, json).await
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CliConfig::default()),
    }
}

async fn convert(
    inputs: &[PathBuf],
    output_dir: &Path,
    converter: &str,
    settings: ConversionSettings,
) -> Result<()> {
    settings.trace_loaded();
    let settings = Arc::new(settings);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let registry = Arc::new(ScratchRegistry::new());
    let collected = collect(inputs, Arc::clone(&settings), Arc::clone(&registry)).await?;
    print_summary(&collected.summary, &settings);

    if collected.items.is_empty() {
        registry.cleanup();
        println!("\nNo files found or selected for processing.");
        return Ok(());
    }

    let mode = if settings.copy_non_convertible_files {
        "converting/copying"
    } else {
        "converting"
    };
    let thread_info = if settings.use_multithreading {
        format!(" using {} threads", resolve_max_workers(settings.max_workers))
    } else {
        " (single-threaded)".to_string()
    };
    println!(
        "Found {} total file(s) for {mode}{thread_info}.",
        collected.items.len()
    );

    let factory = converter_factory(converter, Arc::clone(&settings));
    tracing::info!(command = "convert", converter = factory.name(), output = %output_dir.display(), "Starting conversion");
    let total_processed = dispatch(collected.items, output_dir, factory.as_ref()).await;

    let cleaned = registry.cleanup();
    tracing::info!(command = "convert", total_processed, cleaned, "Conversion complete");
    println!("\nProcessing finished. {total_processed} file(s) processed.");
    Ok(())
}

async fn scan(inputs: &[PathBuf], settings: ConversionSettings, json: bool) -> Result<()> {
    let settings = Arc::new(settings);
    let registry = Arc::new(ScratchRegistry::new());
    let collected = collect(inputs, Arc::clone(&settings), Arc::clone(&registry)).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&collected.items)
            .context("Failed to serialize work items")?;
        println!("{rendered}");
    } else {
        print_summary(&collected.summary, &settings);
        for item in &collected.items {
            println!(
                "{}\t{}\t{}",
                item.source,
                item.internal_path.display(),
                item.path.display()
            );
        }
    }

    registry.cleanup();
    Ok(())
}

/// Directory walks and zip extraction block, so they run off the async workers.
async fn collect(
    inputs: &[PathBuf],
    settings: Arc<ConversionSettings>,
    registry: Arc<ScratchRegistry>,
) -> Result<CollectedInputs> {
    let inputs = inputs.to_vec();
    tokio::task::spawn_blocking(move || collect_inputs(&inputs, &settings, &registry))
        .await
        .context("Input collection task failed")
}

fn print_summary(summary: &InputSummary, settings: &ConversionSettings) {
    println!("\n--- Input Summary ---");
    println!("Convertible files: {}", summary.convertible);
    if settings.copy_non_convertible_files {
        println!("Other files:       {}", summary.non_convertible);
    }
    println!("ZIP files:         {}", summary.zip);
    println!("Directories:       {}", summary.dir);
    println!("Invalid/ignored:   {}", summary.invalid);
    println!("---------------------\n");
}
