//! Command-line entrypoint that summarizes a single local document.
//!
//! Runs the same pipeline as `POST /summarize`, prints the parsed sections as JSON on stdout,
//! and reports where the rendered PDF was written on stderr.
use anyhow::{Context, Result};
use clap::Parser;
use docdigest::{
    config, extraction::FileTextExtractor, logging, processing::SummaryService,
    render::RenderStyle, storage::FsDocumentStore, summarization::build_summarization_client,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(
    name = "docdigest-cli",
    about = "Summarize a document into sections and a styled PDF"
)]
struct Cli {
    /// Document to summarize (.docx, .pdf, .pptx, .ppt, .txt, .md).
    file: PathBuf,
    /// Rendering style: minimal, aesthetic, elegant, or academic.
    #[arg(long, default_value = "minimal")]
    style: String,
    /// Directory for the rendered PDF; defaults to `OUTPUT_DIR`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();
    let config = config::get_config();

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let service = SummaryService::new(
        config.pipeline_settings(),
        build_summarization_client(config),
        Arc::new(FileTextExtractor),
        Arc::new(FsDocumentStore::new(
            config.upload_dir.clone(),
            output_dir.clone(),
        )),
    );

    let bytes = tokio::fs::read(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let file_name = cli
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .context("input path has no usable file name")?;

    let outcome = service
        .summarize_document(file_name, bytes, RenderStyle::parse(&cli.style))
        .await
        .with_context(|| format!("failed to summarize {}", cli.file.display()))?;

    println!("{}", serde_json::to_string_pretty(&outcome.sections)?);
    eprintln!(
        "Rendered {}",
        output_dir.join(&outcome.document_name).display()
    );
    Ok(())
}
