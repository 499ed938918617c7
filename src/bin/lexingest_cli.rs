use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lexingest::{
    config, logging,
    processing::{FileType, IngestApi, IngestService, UploadedDocument},
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "lexingest-cli",
    about = "Run the document ingestion pipeline on local files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one file and print its extraction record as JSON.
    Process {
        path: PathBuf,
        /// Declared MIME type; inferred from the extension when omitted.
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Process every supported file under a directory and print one summary line each.
    Batch { dir: PathBuf },
    /// Process one file and print the prompt context for a question.
    Context {
        path: PathBuf,
        #[arg(long)]
        question: String,
        #[arg(long)]
        content_type: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load().context("Failed to load config from environment")?;
    logging::init_cli_tracing();
    let service = IngestService::new(config.limits());

    match cli.command {
        Command::Process {
            path,
            content_type,
            pretty,
        } => {
            let result = service.process_file(read_upload(&path, content_type)?)?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }
        Command::Batch { dir } => run_batch(&service, &dir)?,
        Command::Context {
            path,
            question,
            content_type,
        } => {
            let result = service.process_file(read_upload(&path, content_type)?)?;
            println!("{}", service.build_context(&result.chunks, &question));
        }
    }
    Ok(())
}

fn run_batch(service: &IngestService, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut failures = 0usize;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let mime = guess_mime(path);
        if FileType::from_mime(&mime).is_none() {
            tracing::debug!(path = %path.display(), mime = %mime, "Skipping unsupported file");
            continue;
        }

        match read_upload(path, Some(mime)).and_then(|upload| Ok(service.process_file(upload)?)) {
            Ok(result) => println!(
                "{}\t{}\t{} chunks\t{} words\t{} chars",
                path.display(),
                result.file_type.as_str(),
                result.chunk_count,
                result.word_count,
                result.char_count
            ),
            Err(err) => {
                failures += 1;
                println!("{}\terror\t{err:#}", path.display());
            }
        }
    }

    let summary = service.metrics_snapshot();
    eprintln!(
        "processed {} documents ({} chunks), {} failed",
        summary.documents_processed, summary.chunks_produced, failures
    );
    Ok(())
}

fn read_upload(path: &Path, content_type: Option<String>) -> Result<UploadedDocument> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = content_type.unwrap_or_else(|| guess_mime(path));
    Ok(UploadedDocument::new(data, content_type, filename))
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
