//! `textmill`: extract clean text from a local file or a web page
//!
//! Text goes to stdout, logs to stderr. Set `RUST_LOG` to change verbosity.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use textmill_extract::{FormatRegistry, Pipeline, PipelineConfig, SourceArtifact};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "textmill")]
#[command(version, about = "Turn documents, archives and web links into clean plain text")]
struct Args {
    /// TOML config file; built-in defaults apply to missing keys
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a local file
    File {
        path: PathBuf,

        /// Declared content type; guessed from the file extension when omitted
        #[arg(short = 't', long)]
        content_type: Option<String>,
    },

    /// Fetch a web page and extract its text
    Url {
        url: String,

        /// Print every fetch tier attempt to stderr
        #[arg(long)]
        report: bool,
    },

    /// List the content types the pipeline accepts
    Formats,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", failure_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match args.command {
        Command::File { path, content_type } => {
            let pipeline = Pipeline::new(config)?;
            let artifact = read_artifact(&path, content_type)?;
            info!(path = %path.display(), content_type = %artifact.declared_content_type, "extracting file");
            let text = pipeline.extract_artifact(&artifact)?;
            println!("{}", text);
        }
        Command::Url { url, report } => {
            let pipeline = Pipeline::new(config)?;
            let (result, attempts) = pipeline.extract_from_url_with_report(&url).await;
            if report {
                for attempt in &attempts {
                    eprintln!(
                        "{:<8} {:>6}ms  {:?}",
                        attempt.tier,
                        attempt.elapsed.as_millis(),
                        attempt.outcome
                    );
                }
            }
            println!("{}", result?);
        }
        Command::Formats => {
            for content_type in FormatRegistry::global().content_types() {
                println!("{}", content_type);
            }
        }
    }
    Ok(())
}

/// One line with the whole error chain, printed once on stderr
fn failure_message(err: &anyhow::Error) -> String {
    format!("error: {:#}", err)
}

fn read_artifact(path: &Path, content_type: Option<String>) -> Result<SourceArtifact> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(match content_type {
        Some(content_type) => SourceArtifact::new(bytes, content_type).with_origin_name(name),
        None => SourceArtifact::from_named_bytes(name, bytes),
    })
}
