//! NFT metadata normalizer CLI
//!
//! Commands: normalize
//! Normalized documents go to stdout or files; summary and errors to stderr.
//! Returns non-zero when any document fails.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use nftnorm_core::logging::{init_logging, LogConfig, LogFormat};
use nftnorm_core::output::{serialize, write_outputs, OutputFormat};
use nftnorm_core::{sources, BatchReport, NormalizeOptions, Normalizer, SourceDocument, ENGINE_VERSION};

#[derive(Parser)]
#[command(name = "nftnorm-cli")]
#[command(version = ENGINE_VERSION)]
#[command(about = "NFT metadata normalizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize metadata documents
    Normalize(NormalizeArgs),
}

#[derive(Args)]
struct NormalizeArgs {
    /// File or directory paths containing JSON metadata records
    inputs: Vec<PathBuf>,

    /// Write normalized documents to a file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Normalization profile (default only)
    #[arg(long, default_value = "default")]
    profile: String,

    /// Disable SHA-256 content hash generation
    #[arg(long)]
    no_hash: bool,

    /// Attach execution metadata to the output payload
    #[arg(long)]
    include_meta: bool,

    /// Run transformation and validation without writing output
    #[arg(long)]
    validate_only: bool,

    /// Fetch a single metadata document from a URL
    #[arg(long, value_name = "URL")]
    fetch: Option<String>,

    /// Read one metadata document from stdin
    #[arg(long)]
    stdin: bool,

    /// Suppress the summary line
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Commands::Normalize(args) = cli.command;

    let format = if cli.log_json { LogFormat::Json } else { LogFormat::Compact };
    init_logging(&LogConfig::from_verbosity(cli.verbose, args.quiet).with_format(format));

    match run_normalize(&args) {
        Ok(report) if report.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_normalize(args: &NormalizeArgs) -> Result<BatchReport> {
    let normalizer = Normalizer::for_profile(&args.profile)
        .with_context(|| format!("Unsupported profile: {}", args.profile))?;

    let documents = collect_documents(args)?;
    if documents.is_empty() {
        bail!("No input documents supplied.");
    }

    let options = NormalizeOptions::default()
        .with_hash(!args.no_hash)
        .with_meta(args.include_meta);
    let report = normalizer.normalize_batch(documents, &options);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    if !args.validate_only {
        write_outputs(&report.outputs, args.output.as_deref(), args.format, &mut stdout)?;
    }

    if !args.quiet {
        eprintln!("{}", report.summary(args.validate_only));
    }

    if report.has_failures() {
        for failure in &report.failures {
            eprintln!("\n[error] {}", failure.source);
            eprintln!("{}", failure.error);
            let violations = failure.error.violations();
            if !violations.is_empty() {
                eprintln!("{}", serde_json::to_string_pretty(violations)?);
            }
        }
    } else if args.validate_only {
        for output in &report.outputs {
            stdout.write_all(serialize(&output.normalized, args.format)?.as_bytes())?;
        }
    }
    stdout.flush()?;

    Ok(report)
}

fn collect_documents(args: &NormalizeArgs) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    if args.stdin {
        documents.push(sources::read_stdin()?);
    }

    if let Some(url) = &args.fetch {
        documents.push(sources::fetch_remote(url)?);
    }

    for input in &args.inputs {
        documents.extend(sources::load_path(input)?);
    }

    Ok(documents)
}
