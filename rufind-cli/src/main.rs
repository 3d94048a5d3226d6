mod interactive;
mod output;

use anyhow::Context;
use clap::Parser;
use crossterm::tty::IsTty;
use rufind::{InteractiveSession, SearchConfig, SearchEngine};
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::render_batch;

#[derive(Parser)]
#[command(
    name = "rufind",
    version,
    about = "Fast file-name and content search",
    long_about = None
)]
struct Cli {
    /// File-name pattern: glob if it contains any of * ? [ ], regex otherwise
    pattern: String,

    /// Regex to search for inside matching files
    #[arg(short = 'c', long = "content")]
    content: Option<String>,

    /// Interactive fuzzy mode with preview
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Directory names to skip (default: .git .venv)
    #[arg(long, num_args = 0..)]
    ignore: Option<Vec<String>>,

    /// Root directory to search
    #[arg(short = 'r', long)]
    root: Option<PathBuf>,

    /// Case-insensitive content matching
    #[arg(long)]
    case_insensitive: bool,

    /// Number of matcher threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("rufind: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SearchConfig::load_from(Some(path))
            .with_context(|| format!("failed to load config {}", path.display()))?,
        // A broken config at a default location falls back to defaults,
        // but never silently
        None => SearchConfig::load().unwrap_or_else(|err| {
            eprintln!("rufind: ignoring invalid config: {}", err);
            SearchConfig::default()
        }),
    };

    init_tracing(&config.log_level);

    // CLI flags override config file values
    let mut request = config.request(&cli.pattern, cli.content.clone());
    if let Some(root) = cli.root {
        request.root = root;
    }
    if let Some(ignore) = cli.ignore {
        request.ignore_dirs = ignore;
    }
    if cli.case_insensitive {
        request.case_insensitive = true;
    }

    let threads = cli.threads.unwrap_or(config.thread_count);
    debug!("Using {} matcher threads", threads);

    let engine = SearchEngine::new(threads)?;
    let use_color = !cli.no_color && io::stdout().is_tty();

    if cli.interactive {
        let session = InteractiveSession::new(engine, request)?;
        interactive::run(&session, use_color)
    } else {
        for record in engine.search(&request)? {
            println!("{}", render_batch(&record, use_color));
        }
        Ok(())
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
