#![forbid(unsafe_code)]

//! Exoplanet narrative showcase binary entry point.

use std::fs;
use std::io;

use exo_runtime::{LoadState, NarrativeSession, ProgramConfig};
use exo_showcase::cli::{self, Command, OutputFormat};
use exo_showcase::render::{JsonRenderer, TextRenderer};
use exo_showcase::settings::{self, ShowcaseError};
use exo_showcase::{headers, runner, script};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays a clean frame stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("EXO_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let result = match cli::Opts::parse() {
        Command::Run(opts) => run(&opts),
        Command::Headers(opts) => compare_headers(&opts),
        // Handled inside `Opts::parse`.
        Command::Help | Command::Version => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &cli::Opts) -> settings::Result<()> {
    let config = settings::resolve_config(opts.config.as_deref(), opts.data.as_deref())?;
    let steps = match &opts.script {
        Some(path) => script::parse(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    let session = NarrativeSession::from_config(&config)?;
    let program_config = ProgramConfig::default().with_await_init_tasks(opts.wait_for_load);

    let stdout = io::stdout().lock();
    let session = match opts.format {
        OutputFormat::Text => {
            runner::replay(session, TextRenderer::new(stdout), &steps, program_config)?.0
        }
        OutputFormat::Json => {
            runner::replay(session, JsonRenderer::new(stdout), &steps, program_config)?.0
        }
    };

    if let LoadState::Failed(reason) = session.load_state() {
        return Err(ShowcaseError::LoadFailed(reason.clone()));
    }
    Ok(())
}

fn compare_headers(opts: &cli::HeadersOpts) -> settings::Result<()> {
    let report = headers::compare_files(&opts.left, &opts.right, opts.preview)?;
    print!("{report}");
    Ok(())
}
