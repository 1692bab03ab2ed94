#![forbid(unsafe_code)]

//! Command-line argument parsing for the showcase runner.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `EXO_SHOWCASE_*` prefix; explicit flags win.

use std::env;
use std::path::PathBuf;
use std::process;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
Exoplanet Narrative Showcase

USAGE:
    exo-showcase [OPTIONS]
    exo-showcase headers <FILE_A> <FILE_B> [--preview=N]

OPTIONS:
    --data=PATH       Catalog CSV to load (overrides the config file)
    --script=PATH     Interaction script to replay (default: render once)
    --format=FORMAT   Frame output: 'text' (default) or 'json'
    --config=PATH     TOML session config (data path, slider layout)
    --no-wait         Do not wait for the dataset load before the script
    --help, -h        Show this help message
    --version, -V     Show version

SCRIPT COMMANDS:
    year N            Focus discovery year N on the overview
    select NAME       Open the comparison for the named planet
    select-none       Report a selection that resolved to no record
    click [mark]      Background click (mark: the click hit a data mark)
    explore           Open the dashboard
    back              Return to the overview
    reset             Restore dashboard defaults
    set PARAM VALUE   Change one dashboard parameter
    quit              Stop replaying

SCENES:
    S1  Overview      Discovery histogram and overview scatter plots
    S2  Comparison    One planet against the Earth reference ranges
    S3  Dashboard     Filterable scatter with selectable axes

ENVIRONMENT VARIABLES:
    EXO_SHOWCASE_DATA     Override --data
    EXO_SHOWCASE_SCRIPT   Override --script
    EXO_SHOWCASE_FORMAT   Override --format (text|json)
    EXO_SHOWCASE_CONFIG   Override --config
    EXO_LOG               Log filter directives (default: info)";

/// Default number of data rows shown by `headers`.
pub const DEFAULT_PREVIEW_ROWS: usize = 3;

/// How frames are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options for replaying a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub data: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
    /// Wait for the initial load before replaying the script.
    pub wait_for_load: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            data: None,
            script: None,
            format: OutputFormat::Text,
            config: None,
            wait_for_load: true,
        }
    }
}

/// Options for the `headers` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadersOpts {
    pub left: PathBuf,
    pub right: PathBuf,
    pub preview: usize,
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Headers(HeadersOpts),
    Help,
    Version,
}

impl Opts {
    /// Parse process arguments and environment variables.
    ///
    /// Prints help or version and exits when asked to; exits with status 1
    /// on a malformed command line.
    pub fn parse() -> Command {
        let args: Vec<String> = env::args().skip(1).collect();
        match parse_from(args, |key| env::var(key).ok()) {
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("exo-showcase {VERSION}");
                process::exit(0);
            }
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

/// Parse `args` (without the program name), reading overrides through `env`.
pub fn parse_from<I, F>(args: I, env: F) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.first().map(String::as_str) == Some("headers") {
        return parse_headers(&args[1..]);
    }

    let mut opts = Opts::default();

    // Apply environment variable defaults first
    if let Some(val) = env("EXO_SHOWCASE_DATA") {
        opts.data = Some(PathBuf::from(val));
    }
    if let Some(val) = env("EXO_SHOWCASE_SCRIPT") {
        opts.script = Some(PathBuf::from(val));
    }
    if let Some(val) = env("EXO_SHOWCASE_FORMAT")
        && let Some(format) = OutputFormat::parse(&val)
    {
        opts.format = format;
    }
    if let Some(val) = env("EXO_SHOWCASE_CONFIG") {
        opts.config = Some(PathBuf::from(val));
    }

    for arg in &args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--no-wait" => opts.wait_for_load = false,
            other => {
                if let Some(val) = other.strip_prefix("--data=") {
                    opts.data = Some(non_empty_path("--data", val)?);
                } else if let Some(val) = other.strip_prefix("--script=") {
                    opts.script = Some(non_empty_path("--script", val)?);
                } else if let Some(val) = other.strip_prefix("--config=") {
                    opts.config = Some(non_empty_path("--config", val)?);
                } else if let Some(val) = other.strip_prefix("--format=") {
                    opts.format = OutputFormat::parse(val)
                        .ok_or_else(|| format!("Invalid --format value: {val}"))?;
                } else {
                    return Err(format!("Unknown argument: {other}"));
                }
            }
        }
    }

    Ok(Command::Run(opts))
}

fn parse_headers(args: &[String]) -> Result<Command, String> {
    let mut files = Vec::new();
    let mut preview = DEFAULT_PREVIEW_ROWS;
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            other => {
                if let Some(val) = other.strip_prefix("--preview=") {
                    preview = val
                        .parse()
                        .map_err(|_| format!("Invalid --preview value: {val}"))?;
                } else if other.starts_with("--") {
                    return Err(format!("Unknown argument: {other}"));
                } else {
                    files.push(PathBuf::from(other));
                }
            }
        }
    }
    match <[PathBuf; 2]>::try_from(files) {
        Ok([left, right]) => Ok(Command::Headers(HeadersOpts {
            left,
            right,
            preview,
        })),
        Err(files) => Err(format!(
            "headers expects exactly two files, got {}",
            files.len()
        )),
    }
}

fn non_empty_path(flag: &str, value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        Err(format!("Invalid {flag} value: empty path"))
    } else {
        Ok(PathBuf::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Command, String> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        parse_from(args.iter().map(|s| (*s).to_owned()), |key| {
            env.get(key).cloned()
        })
    }

    fn run_opts(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected run options, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert!(opts.data.is_none());
        assert!(opts.script.is_none());
        assert_eq!(opts.format, OutputFormat::Text);
        assert!(opts.wait_for_load);
        assert_eq!(run_opts(&[], &[]), opts);
    }

    #[test]
    fn flags_are_parsed() {
        let opts = run_opts(
            &[
                "--data=catalog.csv",
                "--script=tour.txt",
                "--format=json",
                "--config=exo.toml",
                "--no-wait",
            ],
            &[],
        );
        assert_eq!(opts.data, Some(PathBuf::from("catalog.csv")));
        assert_eq!(opts.script, Some(PathBuf::from("tour.txt")));
        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.config, Some(PathBuf::from("exo.toml")));
        assert!(!opts.wait_for_load);
    }

    #[test]
    fn flags_override_environment() {
        let env = [
            ("EXO_SHOWCASE_DATA", "env.csv"),
            ("EXO_SHOWCASE_FORMAT", "json"),
            ("EXO_SHOWCASE_SCRIPT", "env-script.txt"),
        ];
        let opts = run_opts(&["--data=flag.csv"], &env);
        assert_eq!(opts.data, Some(PathBuf::from("flag.csv")));
        assert_eq!(opts.script, Some(PathBuf::from("env-script.txt")));
        assert_eq!(opts.format, OutputFormat::Json);
    }

    #[test]
    fn invalid_env_format_is_ignored() {
        let opts = run_opts(&[], &[("EXO_SHOWCASE_FORMAT", "yaml")]);
        assert_eq!(opts.format, OutputFormat::Text);
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse(&["--format=yaml"], &[]).unwrap_err().contains("--format"));
        assert!(parse(&["--data="], &[]).unwrap_err().contains("empty path"));
        assert!(parse(&["--frobnicate"], &[]).unwrap_err().contains("Unknown"));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--data=x.csv", "-h"], &[]), Ok(Command::Help));
        assert_eq!(parse(&["--version"], &[]), Ok(Command::Version));
    }

    #[test]
    fn headers_subcommand() {
        let command = parse(&["headers", "a.csv", "b.csv", "--preview=5"], &[]).unwrap();
        assert_eq!(
            command,
            Command::Headers(HeadersOpts {
                left: "a.csv".into(),
                right: "b.csv".into(),
                preview: 5,
            })
        );

        let Ok(Command::Headers(opts)) = parse(&["headers", "a.csv", "b.csv"], &[]) else {
            panic!("expected headers command");
        };
        assert_eq!(opts.preview, DEFAULT_PREVIEW_ROWS);

        assert!(parse(&["headers", "a.csv"], &[]).unwrap_err().contains("two files"));
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_scenes_and_env_vars() {
        assert!(HELP_TEXT.contains("S1  Overview"));
        assert!(HELP_TEXT.contains("S3  Dashboard"));
        assert!(HELP_TEXT.contains("EXO_SHOWCASE_DATA"));
        assert!(HELP_TEXT.contains("EXO_LOG"));
    }
}
