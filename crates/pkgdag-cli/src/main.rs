#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use pkgdag_core::ErrorCode;
use pkgdag_core::config::{self, ProjectConfig};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "pkgdag",
    author,
    version,
    about = "pkgdag: build-order graphs for package config collections",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Print a sorted list of package build targets",
        long_about = "Print one build target per package, each package before the packages it requires. \
                      With package names, only those packages and their dependencies are listed.",
        after_help = "EXAMPLES:\n    # Every package, dependents first\n    pkgdag text -d ./os\n\n    # What curl needs, in build order, for arm64\n    pkgdag text curl --build-order -a arm64\n\n    # Everything that has to be rebuilt when openssl changes\n    pkgdag text openssl -D"
    )]
    Text(cmd::text::TextArgs),

    #[command(
        about = "Render the package graph as Graphviz DOT",
        after_help = "EXAMPLES:\n    # Whole graph to a file\n    pkgdag dot -o dag.dot\n\n    # Render the subgraph of curl to SVG\n    pkgdag dot curl | dot -Tsvg > curl.svg"
    )]
    Dot(cmd::dot::DotArgs),

    #[command(
        about = "List the direct dependencies of a package",
        after_help = "EXAMPLES:\n    # What gcc requires\n    pkgdag deps gcc\n\n    # What requires glibc\n    pkgdag deps glibc -D --json"
    )]
    Deps(cmd::deps::DepsArgs),

    #[command(
        about = "List remote sources fetched by package builds",
        after_help = "EXAMPLES:\n    # URI and cache key of every source\n    pkgdag fetches\n\n    # Full detail for one package\n    pkgdag fetches openssl --format json"
    )]
    Fetches(cmd::fetches::FetchesArgs),

    #[command(
        about = "Summarize the package graph",
        after_help = "EXAMPLES:\n    pkgdag summary\n    pkgdag summary --json"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    pkgdag completions bash > /etc/bash_completion.d/pkgdag"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Log to stderr; stdout carries command output only.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PKGDAG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "pkgdag=debug,info"
        } else {
            "pkgdag=info,warn"
        })
    });

    let format = env::var("PKGDAG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn settings_error(err: &anyhow::Error) -> CliError {
    let code = ErrorCode::SettingsParseError;
    CliError {
        message: format!("{err:#}"),
        suggestion: code.hint().map(str::to_string),
        error_code: Some(code.code().to_string()),
    }
}

fn run(cli: Cli, project: &ProjectConfig, output: OutputMode) -> anyhow::Result<()> {
    match cli.command {
        Commands::Text(ref args) => cmd::text::run_text(args, project, output),
        Commands::Dot(ref args) => cmd::dot::run_dot(args, project),
        Commands::Deps(ref args) => cmd::deps::run_deps(args, project, output),
        Commands::Fetches(ref args) => cmd::fetches::run_fetches(args, project, output),
        Commands::Summary(ref args) => cmd::summary::run_summary(args, project, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn fail(output: OutputMode, error: &CliError) -> ExitCode {
    if render_error(output, error).is_err() {
        eprintln!("error: {}", error.message);
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user = config::load_user_config();
    let output = output::resolve_output_mode(
        cli.format,
        cli.json,
        user.as_ref().ok().and_then(|u| u.output.as_deref()),
    );
    if let Err(err) = &user {
        return fail(output, &settings_error(err));
    }

    let project = match env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|root| config::load_project_config(&root))
    {
        Ok(project) => project,
        Err(err) => return fail(output, &settings_error(&err)),
    };
    debug!(?project, ?output, "resolved settings");

    match run(cli, &project, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(output, &CliError::from_anyhow(&err)),
    }
}
