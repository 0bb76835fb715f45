// planfact CLI - headless plan-vs-actual expense reports

mod exit_codes;
mod recon;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "planfact")]
#[command(about = "Plan-vs-actual expense reconciliation (headless)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile planned vs actual expenses and show the rows visible to a user
    #[command(after_help = "\
Examples:
  planfact run report.toml --user director
  planfact run report.toml --user director --manager Лана --manager Султан
  planfact run report.toml --user lana --project Альфа --json
  planfact run report.toml --user director --output report.json")]
    Run {
        /// Path to the report config (.toml)
        config: PathBuf,

        /// Login from the [users] table
        #[arg(long, env = "PLANFACT_USER")]
        user: String,

        /// Limit to these managers (admin only). Repeatable.
        #[arg(long = "manager", value_name = "NAME")]
        managers: Vec<String>,

        /// Limit to these projects. Repeatable.
        #[arg(long = "project", value_name = "NAME")]
        projects: Vec<String>,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show revenue and margin plans per manager
    #[command(after_help = "\
Examples:
  planfact kpi report.toml
  planfact kpi report.toml --json")]
    Kpi {
        /// Path to the report config (.toml)
        config: PathBuf,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a report config without loading data
    Validate {
        /// Path to the report config (.toml)
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  planfact-recon ", env!("CARGO_PKG_VERSION"),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None => Err(CliError {
            code: EXIT_USAGE,
            message: "no command given".into(),
            hint: Some("planfact --help for more information".into()),
        }),
        Some(Commands::Run {
            config,
            user,
            managers,
            projects,
            json,
            output,
        }) => recon::cmd_run(recon::RunArgs {
            config,
            user,
            managers,
            projects,
            json,
            output,
        }),
        Some(Commands::Kpi { config, json }) => recon::cmd_kpi(config, json),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
