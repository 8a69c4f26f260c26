//! Organ Factcheck - organ health knowledge base with an AI fact-checking CLI.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use organ_factcheck::ai::FactChecker;
use organ_factcheck::config::{self, AppConfig, ConfigLoader, ExportMode, ProviderKind};
use organ_factcheck::display;
use organ_factcheck::knowledge::OrganRepository;
use organ_factcheck::runner::{RunOutcome, RunnerOptions, SessionRunner};

/// Exit code for a run cancelled with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Gemini,
    Claude,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::Claude => ProviderKind::Claude,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "organ-factcheck",
    about = "Organ health recommendations and AI fact checking",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fact-check a subject interactively (default).
    Check(CheckArgs),
    /// List organs with curated recommendations.
    Organs,
    /// Print an organ's recommendations as JSON.
    Show {
        /// Organ name (case-sensitive).
        organ: String,
        /// Print the reduced legacy format.
        #[arg(long)]
        legacy: bool,
    },
}

#[derive(Args, Default)]
struct CheckArgs {
    /// Export the session without asking.
    #[arg(long, conflicts_with = "no_export")]
    export: bool,
    /// Never export the session.
    #[arg(long)]
    no_export: bool,
    /// Directory session exports are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Provider tried first.
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,
    /// Fallback provider, tried in the order given (repeatable).
    #[arg(long = "fallback", value_enum)]
    fallbacks: Vec<ProviderArg>,
    /// Suppress per-provider progress output.
    #[arg(long)]
    non_interactive: bool,
}

impl CheckArgs {
    fn apply(self, config: &mut AppConfig) {
        if self.export {
            config.output.export = ExportMode::Always;
        } else if self.no_export {
            config.output.export = ExportMode::Never;
        }
        if let Some(dir) = self.output_dir {
            config.output.dir = dir;
        }
        if let Some(provider) = self.provider {
            config.agent.primary = provider.into();
        }
        if !self.fallbacks.is_empty() {
            config.agent.fallbacks = self.fallbacks.into_iter().map(Into::into).collect();
        }
        if self.non_interactive {
            config.agent.interactive = false;
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_repository(config: &AppConfig) -> Result<&'static OrganRepository, String> {
    match &config.knowledge.data_path {
        Some(path) => OrganRepository::init_from_path(path).map_err(|e| e.to_string()),
        None => Ok(OrganRepository::builtin()),
    }
}

async fn run_check(args: CheckArgs, mut config: AppConfig, repo: &'static OrganRepository) -> ExitCode {
    args.apply(&mut config);
    if let Err(e) = config::validate(&config) {
        display::print_error(&e.to_string());
        return ExitCode::FAILURE;
    }

    let agent = match FactChecker::from_config(&config.agent, &config.providers) {
        Ok(agent) => agent.with_knowledge(repo),
        Err(e) => {
            display::print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Ctrl-C received");
            watcher.cancel();
        }
    });
    // Let the watcher register its handler before the first prompt.
    tokio::task::yield_now().await;

    let mut runner = SessionRunner::new(
        agent,
        BufReader::new(tokio::io::stdin()),
        io::stdout(),
        RunnerOptions::from(&config.output),
    );

    let outcome = runner.run(&cancel).await;
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else if outcome == RunOutcome::Interrupted {
        ExitCode::from(EXIT_INTERRUPTED)
    } else {
        tracing::debug!(?outcome, "Session did not complete");
        ExitCode::FAILURE
    }
}

fn show_organ(repo: &OrganRepository, organ: &str, legacy: bool) -> ExitCode {
    if !repo.contains(organ) {
        tracing::warn!(organ, "No curated data for organ, showing general guidance");
    }
    let json = if legacy {
        serde_json::to_string_pretty(&repo.convert_to_legacy_format(organ))
    } else {
        serde_json::to_string_pretty(repo.get_organ_recommendations(organ))
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            display::print_error(&format!("Failed to serialize recommendations: {e}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ExitCode {
    let loader = cli.config.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let repo = match load_repository(&config) {
        Ok(repo) => repo,
        Err(e) => {
            display::print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Commands::Check(CheckArgs::default())) {
        Commands::Check(args) => run_check(args, config, repo).await,
        Commands::Organs => {
            for organ in repo.get_all_supported_organs() {
                println!("{organ}");
            }
            ExitCode::SUCCESS
        }
        Commands::Show { organ, legacy } => show_organ(repo, &organ, legacy),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            display::print_error(&format!("Failed to start async runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };
    let code = runtime.block_on(run(cli));
    // A stdin read abandoned on Ctrl-C would otherwise block shutdown until
    // the user presses Enter.
    runtime.shutdown_background();
    code
}
