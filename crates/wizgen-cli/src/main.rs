use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wizgen::{
    commands::{
        config::{self, ConfigAction},
        generate::{self, GenerateArgs},
        history::{self, HistoryArgs},
    },
    common::ProjectOpts,
    errors::PreflightError,
    logger, GlobalOpts,
};

/// Environment variable holding a tracing filter for the library crates
const LOG_ENV_VAR: &str = "WIZGEN_LOG";

#[derive(Parser)]
#[command(name = "wizgen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Component manifest generator",
    long_about = "wizgen scans TypeScript sources for @wizard doc comments and generates a categorized, versioned component manifest."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    // Used when no subcommand is given
    #[command(flatten)]
    generate: GenerateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan sources and write the manifest, registry and history (default)
    Generate(GenerateArgs),
    /// Show the stored version history
    History(HistoryArgs),
    /// Inspect the configuration
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
        #[command(flatten)]
        project: ProjectOpts,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(
        cli.global.verbosity_level(),
        false,
        cli.global.log_file.as_deref(),
    ) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    logger::set_quiet(cli.global.quiet);
    init_tracing(&cli.global);

    let result = match &cli.command {
        None => generate::handle_generate(&cli.generate),
        Some(Commands::Generate(args)) => generate::handle_generate(args),
        Some(Commands::History(args)) => history::handle_history(args),
        Some(Commands::Config { action, project }) => config::handle_config(action.clone(), project),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        if let Some(preflight) = e.downcast_ref::<PreflightError>() {
            logger::hint(preflight.hint());
        }
        logger::show_log_path();
        std::process::exit(1);
    }
}

fn init_tracing(opts: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(opts.tracing_directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
