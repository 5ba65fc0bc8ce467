use cauldron_cli::commands::{
    check,
    config::{self, ConfigAction},
    form, plugins,
};
use cauldron_cli::{CliError, GlobalOpts};
use cauldron_logger as logger;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cauldron")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Cauldron plugin form host",
    long_about = "Cauldron resolves declarative plugin definitions into forms, fills them and hands them to execution."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure cauldron
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// List plugins in the plugins directory
    Plugins {
        /// Directory to scan instead of the configured plugins-path
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Load and validate a plugin definition
    Check {
        /// Plugin folder containing plugin.yaml
        plugin_dir: PathBuf,
    },
    /// Resolve a plugin form, optionally from its example, and submit it
    Form(form::FormArgs),
}

fn init_tracing(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter(verbosity).into()),
        )
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { action } => config::handle_config(action, &cli.global),
        Commands::Plugins { dir } => plugins::list_plugins(&cli.global, dir),
        Commands::Check { plugin_dir } => check::check_plugin(&plugin_dir),
        Commands::Form(args) => form::run_form(args),
    }
}

fn main() {
    let cli = Cli::parse();
    let verbosity = cli.global.verbosity_level();

    if let Err(e) = logger::init_with_verbosity(verbosity, cli.global.quiet) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(verbosity);

    if let Err(e) = run(cli) {
        logger::error(&e.to_string());
        if verbosity > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
