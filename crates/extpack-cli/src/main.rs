use clap::{Parser, Subcommand};
use extpack::{
    commands::{
        build,
        config::{self, ConfigAction},
        probe,
    },
    GlobalOpts,
};
use extpack_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "extpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Browser extension manifest builder",
    long_about = "extpack inspects a browser-extension project and writes its manifest.json."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble and write manifest.json for a project
    Build(build::BuildArgs),
    /// Show which pages and scripts a project would register
    Probe(probe::ProbeArgs),
    /// Configure extpack
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.no_stdout)
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(cli.global.no_stdout);

    let result = match cli.command {
        Commands::Build(args) => build::handle_build(args, &cli.global).await,
        Commands::Probe(args) => probe::handle_probe(args, &cli.global).await,
        Commands::Config { action } => {
            config::handle_config(action.unwrap_or(ConfigAction::Show), &cli.global)
        }
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(no_stdout: bool) {
    let filter: EnvFilter = if no_stdout {
        "off".into()
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| logger::verbosity_to_filter().into())
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
