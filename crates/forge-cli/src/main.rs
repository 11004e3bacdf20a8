mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{codegen::CodegenArgs, config::ConfigSubcommand, ServiceArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "forge",
    about = "Turn a feature ticket into a spec, an OpenAPI draft, a service scaffold, and infra",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .forge/ or .git/)
    #[arg(long, global = true, env = "FORGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write .forge/config.yaml and export the document templates
    Init,

    /// Generate the Markdown spec and OpenAPI draft for a ticket
    Spec {
        /// Ticket file (YAML or JSON)
        ticket: PathBuf,

        /// Text-generation model id (enables the backend)
        #[arg(long)]
        model: Option<String>,
    },

    /// Scaffold the service directory from an OpenAPI document
    Codegen {
        #[command(flatten)]
        args: CodegenArgs,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Scaffold the CDK app and the CI/CD workflow
    Infra {
        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Run spec, codegen, and infra for a ticket in order
    Run {
        /// Ticket file (YAML or JSON)
        ticket: PathBuf,

        /// Text-generation model id (enables the backend)
        #[arg(long)]
        model: Option<String>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the alerts API locally with an in-memory store
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Spec { ticket, model } => cmd::spec::run(&root, &ticket, model, cli.json),
        Commands::Codegen { args, service } => cmd::codegen::run(&root, args, &service, cli.json),
        Commands::Infra { service } => cmd::infra::run(&root, &service, cli.json),
        Commands::Run {
            ticket,
            model,
            service,
        } => cmd::run::run(&root, &ticket, model, &service, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
