mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};

use reference_components::ReferenceComponentsPlugin;
use wright_core::app::{AppContext, LocalAppContext};
use wright_core::kernel::constants::{APP_NAME, APP_VERSION, DEFAULT_APPLICATION_ROOT};
use wright_core::manifest::ManifestFormat;
use wright_core::stage_manager::StageResult;
use wright_core::{AppServer, KernelError, PluginRegistry, ServerSettings, TypeRegistry};

/// Wright: assembles an application from its component manifest
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Print "pong" and exit
    #[arg(long)]
    ping: bool,

    /// Directory holding the application (the manifest lives in WEB-INF/)
    #[arg(long, env = "WRIGHT_APP_DIR", default_value = ".", global = true)]
    app_dir: PathBuf,

    /// Context path the application is served under
    #[arg(long, env = "WRIGHT_ROOT", default_value = DEFAULT_APPLICATION_ROOT, global = true)]
    root: String,

    /// Manifest format (json, yaml or toml)
    #[arg(long, env = "WRIGHT_MANIFEST_FORMAT", global = true)]
    format: Option<ManifestFormat>,

    /// Manifest path relative to the application directory
    #[arg(long, env = "WRIGHT_MANIFEST", global = true)]
    manifest: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble and start the application, then shut it down (default)
    Run,
    /// Show what startup would do without constructing anything
    Plan,
    /// List the constructible types and their constructors
    Types,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let types = match load_types() {
        Ok(types) => types,
        Err(e) => {
            eprintln!("Fatal: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Types => {
            print_types(&types);
            Ok(())
        }
        Commands::Plan => plan(build_server(&args, types)).await,
        Commands::Run => run(build_server(&args, types)).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

/// Statically registered plugins contribute the type universe.
fn load_types() -> Result<TypeRegistry, KernelError> {
    let mut plugins = PluginRegistry::for_current_api()?;
    plugins.register_plugin(Box::new(ReferenceComponentsPlugin))?;
    let types = plugins.build_type_registry()?;
    info!(
        "{} plugin(s) registered {} type(s)",
        plugins.len(),
        types.count()
    );
    Ok(types)
}

fn build_server(args: &CliArgs, types: TypeRegistry) -> AppServer {
    let mut settings = ServerSettings::default();
    if let Some(format) = args.format {
        settings.manifest_format = format;
    }
    settings.manifest_path = args.manifest.clone();

    let context: Arc<dyn AppContext> =
        Arc::new(LocalAppContext::new(args.app_dir.clone(), args.root.clone()));
    AppServer::new(context, types).with_settings(settings)
}

async fn run(mut server: AppServer) -> Result<(), KernelError> {
    println!("Starting {} v{}...", APP_NAME, APP_VERSION);
    server.init().await?;

    let context = server.app_context();
    match context.http_port() {
        Some(http) => println!("Application started at {}", http),
        None => println!("Application started at {}", context.application_root()),
    }
    for name in server.service_manager().service_names() {
        println!("  service: {}", name);
    }
    if let Some(report) = server.assembly_report() {
        for name in &report.skipped {
            println!("  skipped: {} (no dependencies declared)", name);
        }
    }
    for component in server.binding_components().components() {
        println!("  binding: {}", component.name());
    }

    println!("Shutting down...");
    if let Err(e) = server.shutdown().await {
        error!("Shutdown failed: {}", e);
        return Err(e);
    }
    println!("Application stopped.");
    Ok(())
}

async fn plan(server: AppServer) -> Result<(), KernelError> {
    println!("Startup plan for {}:", server.app_context().application_root());
    for (index, (stage_id, result)) in server.plan().await?.iter().enumerate() {
        match result {
            StageResult::Planned(description) => {
                println!("{:>3}. {}: {}", index + 1, stage_id, description)
            }
            other => println!("{:>3}. {}: {}", index + 1, stage_id, other),
        }
    }
    Ok(())
}

fn print_types(types: &TypeRegistry) {
    for type_id in types.type_ids() {
        let signatures: Vec<String> = match types.resolve(&type_id) {
            Ok(definition) => definition
                .constructors()
                .iter()
                .map(|c| c.signature())
                .collect(),
            Err(_) => Vec::new(),
        };
        println!("{} {}", type_id, signatures.join(" "));
    }
}
