//! Pipeline editor command line.
//!
//! Usage:
//!     pipeline-editor catalog --kind condition
//!     pipeline-editor run ops.yaml --hydrate saved.json
//!     pipeline-editor template "auto reply to my gmail"

mod render;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use colored::Colorize;
use pe_core::catalog::{BlockCatalog, Catalog};
use pe_core::command::{CommandOutcome, CommandSession, TemplateInterpreter};
use pe_core::config::loader::load_config;
use pe_core::config::models::EditorConfig;
use pe_core::editor::PipelineStore;
use pe_core::templates::TemplateLibrary;
use pe_protocol::block_models::BlockKind;
use pe_protocol::ipc::EditorOp;
use pe_protocol::record_models::BlockRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pipeline-editor", about = "Edit workflow pipelines from the terminal")]
struct Args {
    /// Project root containing `.pipeline-editor/`
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the block catalog
    Catalog {
        /// Only show one kind (condition, action, integration, reference)
        #[arg(long, value_parser = parse_kind)]
        kind: Option<BlockKind>,
    },

    /// Replay a YAML or JSON list of editor operations
    Run {
        script: PathBuf,

        /// JSON file with the block records to start from
        #[arg(long)]
        hydrate: Option<PathBuf>,

        /// Print the persisted records as JSON instead of the rail
        #[arg(long)]
        json: bool,
    },

    /// Build a pipeline from a spoken or typed command
    Template {
        transcript: String,

        #[arg(long)]
        hydrate: Option<PathBuf>,
    },
}

fn parse_kind(value: &str) -> Result<BlockKind, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown block kind '{value}'"))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pe_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)
        .await
        .wrap_err_with(|| format!("loading configuration from {}", args.config.display()))?;
    let catalog = config.catalog()?;

    match args.command {
        Command::Catalog { kind } => {
            render::print_catalog(&catalog, kind);
            Ok(())
        }
        Command::Run {
            script,
            hydrate,
            json,
        } => run_script(&config, catalog, &script, hydrate.as_deref(), json),
        Command::Template {
            transcript,
            hydrate,
        } => run_template(&config, catalog, &transcript, hydrate.as_deref()).await,
    }
}

fn new_store(
    config: &EditorConfig,
    catalog: Catalog,
    hydrate: Option<&Path>,
) -> color_eyre::Result<PipelineStore> {
    let catalog: Arc<dyn BlockCatalog> = Arc::new(catalog);
    let mut store = PipelineStore::new(catalog, &config.settings);
    if let Some(path) = hydrate {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let records: Vec<BlockRecord> = serde_json::from_str(&content)
            .wrap_err_with(|| format!("parsing block records in {}", path.display()))?;
        store.hydrate(records);
    }
    Ok(store)
}

fn run_script(
    config: &EditorConfig,
    catalog: Catalog,
    script: &Path,
    hydrate: Option<&Path>,
    json: bool,
) -> color_eyre::Result<()> {
    let mut store = new_store(config, catalog, hydrate)?;

    let content = std::fs::read_to_string(script)
        .wrap_err_with(|| format!("reading {}", script.display()))?;
    let ops: Vec<EditorOp> = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("parsing operations in {}", script.display()))?;

    for (step, op) in ops.into_iter().enumerate() {
        tracing::debug!(step, ?op, "Applying operation");
        store
            .apply(op)
            .wrap_err_with(|| format!("operation #{} failed", step + 1))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&store.persisted_records())?);
    } else {
        render::print_store(&store);
    }
    Ok(())
}

async fn run_template(
    config: &EditorConfig,
    catalog: Catalog,
    transcript: &str,
    hydrate: Option<&Path>,
) -> color_eyre::Result<()> {
    let mut store = new_store(config, catalog, hydrate)?;
    let interpreter = Arc::new(TemplateInterpreter::new(TemplateLibrary::builtin()?));
    let session = CommandSession::new(interpreter.clone());

    match session.process(transcript).await? {
        CommandOutcome::Workflow(_) => {
            let template = interpreter
                .library()
                .find_matching(transcript)
                .ok_or_else(|| eyre!("template disappeared while matching"))?;
            store
                .apply_template(&template.blocks)
                .wrap_err_with(|| format!("applying template {}", template.id))?;

            println!("{}", template.message.green());
            println!();
            render::print_store(&store);
        }
        CommandOutcome::Cancelled => println!("{}", "Cancelled.".yellow()),
        CommandOutcome::Empty => {
            let names = interpreter.library().names().join(", ");
            println!(
                "{} Try one of: {}",
                "No matching workflow.".yellow(),
                names
            );
        }
        CommandOutcome::Busy | CommandOutcome::Discarded => {
            println!("{}", "Command was not processed.".yellow())
        }
    }
    Ok(())
}
