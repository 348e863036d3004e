use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

use agentops_rs::agentops::config::{Settings, WorkerKind};
use agentops_rs::agentops::loader::CatalogLoader;
use agentops_rs::agentops::server::{self, AppState};
use agentops_rs::agentops::store::RecordStore;
use agentops_rs::agentops::workflow::{
    ExecutionState, Message, PlaceholderWorker, WorkflowBuilder,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// YAML catalog used to seed the store
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Step worker: placeholder or model
        #[arg(short, long)]
        worker: Option<WorkerKind>,
    },
    /// Compile and run one workflow from a catalog
    Run {
        /// Path to the catalog file
        #[arg(short, long)]
        catalog: PathBuf,

        /// Id of the workflow to run
        #[arg(short = 'i', long)]
        workflow: i64,

        /// Optional opening user message
        #[arg(long)]
        input: Option<String>,

        /// Step worker: placeholder or model
        #[arg(short, long)]
        worker: Option<WorkerKind>,
    },
    /// Compile every workflow in a catalog
    Validate {
        /// Path to the catalog file
        #[arg(short, long)]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut settings = Settings::from_env()?;

    match args.command {
        Commands::Serve {
            host,
            port,
            catalog,
            worker,
        } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if catalog.is_some() {
                settings.catalog = catalog;
            }
            if let Some(worker) = worker {
                settings.worker = worker;
            }

            let store = RecordStore::new();
            if let Some(path) = &settings.catalog {
                CatalogLoader::load(path)
                    .with_context(|| format!("Failed to load catalog {}", path.display()))?
                    .seed(&store)
                    .await;
            }

            let builder = WorkflowBuilder::new(settings.step_worker()?);
            log::info!("Using step worker: {}", builder.worker_name());

            server::serve(&settings, AppState::new(store, builder)).await?;
        }
        Commands::Run {
            catalog,
            workflow,
            input,
            worker,
        } => {
            if let Some(worker) = worker {
                settings.worker = worker;
            }

            let store = RecordStore::new();
            CatalogLoader::load(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?
                .seed(&store)
                .await;

            let Some(record) = store.get_workflow(workflow).await else {
                bail!("Workflow {} not found in {}", workflow, catalog.display());
            };

            let initial = match input {
                Some(text) => ExecutionState::with_messages(vec![Message::new("user", text)]),
                None => ExecutionState::default(),
            };

            let builder = WorkflowBuilder::new(settings.step_worker()?);
            let outcome = builder
                .run(&record, &store.agent_table().await, initial)
                .await?;

            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Validate { catalog } => {
            let parsed = CatalogLoader::load(&catalog)
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;

            let store = RecordStore::new();
            let workflows = parsed.workflows.clone();
            parsed.seed(&store).await;

            let agents = store.agent_table().await;
            // Compilation never calls the worker
            let builder = WorkflowBuilder::new(Arc::new(PlaceholderWorker));
            let mut failures = 0;

            for workflow in &workflows {
                match builder.compile(workflow, &agents) {
                    Ok(chain) => {
                        println!(
                            "[ok] {} ({}): {}",
                            workflow.id,
                            workflow.name,
                            chain.node_ids().join(" -> ")
                        );
                    }
                    Err(e) => {
                        failures += 1;
                        println!("[error] {} ({}): {}", workflow.id, workflow.name, e);
                    }
                }
            }

            if failures > 0 {
                bail!(
                    "{} of {} workflows failed to compile",
                    failures,
                    workflows.len()
                );
            }
        }
    }

    Ok(())
}
