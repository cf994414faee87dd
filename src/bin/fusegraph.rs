//! Fusegraph CLI: world inspection, entity ingestion and ontology export.
//!
//! Usage:
//!   fusegraph worlds [--config path]
//!   fusegraph ingest <entities.json> [--world id] [--config path]
//!   fusegraph export <entities.json> [--db path] [--config path]

use clap::{Parser, Subcommand};
use fusegraph::{
    EventBus, FusedEntity, FusionConfig, FusionError, OntologyLearner, OpenStore, SnapshotStore,
    SqliteSnapshotStore, WorldOrchestrator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "fusegraph",
    version,
    about = "Multi-domain entity fusion and ontology learning"
)]
struct Cli {
    /// YAML configuration file (defaults to the four standard worlds)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the state of every configured world
    Worlds,
    /// Register entities from a JSON array and report correlations
    Ingest {
        /// JSON file holding an array of fused entities
        entities: PathBuf,
        /// Target world (defaults to the active world)
        #[arg(long)]
        world: Option<String>,
    },
    /// Ingest entities, then write an ontology export to the snapshot store
    Export {
        /// JSON file holding an array of fused entities
        entities: PathBuf,
        /// Target world (defaults to the active world)
        #[arg(long)]
        world: Option<String>,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

/// Get the default database path (~/.local/share/fusegraph/exports.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("fusegraph").join("exports.db")
}

fn init_tracing() {
    let log_format = std::env::var("FUSEGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_env("FUSEGRAPH_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "fusegraph=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<FusionConfig, FusionError> {
    match path {
        Some(path) => FusionConfig::from_path(path),
        None => Ok(FusionConfig::default()),
    }
}

fn load_entities(path: &Path) -> Result<Vec<FusedEntity>, FusionError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

struct Runtime {
    orchestrator: WorldOrchestrator,
    learner: Arc<OntologyLearner>,
}

fn build_runtime(config: &FusionConfig) -> Result<Runtime, FusionError> {
    let events = EventBus::default();
    let learner = Arc::new(config.learner(events.clone()));
    let orchestrator = config.orchestrator(events, Arc::clone(&learner))?;
    Ok(Runtime {
        orchestrator,
        learner,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_worlds(runtime: &Runtime) -> i32 {
    let active = runtime.orchestrator.active_world();
    for state in runtime.orchestrator.get_all_world_states() {
        println!(
            "{}{:<12} {:<12} {:>7}/{:<7} fusion={:<5} domains={}",
            if state.world_id == active { "*" } else { " " },
            state.world_id,
            state.name,
            state.entity_count,
            state.max_entities,
            state.fusion_enabled,
            state
                .active_domains
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    0
}

/// Register every entity, continuing past rejections. Returns the number admitted.
fn ingest(runtime: &Runtime, entities: Vec<FusedEntity>, world: Option<&str>) -> Result<usize, FusionError> {
    let world_id = match world {
        Some(id) => id.to_string(),
        None => runtime.orchestrator.active_world(),
    };
    runtime.orchestrator.world(&world_id)?;

    let total = entities.len();
    let mut admitted = 0;
    for entity in entities {
        let global_id = entity.global_id.clone();
        match runtime.orchestrator.add_entity_to_world(&world_id, entity) {
            Ok(admission) => {
                admitted += 1;
                if !admission.correlation.is_empty() {
                    eprintln!(
                        "{} correlated with {}",
                        global_id,
                        admission.correlation.correlated_ids().join(", ")
                    );
                }
            }
            Err(e) => eprintln!("Rejected {}: {}", global_id, e),
        }
    }
    let learned = runtime.learner.drain();
    tracing::info!(world = %world_id, total, admitted, learned, "ingest complete");
    Ok(admitted)
}

fn cmd_ingest(runtime: &Runtime, entities: &Path, world: Option<&str>) -> i32 {
    let result = load_entities(entities).and_then(|e| ingest(runtime, e, world));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return 1;
    }

    let report = serde_json::json!({
        "cross_world_correlations": runtime.orchestrator.cross_world_correlations(),
        "ontology": runtime.learner.get_metrics(),
    });
    print_json(&report)
}

fn cmd_export(runtime: &Runtime, entities: &Path, world: Option<&str>, db: Option<PathBuf>) -> i32 {
    if let Err(e) = load_entities(entities).and_then(|e| ingest(runtime, e, world)) {
        eprintln!("Error: {}", e);
        return 1;
    }

    let db_path = db.unwrap_or_else(default_db_path);
    let store = match SqliteSnapshotStore::open(&db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: failed to open database: {}", e);
            return 1;
        }
    };
    let export = runtime.learner.export();
    match store.save_export(&export) {
        Ok(id) => {
            println!(
                "Saved export {} ({} nodes, {} relationships, {} patterns) to {}",
                id,
                export.metrics.node_count,
                export.metrics.relationship_count,
                export.metrics.pattern_count,
                db_path.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let runtime = match load_config(cli.config.as_deref()).and_then(|c| build_runtime(&c)) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Worlds => cmd_worlds(&runtime),
        Commands::Ingest { entities, world } => cmd_ingest(&runtime, &entities, world.as_deref()),
        Commands::Export { entities, world, db } => {
            cmd_export(&runtime, &entities, world.as_deref(), db)
        }
    };
    std::process::exit(code);
}
