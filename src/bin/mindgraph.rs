//! Mindgraph CLI — maintenance commands for a knowledge graph database.
//!
//! Usage:
//!   mindgraph stats [--db path]
//!   mindgraph sweep [--db path] [--limit n]

use clap::{Parser, Subcommand};
use mindgraph::{CreatorOnly, GraphEngine, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "mindgraph",
    version,
    about = "Graph consistency engine for directed knowledge graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entity counts
    Stats {
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Remove dangling edges and tags left by interrupted cascades
    Sweep {
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Maximum records per scan
        #[arg(long, default_value_t = 10_000)]
        limit: usize,
    },
}

/// Get the default database path (~/.local/share/mindgraph/mindgraph.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let dir = data_dir.join("mindgraph");
    std::fs::create_dir_all(&dir).ok();
    dir.join("mindgraph.db")
}

fn open_engine(db: Option<PathBuf>) -> Result<GraphEngine, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store =
        SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    Ok(GraphEngine::new(Arc::new(store), Arc::new(CreatorOnly)))
}

/// Bound on full-table scans from the CLI.
const SCAN_LIMIT: usize = 1_000_000;

async fn cmd_stats(engine: &GraphEngine) -> i32 {
    let deadline = mindgraph::Deadline::none();
    let nodes = engine.list_nodes(SCAN_LIMIT, &deadline).await;
    let edges = engine.list_edges(SCAN_LIMIT, &deadline).await;
    match (nodes, edges) {
        (Ok(nodes), Ok(edges)) => {
            println!("{:<12} {:>8}", "ENTITY", "COUNT");
            println!("{}", "-".repeat(21));
            println!("{:<12} {:>8}", "nodes", nodes.len());
            println!("{:<12} {:>8}", "edges", edges.len());
            0
        }
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_sweep(engine: &GraphEngine, limit: usize) -> i32 {
    match engine.sweep(limit, &mindgraph::Deadline::none()).await {
        Ok(report) => {
            println!(
                "Scanned {} edges, {} tags; removed {} dangling edges, {} dangling tags",
                report.edges_scanned,
                report.tags_scanned,
                report.edges_removed,
                report.tags_removed
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Stats { db } => match open_engine(db) {
            Ok(engine) => cmd_stats(&engine).await,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Sweep { db, limit } => match open_engine(db) {
            Ok(engine) => cmd_sweep(&engine, limit).await,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
