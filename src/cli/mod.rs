//! yardtrack command-line interface
//!
//! Runs the API server, or answers a one-off distance prediction straight
//! from a JSON snapshot without starting HTTP.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::prediction::{
    MissingCoordinatePolicy, PredictionConfig, PredictionRequest, PredictionService, TrainerKind,
    WorkerConfig,
};
use crate::store::{Store, StoreSnapshot};

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString    { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", "›".cyan(), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "yardtrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Motorcycle yard tracking API with marker-distance prediction")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "8080")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// JSON snapshot to seed the store with
        #[arg(short, long, env = "DATA_FILE")]
        data: Option<PathBuf>,
    },

    /// Predict a position-to-marker distance from a snapshot
    Predict {
        /// JSON snapshot holding positions, markers and measurements
        #[arg(short, long)]
        data: PathBuf,

        /// Position id
        #[arg(long)]
        position: i64,

        /// Fixed marker id
        #[arg(long)]
        marker: i64,

        /// Trainer (ols, sgd)
        #[arg(long, default_value = "ols")]
        trainer: String,

        /// Missing coordinate handling (exclude, zero)
        #[arg(long, default_value = "exclude")]
        missing: String,
    },

    /// Show record counts of a snapshot
    Info {
        /// JSON snapshot file
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn load_store(path: &PathBuf) -> anyhow::Result<Store> {
    step_run(&format!("Loading {}", path.display()));
    let start = Instant::now();
    let store = Store::from_snapshot(StoreSnapshot::load(path)?)?;
    step_done(&format!("{:.1?}", start.elapsed()));
    Ok(store)
}

pub async fn cmd_predict(
    data_path: &PathBuf,
    position_id: i64,
    marker_id: i64,
    trainer: &str,
    missing: &str,
) -> anyhow::Result<()> {
    section("Predict");

    let config = PredictionConfig::default()
        .with_trainer(trainer.parse::<TrainerKind>()?)
        .with_missing_coordinates(missing.parse::<MissingCoordinatePolicy>()?);
    let store = Arc::new(load_store(data_path)?);
    let service = PredictionService::new(store, &config, WorkerConfig::default());

    step_run(&format!("Fitting {} model", config.trainer));
    let start = Instant::now();
    let result = service
        .predict_distance(PredictionRequest {
            position_id,
            marker_id,
        })
        .await?;
    step_done(&format!("{:.1?}", start.elapsed()));

    println!();
    println!("  {}", kv("Position  ", &result.position_id.to_string()));
    println!("  {}", kv("Marker    ", &result.marker_id.to_string()));
    println!("  {}", kv("Samples   ", &result.training_sample_count.to_string()));
    println!(
        "  {} {}",
        muted("Distance  "),
        format!("{:.4}", result.predicted_distance).green().bold()
    );
    println!();
    Ok(())
}

pub async fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Snapshot Info");
    let store = load_store(data_path)?;
    let stats = store.stats().await;

    println!();
    if let Some(tables) = stats.as_object() {
        for (name, count) in tables {
            println!("  {}", kv(&format!("{:<16}", name), &count.to_string()));
        }
    }
    let complete = store.measurement_rows().await.len();
    println!("  {}", kv(&format!("{:<16}", "training rows"), &complete.to_string()));
    println!();
    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16, data: Option<&PathBuf>) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    section(&format!("yardtrack v{}", env!("CARGO_PKG_VERSION")));
    println!("  {}", kv("API    ", &format!("http://{}:{}/api", host, port)));
    println!("  {}", kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    let mut config = ServerConfig {
        host: host.to_string(),
        port,
        ..Default::default()
    };
    if let Some(path) = data {
        config.data_file = Some(path.display().to_string());
    }

    run_server(config).await
}
