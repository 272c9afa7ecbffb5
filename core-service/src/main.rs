//! Shelter Life-Support Monitor - Main Entry Point
//!
//! Streams environmental status to one visualization client while the
//! operator switches scenarios from the terminal.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                   SHELTER LIFE-SUPPORT CORE                    │
//! ├────────────────────────────────────────────────────────────────┤
//! │  stdin thread ──┐                                              │
//! │  peer reader ───┼─> command channel ─> ingestion ─> state      │
//! │                                                      │         │
//! │  tick loop <─────────────── copy of state ───────────┘         │
//! │     ├─ assessment / decision table                             │
//! │     ├─ consumption forecast (live emergency level)             │
//! │     └─ JSON line ─> TCP peer                                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod constants;
mod error;
mod logic;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;
use crate::logic::analysis::Analyzer;
use crate::logic::commands;
use crate::logic::forecast::{ConsumptionModel, Resource};
use crate::logic::state::SharedState;
use crate::logic::stream_loop::{self, StreamOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelter_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    tracing::info!("{} v{} starting...", constants::APP_NAME, constants::APP_VERSION);

    let model = ConsumptionModel::load_or_train(
        config.model_path.as_deref(),
        Resource::Water,
        config.baseline_population,
        config.training_days,
        config.training_seed,
    )
    .map_err(AppError::Model)?;
    if let Some(fitted) = model.fitted() {
        tracing::info!(
            resource = fitted.resource.as_str(),
            samples = fitted.samples,
            r_squared = fitted.r_squared,
            "Forecast model ready"
        );
    }

    // Bind before anything else so a busy port fails fast
    let listener = stream_loop::bind(config.bind_addr())?;

    let state = SharedState::default();
    let analyzer = Analyzer::from_config(&config, Arc::new(model));

    let (tx, rx) = commands::channel();
    let ingestion = tokio::spawn(commands::run_ingestion(rx, state.clone()));
    // Detached: blocked on stdin, exits with the process
    commands::spawn_operator_input(tx.clone());

    {
        let state = state.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl-C received, stopping at next tick");
                state.stop();
            }
        });
    }

    let peer_commands = config.peer_commands.then(|| tx.clone());
    drop(tx);

    let outcome = stream_loop::serve(
        listener,
        state.clone(),
        &analyzer,
        config.tick_interval,
        peer_commands,
    )
    .await?;

    ingestion.abort();

    let ticks = outcome.ticks();
    match outcome {
        StreamOutcome::Stopped { .. } => tracing::info!(ticks, "Shutdown complete"),
        StreamOutcome::PeerDisconnected { reason, .. } => {
            tracing::info!(ticks, "Client disconnected ({}), shutting down", reason)
        }
    }

    Ok(())
}
