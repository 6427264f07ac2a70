//! Racing Sim - headless race server
//!
//! Runs the default circuit in real time. It handles:
//! - Player controls read line by line from stdin
//! - Race events and snapshots written as JSON lines to stdout
//! - Logs written to stderr

use std::io::BufRead;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use racing_sim::config::Config;
use racing_sim::race::{ClientMsg, Race, RaceSession, RaceSetup, ServerMsg, SessionOptions};
use racing_sim::sim::VehicleParameters;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Racing Sim");

    let params = match &config.car_params_path {
        Some(path) => {
            info!(path = %path.display(), "Loading vehicle parameters");
            VehicleParameters::load(path)
                .with_context(|| format!("loading vehicle parameters from {}", path.display()))?
        }
        None => VehicleParameters::default(),
    };

    let setup = RaceSetup::default_circuit(params)
        .with_start_delay(config.start_delay_ms)
        .with_lap_count(config.lap_count);
    let race = Race::new(setup, config.physics);

    let options = SessionOptions {
        tick_rate: config.tick_rate,
        snapshot_rate: config.snapshot_rate,
        max_ticks: config.max_ticks,
        stop_when_finished: true,
    };
    let (session, handle) = RaceSession::new(race, options);

    let writer = tokio::spawn(write_events(handle.subscribe()));
    let input_tx = handle.input_tx.clone();
    std::thread::spawn(move || read_input(input_tx));
    // the session's own sender closes the event stream when it ends
    drop(handle);

    tokio::select! {
        summary = session.run() => {
            info!(
                race_id = %summary.race_id,
                ticks = summary.ticks,
                reason = ?summary.reason,
                "Race over"
            );
        }
        _ = shutdown_signal() => {}
    }

    writer.await?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Forward stdin lines to the session until EOF.
///
/// Runs on a plain thread so a pending read never holds up shutdown.
fn read_input(input_tx: mpsc::Sender<ClientMsg>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                return;
            }
        };

        match ClientMsg::parse_line(&line) {
            Ok(msg) => {
                if input_tx.blocking_send(msg).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "Ignoring input line"),
        }
    }

    info!("Input closed, holding last controls");
}

/// Write every session event to stdout as one JSON line
async fn write_events(mut events: broadcast::Receiver<ServerMsg>) {
    let mut stdout = tokio::io::stdout();

    loop {
        let msg = match events.recv().await {
            Ok(msg) => msg,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Output fell behind, events dropped");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let mut line = match serde_json::to_string(&msg) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to encode event");
                continue;
            }
        };
        line.push('\n');

        if let Err(e) = stdout.write_all(line.as_bytes()).await {
            warn!(error = %e, "Failed to write event");
            break;
        }
    }

    let _ = stdout.flush().await;
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
