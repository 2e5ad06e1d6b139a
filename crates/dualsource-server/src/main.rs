//! DualSource: resolves names against a fast primary and a gated secondary source.

use std::sync::Arc;

use dualsource_backends::{LogNotifier, SimulatedPrimary, SimulatedSecondary};
use dualsource_core::DualSourceConfig;
use dualsource_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--config" | "config" => {
                let config = DualSourceConfig::from_env()?;
                println!("{}", serde_json::to_string_pretty(&config)?);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("DualSource — primary/secondary name resolution server");
                println!();
                println!("Usage: dualsource [command]");
                println!();
                println!("Commands:");
                println!("  (none)    Start the server");
                println!("  config    Print the effective configuration");
                println!("  help      Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT                              HTTP port (default 8080)");
                println!("  DUALSOURCE_GRACE_PERIOD_SECONDS   Secondary floor wait (default 3)");
                println!("  DUALSOURCE_THRESHOLD              Batch path above this size (default 5)");
                println!("  DUALSOURCE_PRIMARY_POOL           Primary call concurrency (default 8)");
                println!("  DUALSOURCE_SECONDARY_POOL         Secondary call concurrency (default 4)");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'dualsource help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = DualSourceConfig::from_env()?;
    let port = config.port;

    let state = Arc::new(AppState::new(
        config,
        Arc::new(SimulatedPrimary::default()),
        Arc::new(SimulatedSecondary::default()),
        Arc::new(LogNotifier),
    )?);

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DualSource server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
