//! Order Flow Generator Binary
//!
//! Runs one order flow scenario against the simulated venue and prints the
//! run report as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-flow
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_FLOW_CONFIG`: YAML config path (default: order-flow.yaml; missing file means defaults)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)

use anyhow::{Context, bail};
use order_flow::config::{config_path_from_env, load_config_or_default};
use order_flow::observability::{MetricsConfig, init_logging, init_metrics};
use order_flow::{RunTermination, run_simulated};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path = config_path_from_env();
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    init_logging(&config.observability.logging);
    tracing::info!(config = %config_path, "Starting order flow generator");

    if let Some(addr) = config.metrics_addr()? {
        init_metrics(&MetricsConfig::with_addr(addr))?;
        tracing::info!(%addr, "Metrics exporter listening");
    }

    let report = run_simulated(&config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let RunTermination::Aborted { reason } = &report.termination {
        bail!("run aborted: {reason}");
    }

    tracing::info!("Order flow generator finished");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
