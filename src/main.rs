// src/main.rs
//! Calltap Observer
//!
//! Reads newline-delimited event messages from stdin (as delivered by an
//! interception session's transport), pairs requests with responses by
//! nonce, and writes each completed flow to stdout as one JSON line.
//!
//! Usage: `calltap-observer [CONFIG_FILE]`

use anyhow::{Context, Result};
use calltap_engine::observability::init_tracing;
use calltap_engine::observer::{FlowCorrelator, HttpFlow};
use calltap_engine::utils::config::EngineConfig;
use calltap_engine::BuildInfo;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = EngineConfig::load_from(config_path.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    let build = BuildInfo::current();
    info!(
        "Starting calltap observer v{} ({})",
        build.version, build.git_hash
    );
    debug!("Configuration loaded: {:?}", config);

    let plan = config.plan().context("Failed to load hook plan")?;
    for point in &plan.points {
        info!("Expecting {} events from {}", point.kind, point.id());
    }

    let watched: HashSet<String> = config.observer.watch_routes.iter().cloned().collect();
    let mut correlator = FlowCorrelator::new().with_verbose(config.observer.verbose);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut completed = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match correlator.handle_message(line) {
            Ok(Some(flow)) => {
                completed += 1;
                if is_watched(&watched, &flow) {
                    let mut out = serde_json::to_string(&flow)?;
                    out.push('\n');
                    stdout.write_all(out.as_bytes()).await?;
                    stdout.flush().await?;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Skipping line: {}", e),
        }
    }

    info!(
        "Input closed: {} flows completed, {} requests never answered",
        completed,
        correlator.pending_count()
    );
    Ok(())
}

fn is_watched(watched: &HashSet<String>, flow: &HttpFlow) -> bool {
    watched.is_empty() || watched.contains(&flow.route)
}
