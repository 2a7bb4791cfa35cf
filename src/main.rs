use anyhow::Context;
use augur::services::AnalysisService;
use augur::types::{AnalysisRequest, InvestmentDecision};
use augur::Config;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Input file: one analysis request per symbol.
#[derive(Debug, Deserialize)]
struct BatchFile {
    symbols: Vec<AnalysisRequest>,
}

/// One line of output per requested symbol.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<InvestmentDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn read_input(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let path = std::env::args().nth(1);

    let input = read_input(path.as_deref())?;
    let batch: BatchFile = serde_json::from_str(&input).context("malformed batch file")?;
    info!("Loaded {} analysis request(s)", batch.symbols.len());

    let service = Arc::new(AnalysisService::from_config(&config)?);

    if let Some(tracker) = service.tracker() {
        if let Err(e) = tracker.cleanup_older_than(config.retention.signal_records_days) {
            warn!("Signal record cleanup failed: {}", e);
        }
    }

    let entries: Vec<BatchEntry> = service
        .analyze_batch(batch.symbols)
        .await
        .into_iter()
        .map(|(symbol, result)| match result {
            Ok(decision) => BatchEntry {
                symbol,
                decision: Some(decision),
                error: None,
            },
            Err(e) => BatchEntry {
                symbol,
                decision: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
