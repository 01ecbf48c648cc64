//! Replay a recorded depth snapshot and update through an aggregated book
//! and write the merged view after each step.
//!
//! Usage: `aggregate_files [config.json]`

use depth_aggregator::{
    init_logging, types::now_millis, AggregatorConfig, AggregatorError, BookRegistry,
    DepthMessage, InMemoryOrderStore, Snapshot, WorkerSettings,
};
use log::{error, info};
use std::path::Path;
use std::sync::Arc;

fn print_summary(title: &str, snapshot: &Snapshot, depth: usize) {
    println!("== {} {} {} @ {}", title, snapshot.exchange_id, snapshot.symbol, snapshot.timestamp);
    println!("   {} bid levels, {} ask levels", snapshot.bids.len(), snapshot.asks.len());
    for (bid, ask) in snapshot.bids.iter().zip(snapshot.asks.iter()).take(depth) {
        println!(
            "   {:>14} @ {:<14} | {:>14} @ {:<14}",
            bid.size.to_string(),
            bid.price.to_string(),
            ask.price.to_string(),
            ask.size.to_string()
        );
    }
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), AggregatorError> {
    let data = serde_json::to_vec(snapshot)?;
    std::fs::write(path, data)?;
    info!("Wrote aggregated snapshot to {}", path.display());
    Ok(())
}

async fn run(config: AggregatorConfig) -> Result<(), AggregatorError> {
    let symbol = match config.symbols.first() {
        Some(symbol) => symbol.clone(),
        None => return Err(depth_aggregator::ConfigError::Invalid("no symbol".to_string()).into()),
    };

    let snapshot_message = DepthMessage::from_slice(&std::fs::read(&config.replay.snapshot_file)?)?;
    let update_message = DepthMessage::from_slice(&std::fs::read(&config.replay.update_file)?)?;

    let registry = BookRegistry::new(
        Arc::new(InMemoryOrderStore::new()),
        WorkerSettings::from(&config),
    );
    let book = registry.track(&config.exchange, &symbol).await?;

    let snapshot = snapshot_message.to_snapshot(config.exchange.as_str(), symbol.clone(), now_millis())?;
    book.ingest_snapshot(snapshot).await?;
    let first = book.snapshot().await?;
    print_summary("after snapshot", &first, config.summary_depth);

    // Strictly after the snapshot so the update is never judged stale
    let update_ts = now_millis().max(first.timestamp.saturating_add(1));
    let update = update_message.to_quote_stream(config.exchange.as_str(), symbol.clone(), update_ts)?;
    match book.ingest_quote_stream(update).await? {
        Some(delta) => info!(
            "Update touched {} bid and {} ask levels",
            delta.bids.len(),
            delta.asks.len()
        ),
        None => info!("Update was discarded as stale"),
    }
    let second = book.snapshot().await?;
    print_summary("after update", &second, config.summary_depth);

    write_snapshot(&config.replay.snapshot_output, &first)?;
    write_snapshot(&config.replay.update_output, &second)?;

    registry.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => AggregatorConfig::from_file(path)?,
        None => AggregatorConfig::default(),
    };
    init_logging(&config.log_level, config.log_file.as_deref())?;

    info!(
        "Replaying {} and {} for {} {:?}",
        config.replay.snapshot_file.display(),
        config.replay.update_file.display(),
        config.exchange,
        config.symbols
    );

    if let Err(err) = run(config).await {
        error!("Replay failed: {}", err);
        return Err(err.into());
    }
    Ok(())
}
