//! Probe: dashboard subgraphs
//!
//! Sends every page query once to its subgraph and documents:
//! - Endpoint and latency
//! - Record count of the top-level field
//! - A sample record and its field names

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use polymarket_analytics::cache::ResponseCache;
use polymarket_analytics::client::{FetchPolicy, Subgraphs};
use polymarket_analytics::config::{AppConfig, CONFIG_PATH};
use polymarket_analytics::pages::{
    AccountPage, OrdersMatchedPage, Page, PositionsPage, RedemptionsPage, TradesPage,
};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load_or_default(Path::new(CONFIG_PATH))?;
    let subgraphs = Subgraphs::try_new(
        reqwest::Client::new(),
        Arc::new(ResponseCache::new(0)),
        FetchPolicy::NetworkOnly,
        |s| config.endpoint_url(s),
    )?;

    println!("=== Probe: dashboard subgraphs ===");
    println!();

    let mut failures = 0;
    failures += probe(&subgraphs, &TradesPage::default()).await;
    failures += probe(&subgraphs, &OrdersMatchedPage::default()).await;
    failures += probe(&subgraphs, &PositionsPage).await;
    failures += probe(&subgraphs, &RedemptionsPage::default()).await;
    failures += probe(&subgraphs, &AccountPage::default()).await;

    println!("=== Done: {failures} failed ===");
    Ok(())
}

/// Returns 1 when the query failed, 0 otherwise.
async fn probe<P: Page>(subgraphs: &Subgraphs, page: &P) -> usize {
    let client = subgraphs.client(P::SUBGRAPH);
    println!("--- {} ({}) ---", P::TITLE, P::SUBGRAPH);
    println!("Endpoint: {}", client.endpoint());

    let start = Instant::now();
    let result = client.execute::<Value>(P::QUERY, page.variables()).await;
    let latency = start.elapsed();
    println!("Latency: {latency:?}");

    let data = match result {
        Ok(data) => data,
        Err(e) => {
            println!("Error: {e}");
            println!();
            return 1;
        }
    };

    let Some((field, value)) = data.as_object().and_then(|o| o.iter().next()) else {
        println!("Empty data object");
        println!();
        return 0;
    };

    let sample = match value {
        Value::Array(records) => {
            println!("{field}: {} records", records.len());
            records.first()
        }
        Value::Null => {
            println!("{field}: null");
            None
        }
        other => {
            println!("{field}: single record");
            Some(other)
        }
    };

    if let Some(record) = sample {
        println!("\nSample record:");
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
        );
        if let Some(obj) = record.as_object() {
            println!("\nFields present:");
            for key in obj.keys() {
                println!("  - {key}");
            }
        }
    }
    println!();
    0
}
