// Main entry point
mod application;
mod domain;
mod infrastructure;
mod interfaces;
mod state;

use application::aggregate::aggregate;
use application::batch::{resolve_all, BatchOutcome};
use clap::Parser;
use colored::Colorize;
use domain::model::{DeliveryRecord, GeocodeResult, StoreRecord};
use domain::traits::Geocoder;
use indicatif::{ProgressBar, ProgressStyle};
use infrastructure::config::load_config;
use infrastructure::network::client::GoogleGeocoder;
use infrastructure::storage::cache::GeocodeCache;
use interfaces::cli::Cli;
use interfaces::tables;
use state::AppState;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Ctrl-C stops issuing further addresses; progress already cached is kept
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to listen for shutdown signal: {}", e);
            } else {
                eprintln!("\nInterrupted, finishing the current address...");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    let cli = Cli::parse();
    let config = load_config()?;

    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        infrastructure::config::generate_config_sample()?;
        return Ok(());
    }

    let (Some(deliveries_path), Some(stores_path)) = (&cli.deliveries, &cli.stores) else {
        eprintln!(
            "{}",
            "Please provide both --deliveries and --stores files".red()
        );
        std::process::exit(1);
    };

    let state = AppState::new(config.clone())?;

    // Optional snapshot load; a bad snapshot file starts an empty cache
    if let Some(cache_path) = &cli.cache {
        match tokio::fs::read_to_string(cache_path).await {
            Ok(snapshot) => match state.cache.merge(&snapshot) {
                Ok(report) => {
                    let mut line = format!(
                        "Loaded {} cached addresses from {}",
                        report.loaded,
                        cache_path.display()
                    );
                    if report.skipped > 0 {
                        line.push_str(&format!(" ({} malformed entries skipped)", report.skipped));
                    }
                    println!("{}", line.green());
                }
                Err(e) => eprintln!(
                    "{}",
                    format!("Cache file unreadable ({e}), starting with an empty cache").yellow()
                ),
            },
            Err(e) => eprintln!(
                "{}",
                format!("Cannot read cache file ({e}), starting with an empty cache").yellow()
            ),
        }
    } else {
        eprintln!(
            "{}",
            "No cache loaded, a new one will be created".yellow()
        );
    }

    // Fail fast on structural input problems before any provider call
    let delivery_rows = tables::load_delivery_rows(deliveries_path)?;
    let store_rows = tables::load_store_rows(stores_path)?;

    let geocoder = GoogleGeocoder::from_config(state.http_client.clone(), &config)?;
    let pacing = Duration::from_millis(config.pacing_ms);

    println!("{}", "Geocoding delivery addresses...".cyan());
    let delivery_outcome = run_batch(
        &delivery_rows,
        &state.cache,
        &geocoder,
        pacing,
        stop.as_ref(),
        "delivery",
    )
    .await;

    println!("{}", "Geocoding store addresses...".cyan());
    let store_outcome = run_batch(
        &store_rows,
        &state.cache,
        &geocoder,
        pacing,
        stop.as_ref(),
        "store",
    )
    .await;

    // The updated cache is durable even for an interrupted run
    if let Some(parent) = cli.cache_out.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&cli.cache_out, state.cache.to_json()?).await?;
    println!(
        "{}",
        format!(
            "Cache written to {} ({} addresses)",
            cli.cache_out.display(),
            state.cache.len()
        )
        .green()
    );

    let interrupted = delivery_outcome.interrupted || store_outcome.interrupted;
    if interrupted {
        eprintln!(
            "{}",
            "Batch interrupted; skipping table and aggregate outputs".yellow()
        );
        return Ok(());
    }

    // Join every original row back through its normalized address
    let delivery_results = outcome_map(&delivery_outcome);
    let deliveries: Vec<DeliveryRecord> = delivery_rows
        .iter()
        .map(|row| DeliveryRecord {
            raw_address: row.address.clone(),
            store_id: row.store_id.clone(),
            geocode: joined(&delivery_results, &row.address),
        })
        .collect();

    let store_results = outcome_map(&store_outcome);
    let stores: Vec<StoreRecord> = store_rows
        .iter()
        .map(|row| StoreRecord {
            raw_address: row.address.clone(),
            store_id: row.store_id.clone(),
            geocode: joined(&store_results, &row.address),
        })
        .collect();

    let filter: HashSet<String> = if cli.magasins.is_empty() {
        deliveries.iter().map(|d| d.store_id.clone()).collect()
    } else {
        cli.magasins.iter().cloned().collect()
    };

    let mut groups = aggregate(&deliveries, &filter);
    groups.sort_by(|a, b| {
        (a.store_id.as_str(), a.postal_code.as_str())
            .cmp(&(b.store_id.as_str(), b.postal_code.as_str()))
    });

    tokio::fs::create_dir_all(&cli.out_dir).await?;
    let deliveries_out = cli.out_dir.join("livraisons_geocodees.csv");
    let stores_out = cli.out_dir.join("magasins_geocodes.csv");
    let aggregates_out = cli.out_dir.join("livraisons_agregees.csv");
    tables::write_delivery_table(&deliveries_out, &deliveries)?;
    tables::write_store_table(&stores_out, &stores)?;
    tables::write_aggregates(&aggregates_out, &groups)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    }

    let failures = delivery_outcome.failures + store_outcome.failures;
    let calls = delivery_outcome.provider_calls + store_outcome.provider_calls;
    println!(
        "{}",
        format!(
            "Done: {} deliveries, {} stores, {} aggregate groups, {} provider calls",
            deliveries.len(),
            stores.len(),
            groups.len(),
            calls
        )
        .green()
    );
    if failures > 0 {
        eprintln!(
            "{}",
            format!("{failures} addresses failed to geocode (left uncached, retry later)").yellow()
        );
    }

    Ok(())
}

/// Run one batch with a progress bar wired to the resolver callback.
async fn run_batch<G: Geocoder>(
    rows: &[tables::AddressRow],
    cache: &GeocodeCache,
    provider: &G,
    pacing: Duration,
    stop: &AtomicBool,
    label: &str,
) -> BatchOutcome {
    let addresses: Vec<String> = rows.iter().map(|r| r.address.clone()).collect();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let label = label.to_string();
    let outcome = resolve_all(&addresses, cache, provider, pacing, stop, |i, total, addr| {
        pb.set_length(total as u64);
        pb.set_position(i as u64);
        pb.set_message(format!("{label}: {addr}"));
    })
    .await;

    if outcome.interrupted {
        pb.abandon_with_message("interrupted");
    } else {
        pb.finish_with_message("done");
    }
    outcome
}

fn outcome_map(outcome: &BatchOutcome) -> HashMap<String, GeocodeResult> {
    outcome
        .resolved
        .iter()
        .map(|(addr, result)| (addr.clone(), result.clone()))
        .collect()
}

fn joined(results: &HashMap<String, GeocodeResult>, address: &str) -> GeocodeResult {
    results
        .get(address)
        .cloned()
        .unwrap_or_else(GeocodeResult::not_found)
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &infrastructure::config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    tracing_subscriber::fmt().with_env_filter(filter).init();

    Ok(())
}
