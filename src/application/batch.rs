use crate::domain::address::normalize;
use crate::domain::model::{GeoMatch, GeocodeResult};
use crate::domain::traits::Geocoder;
use crate::infrastructure::storage::cache::GeocodeCache;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Result of a batch run.
///
/// `resolved` is 1:1 with the distinct normalized input addresses, in
/// first-seen order. Original rows (duplicates included) join back through
/// their normalized address.
pub struct BatchOutcome {
    pub resolved: Vec<(String, GeocodeResult)>,
    pub provider_calls: usize,
    pub failures: usize,
    pub interrupted: bool,
}

/// Drive a list of raw addresses through the cache and, on miss, the
/// provider.
///
/// Cache hits cost nothing; each distinct miss costs exactly one provider
/// call. Successful results are inserted into the cache and followed by a
/// `pacing` sleep to respect the provider's rate limit. Not-found answers and
/// provider failures degrade to an all-absent result, are not cached, and do
/// not stop the batch. Setting `stop` halts the batch between addresses;
/// inserts already made stay in the cache.
pub async fn resolve_all<G, F>(
    addresses: &[String],
    cache: &GeocodeCache,
    provider: &G,
    pacing: Duration,
    stop: &AtomicBool,
    mut on_progress: F,
) -> BatchOutcome
where
    G: Geocoder + ?Sized,
    F: FnMut(usize, usize, &str),
{
    // Dedupe after normalization, preserving first-seen order
    let mut seen = HashSet::new();
    let distinct: Vec<String> = addresses
        .iter()
        .map(|a| normalize(a))
        .filter(|a| seen.insert(a.clone()))
        .collect();

    let total = distinct.len();
    let mut outcome = BatchOutcome {
        resolved: Vec::with_capacity(total),
        provider_calls: 0,
        failures: 0,
        interrupted: false,
    };

    for (i, addr) in distinct.into_iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            outcome.interrupted = true;
            break;
        }

        let result = if let Some(cached) = cache.get(&addr) {
            cached
        } else {
            outcome.provider_calls += 1;
            match provider.geocode(&addr).await {
                Ok(matches) => match matches.first() {
                    Some(top) => {
                        let result = result_from_match(top);
                        cache.insert(addr.clone(), result.clone());
                        tokio::time::sleep(pacing).await;
                        result
                    }
                    None => {
                        tracing::warn!(address = %addr, "no match for address");
                        GeocodeResult::not_found()
                    }
                },
                Err(e) => {
                    tracing::warn!(address = %addr, error = %e, "geocoding failed");
                    outcome.failures += 1;
                    GeocodeResult::not_found()
                }
            }
        };

        on_progress(i + 1, total, &addr);
        outcome.resolved.push((addr, result));
    }

    outcome
}

/// Extract a cacheable result from the provider's top match.
fn result_from_match(top: &GeoMatch) -> GeocodeResult {
    let mut city = String::new();
    let mut postal_code = String::new();
    for component in &top.address_components {
        if component.types.iter().any(|t| t == "locality") {
            city = component.long_name.clone();
        }
        if component.types.iter().any(|t| t == "postal_code") {
            postal_code = component.long_name.clone();
        }
    }

    GeocodeResult {
        latitude: Some(top.location.lat),
        longitude: Some(top.location.lng),
        city,
        postal_code,
    }
}
