use crate::domain::error::LivmapError;
use crate::domain::model::GeoMatch;
use async_trait::async_trait;

/// Trait for geocoding providers
///
/// This trait provides an abstraction over external geocoding services.
/// Implementations can be swapped without changing the batch driver, and
/// tests substitute a counting mock for the real HTTP client.
#[async_trait]
pub trait Geocoder {
    /// Resolve a free-text address into zero or more matches.
    ///
    /// An empty vector means the provider answered but found nothing.
    /// An error means the call itself failed (network, quota, malformed
    /// response) and is handled per-address by the caller.
    async fn geocode(&self, address: &str) -> Result<Vec<GeoMatch>, LivmapError>;
}
