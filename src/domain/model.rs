use serde::{Deserialize, Deserializer, Serialize};

// Résultat de géocodage d'une adresse
//
// Absent latitude/longitude means the address could not be resolved. A result
// is either fully positive (both coordinates present) or not found; the cache
// only ever stores positive results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "ville", default, deserialize_with = "string_or_null")]
    pub city: String,
    #[serde(rename = "code_postal", default, deserialize_with = "string_or_null")]
    pub postal_code: String,
}

impl GeocodeResult {
    /// Result for an address the provider could not resolve.
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

// Older snapshots serialize empty strings as null
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single match returned by a geocoding provider.
///
/// The top match carries the coordinates; the address components are scanned
/// for the locality (city) and postal code.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMatch {
    pub location: LatLng,
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressComponent {
    pub long_name: String,
    pub types: Vec<String>,
}

// Ligne de livraison géocodée (jointure adresse → résultat)
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub raw_address: String,
    pub store_id: String,
    pub geocode: GeocodeResult,
}

// Ligne magasin géocodée
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRecord {
    pub raw_address: String,
    pub store_id: String,
    pub geocode: GeocodeResult,
}

/// One aggregated group of deliveries sharing a store and a postal code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateGroup {
    #[serde(rename = "magasin")]
    pub store_id: String,
    #[serde(rename = "code_postal")]
    pub postal_code: String,
    #[serde(rename = "latitude")]
    pub mean_latitude: f64,
    #[serde(rename = "longitude")]
    pub mean_longitude: f64,
    #[serde(rename = "nb_livraisons")]
    pub delivery_count: usize,
}
