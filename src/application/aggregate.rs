use crate::domain::model::{AggregateGroup, DeliveryRecord};
use std::collections::{HashMap, HashSet};

/// Group geocoded deliveries by (store, postal code) for map rendering.
///
/// Only deliveries for a store in `filter` are considered. Records without
/// coordinates are excluded from both the mean and the count, so a group made
/// entirely of unresolved addresses never appears in the output. Output order
/// is unspecified; callers sort for display.
pub fn aggregate(deliveries: &[DeliveryRecord], filter: &HashSet<String>) -> Vec<AggregateGroup> {
    let mut groups: HashMap<(String, String), (f64, f64, usize)> = HashMap::new();

    for record in deliveries {
        if !filter.contains(&record.store_id) {
            continue;
        }
        let (Some(lat), Some(lng)) = (record.geocode.latitude, record.geocode.longitude) else {
            continue;
        };
        let key = (record.store_id.clone(), record.geocode.postal_code.clone());
        let entry = groups.entry(key).or_insert((0.0, 0.0, 0));
        entry.0 += lat;
        entry.1 += lng;
        entry.2 += 1;
    }

    groups
        .into_iter()
        .map(
            |((store_id, postal_code), (sum_lat, sum_lng, count))| AggregateGroup {
                store_id,
                postal_code,
                mean_latitude: sum_lat / count as f64,
                mean_longitude: sum_lng / count as f64,
                delivery_count: count,
            },
        )
        .collect()
}
