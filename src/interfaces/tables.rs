// CSV input/output for the delivery and store tables
use crate::domain::address::normalize;
use crate::domain::error::LivmapError;
use crate::domain::model::{AggregateGroup, DeliveryRecord, StoreRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One raw input row: an address paired with its store id.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRow {
    pub address: String,
    pub store_id: String,
}

// Historical files carry the double-d misspelling of the delivery column
const DELIVERY_ADDRESS_COLUMNS: &[&str] = &["adresse_livraison", "addresse_livraison"];
const STORE_ADDRESS_COLUMNS: &[&str] = &["addresse_collecte", "adresse_collecte"];
const STORE_ID_COLUMN: &str = "magasin";

pub fn load_delivery_rows(path: &Path) -> Result<Vec<AddressRow>, LivmapError> {
    read_rows(File::open(path)?, "deliveries", DELIVERY_ADDRESS_COLUMNS)
}

pub fn load_store_rows(path: &Path) -> Result<Vec<AddressRow>, LivmapError> {
    read_rows(File::open(path)?, "stores", STORE_ADDRESS_COLUMNS)
}

/// Read address/store rows from a CSV stream.
///
/// Header names are trimmed before matching. A missing required column is a
/// fatal error raised here, before any geocoding starts. Rows with an empty
/// address are dropped (they cannot be geocoded or joined).
fn read_rows<R: Read>(
    reader: R,
    table: &str,
    address_columns: &[&str],
) -> Result<Vec<AddressRow>, LivmapError> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let addr_idx = address_columns
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .ok_or_else(|| LivmapError::MissingColumn {
            table: table.to_string(),
            column: address_columns[0].to_string(),
        })?;
    let store_idx = headers
        .iter()
        .position(|h| h == STORE_ID_COLUMN)
        .ok_or_else(|| LivmapError::MissingColumn {
            table: table.to_string(),
            column: STORE_ID_COLUMN.to_string(),
        })?;

    let mut rows = Vec::new();
    let mut empty = 0usize;
    for record in rdr.records() {
        let record = record?;
        let address = normalize(record.get(addr_idx).unwrap_or(""));
        let store_id = record.get(store_idx).unwrap_or("").trim().to_string();
        if address.is_empty() {
            empty += 1;
            continue;
        }
        rows.push(AddressRow { address, store_id });
    }
    if empty > 0 {
        tracing::warn!(table, rows = empty, "dropped rows with an empty address");
    }

    Ok(rows)
}

pub fn write_delivery_table(path: &Path, records: &[DeliveryRecord]) -> Result<(), LivmapError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "adresse_livraison",
        "magasin",
        "latitude",
        "longitude",
        "ville",
        "code_postal",
    ])?;
    for r in records {
        let lat = opt_coord(r.geocode.latitude);
        let lng = opt_coord(r.geocode.longitude);
        wtr.write_record([
            r.raw_address.as_str(),
            r.store_id.as_str(),
            lat.as_str(),
            lng.as_str(),
            r.geocode.city.as_str(),
            r.geocode.postal_code.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_store_table(path: &Path, records: &[StoreRecord]) -> Result<(), LivmapError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "addresse_collecte",
        "magasin",
        "latitude",
        "longitude",
        "ville",
        "code_postal",
    ])?;
    for r in records {
        let lat = opt_coord(r.geocode.latitude);
        let lng = opt_coord(r.geocode.longitude);
        wtr.write_record([
            r.raw_address.as_str(),
            r.store_id.as_str(),
            lat.as_str(),
            lng.as_str(),
            r.geocode.city.as_str(),
            r.geocode.postal_code.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_aggregates(path: &Path, groups: &[AggregateGroup]) -> Result<(), LivmapError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "magasin",
        "code_postal",
        "latitude",
        "longitude",
        "nb_livraisons",
    ])?;
    for g in groups {
        let lat = g.mean_latitude.to_string();
        let lng = g.mean_longitude.to_string();
        let count = g.delivery_count.to_string();
        wtr.write_record([
            g.store_id.as_str(),
            g.postal_code.as_str(),
            lat.as_str(),
            lng.as_str(),
            count.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn opt_coord(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_rows_and_trims_addresses() {
        let csv = "adresse_livraison,magasin\n 10 Rue A ,S1\n5 Rue B,S2\n";
        let rows = read_rows(Cursor::new(csv), "deliveries", DELIVERY_ADDRESS_COLUMNS).unwrap();
        assert_eq!(
            rows,
            vec![
                AddressRow {
                    address: "10 Rue A".to_string(),
                    store_id: "S1".to_string()
                },
                AddressRow {
                    address: "5 Rue B".to_string(),
                    store_id: "S2".to_string()
                },
            ]
        );
    }

    #[test]
    fn header_whitespace_is_trimmed_before_matching() {
        let csv = " adresse_livraison , magasin \n10 Rue A,S1\n";
        let rows = read_rows(Cursor::new(csv), "deliveries", DELIVERY_ADDRESS_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].store_id, "S1");
    }

    #[test]
    fn accepts_the_historical_misspelling() {
        let csv = "addresse_livraison,magasin\n10 Rue A,S1\n";
        let rows = read_rows(Cursor::new(csv), "deliveries", DELIVERY_ADDRESS_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn missing_address_column_fails_fast() {
        let csv = "rue,magasin\n10 Rue A,S1\n";
        let err = read_rows(Cursor::new(csv), "deliveries", DELIVERY_ADDRESS_COLUMNS).unwrap_err();
        match err {
            LivmapError::MissingColumn { table, column } => {
                assert_eq!(table, "deliveries");
                assert_eq!(column, "adresse_livraison");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_store_column_fails_fast() {
        let csv = "adresse_livraison,boutique\n10 Rue A,S1\n";
        let err = read_rows(Cursor::new(csv), "deliveries", DELIVERY_ADDRESS_COLUMNS).unwrap_err();
        assert!(matches!(
            err,
            LivmapError::MissingColumn { column, .. } if column == "magasin"
        ));
    }

    #[test]
    fn empty_address_rows_are_dropped() {
        let csv = "adresse_livraison,magasin\n,S1\n  ,S2\n10 Rue A,S3\n";
        let rows = read_rows(Cursor::new(csv), "deliveries", DELIVERY_ADDRESS_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].store_id, "S3");
    }

    #[test]
    fn store_table_uses_the_collecte_column() {
        let csv = "addresse_collecte,magasin\n1 Quai C,S1\n";
        let rows = read_rows(Cursor::new(csv), "stores", STORE_ADDRESS_COLUMNS).unwrap();
        assert_eq!(rows[0].address, "1 Quai C");
    }
}
