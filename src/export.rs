//! CSV export of a filtered subset.

use crate::error::Result;
use crate::models::PriceRecord;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct CsvOutRow<'a> {
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Dish")]
    dish: &'a str,
    #[serde(rename = "App")]
    app: &'a str,
    #[serde(rename = "Base Price")]
    base_price: f64,
    #[serde(rename = "Delivery Fee")]
    delivery_fee: f64,
    #[serde(rename = "Packaging Fee")]
    packaging_fee: f64,
    #[serde(rename = "Platform Fee")]
    platform_fee: f64,
    #[serde(rename = "Final Price")]
    final_price: f64,
    #[serde(rename = "Extra Charges")]
    extra_charges: f64,
}

impl<'a> From<&'a PriceRecord> for CsvOutRow<'a> {
    fn from(r: &'a PriceRecord) -> Self {
        Self {
            city: &r.city,
            dish: &r.dish,
            app: &r.app,
            base_price: r.base_price,
            delivery_fee: r.delivery_fee,
            packaging_fee: r.packaging_fee,
            platform_fee: r.platform_fee,
            final_price: r.final_price,
            extra_charges: r.extra_charges,
        }
    }
}

const HEADER: [&str; 9] = [
    "City",
    "Dish",
    "App",
    "Base Price",
    "Delivery Fee",
    "Packaging Fee",
    "Platform Fee",
    "Final Price",
    "Extra Charges",
];

pub fn export_file_name(city: &str, dish: &str) -> String {
    format!("{}_{}_price_comparison.csv", city, dish)
}

/// Write records with the source columns plus `Extra Charges`.
pub fn write_csv<W: Write>(writer: W, records: &[PriceRecord]) -> Result<()> {
    // header written by hand so an empty subset still gets one
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADER)?;
    for r in records {
        wtr.serialize(CsvOutRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[PriceRecord]) -> Result<String> {
    let mut out = Vec::new();
    write_csv(&mut out, records)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write `{city}_{dish}_price_comparison.csv` into `dir` and return its path.
pub fn export_to_dir(dir: impl AsRef<Path>, city: &str, dish: &str, records: &[PriceRecord]) -> Result<PathBuf> {
    let path = dir.as_ref().join(export_file_name(city, dish));
    let file = File::create(&path)?;
    write_csv(file, records)?;
    info!("Exported {} records to {:?}", records.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Pune", "Pizza"), "Pune_Pizza_price_comparison.csv");
    }

    #[test]
    fn test_header_has_extra_charges() {
        let records = vec![PriceRecord::new("Pune", "Pizza", "B", 150.0, 20.0, 5.0, 5.0, 180.0)];
        let body = to_csv_string(&records).unwrap();
        let mut lines = body.lines();
        assert_eq!(
            lines.next().unwrap(),
            "City,Dish,App,Base Price,Delivery Fee,Packaging Fee,Platform Fee,Final Price,Extra Charges"
        );
        assert_eq!(lines.next().unwrap(), "Pune,Pizza,B,150.0,20.0,5.0,5.0,180.0,30.0");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_subset_keeps_header() {
        let body = to_csv_string(&[]).unwrap();
        assert_eq!(body.lines().count(), 1);
        assert!(body.starts_with("City,Dish,App,"));
    }
}
