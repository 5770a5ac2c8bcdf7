//! One-time CSV load into an immutable dataset.

use crate::error::{AnalyticsError, Result};
use crate::models::{CsvRecord, PriceRecord};
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rounding slack when checking final price against its components
const CONSISTENCY_TOLERANCE: f64 = 0.01;

/// How many skipped rows get a debug line of their own
const LOGGED_SKIPS: usize = 5;

/// All usable price records from the source file, in file order
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<PriceRecord>,
    skipped_rows: usize,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading CSV from {:?}", path);
        let file = File::open(path).map_err(|e| {
            AnalyticsError::EmptyDataset(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut skipped_rows = 0;

        for (i, row) in reader.deserialize::<CsvRecord>().enumerate() {
            let parsed = match row {
                Ok(raw) => raw.to_price_record(),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
                Err(e) => Err(e.to_string()),
            };
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => {
                    if skipped_rows < LOGGED_SKIPS {
                        debug!("Skipping row {}: {}", i + 1, reason);
                    }
                    skipped_rows += 1;
                }
            }
        }

        if skipped_rows > 0 {
            warn!("Excluded {} rows with malformed fields", skipped_rows);
        }

        let dataset = Self::from_records(records)?;
        Ok(Self { skipped_rows, ..dataset })
    }

    /// Wrap already-typed records. Fails when there are none.
    pub fn from_records(records: Vec<PriceRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(AnalyticsError::EmptyDataset(
                "no usable price records".to_string(),
            ));
        }

        let inconsistent = records
            .iter()
            .filter(|r| !r.is_consistent(CONSISTENCY_TOLERANCE))
            .count();
        if inconsistent > 0 {
            info!(
                "{} of {} records have a final price that differs from their components",
                inconsistent,
                records.len()
            );
        }

        info!("Loaded {} price records", records.len());
        Ok(Self { records, skipped_rows: 0 })
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source rows dropped because a field was missing or non-numeric
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn cities(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.city.as_str()))
    }

    pub fn dishes(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.dish.as_str()))
    }

    pub fn apps(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.app.as_str()))
    }
}

/// Distinct values in first-appearance order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "City,Dish,App,Base Price,Delivery Fee,Packaging Fee,Platform Fee,Final Price\n";

    #[test]
    fn test_load_in_file_order() {
        let input = format!(
            "{}Pune,Pizza,Zomato,150,30,10,10,200\nMumbai,Biryani,Swiggy,200,20,5,5,230\nPune,Biryani,Swiggy,180,20,5,5,210\n",
            HEADER
        );
        let ds = Dataset::from_reader(Cursor::new(input)).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.skipped_rows(), 0);
        assert_eq!(ds.cities(), vec!["Pune", "Mumbai"]);
        assert_eq!(ds.dishes(), vec!["Pizza", "Biryani"]);
        assert_eq!(ds.apps(), vec!["Zomato", "Swiggy"]);
        assert_eq!(ds.records()[1].extra_charges, 30.0);
    }

    #[test]
    fn test_malformed_rows_counted_not_fatal() {
        let input = format!(
            "{}Pune,Pizza,Zomato,150,30,10,10,200\nPune,Pizza,Swiggy,abc,20,5,5,180\nPune,Pizza\n,Pizza,Swiggy,150,20,5,5,180\n",
            HEADER
        );
        let ds = Dataset::from_reader(Cursor::new(input)).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.skipped_rows(), 3);
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let err = Dataset::from_reader(Cursor::new(HEADER)).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyDataset(_)));
    }

    #[test]
    fn test_all_rows_malformed_is_empty_dataset() {
        let input = format!("{}Pune,Pizza,Zomato,x,y,z,w,v\n", HEADER);
        let err = Dataset::from_reader(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyDataset(_)));
    }

    #[test]
    fn test_missing_file_is_empty_dataset() {
        let err = Dataset::load("does/not/exist.csv").unwrap_err();
        match err {
            AnalyticsError::EmptyDataset(msg) => assert!(msg.contains("does/not/exist.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
