//! Price analytics over a dataset or any subset of it.
//!
//! Every function here is pure: inputs are borrowed, outputs are freshly
//! owned, and grouped results come back in `BTreeMap`s so iteration order
//! never depends on hashing.

use crate::error::{AnalyticsError, Result};
use crate::models::{
    CheapestApp, CostProfile, FeeBreakdown, GroupAverage, GroupKey, Grouping, PriceRecord,
    PriceTag, TaggedRecord,
};
use std::collections::BTreeMap;

/// Records for exactly this city and dish (case-sensitive).
pub fn filter_by_city_dish(records: &[PriceRecord], city: &str, dish: &str) -> Vec<PriceRecord> {
    records
        .iter()
        .filter(|r| r.city == city && r.dish == dish)
        .cloned()
        .collect()
}

/// Records whose final price lies in `[min, max]`.
pub fn filter_by_price_range(records: &[PriceRecord], min: f64, max: f64) -> Result<Vec<PriceRecord>> {
    if min.is_nan() || max.is_nan() || min > max {
        return Err(AnalyticsError::InvalidRange { min, max });
    }

    Ok(records
        .iter()
        .filter(|r| r.final_price >= min && r.final_price <= max)
        .cloned()
        .collect())
}

/// Tag every record sharing the subset's minimum final price as cheaper.
pub fn tag_cheapest(subset: &[PriceRecord]) -> Vec<TaggedRecord> {
    let Some(min) = subset.iter().map(|r| r.final_price).reduce(f64::min) else {
        return Vec::new();
    };

    subset
        .iter()
        .map(|r| TaggedRecord {
            record: r.clone(),
            tag: if r.final_price == min { PriceTag::Cheaper } else { PriceTag::Costly },
        })
        .collect()
}

/// Mean final price per group.
pub fn group_average(records: &[PriceRecord], grouping: Grouping) -> BTreeMap<GroupKey, GroupAverage> {
    let mut sums: BTreeMap<GroupKey, (f64, usize)> = BTreeMap::new();

    for r in records {
        let key = GroupKey {
            city: match grouping {
                Grouping::CityApp => Some(r.city.clone()),
                Grouping::App => None,
            },
            app: r.app.clone(),
        };
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += r.final_price;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(key, (total, count))| {
            (key, GroupAverage { average: total / count as f64, count })
        })
        .collect()
}

/// Cheapest app per city from city/app averages.
///
/// Keys without a city (app-only grouping) belong to no city and are skipped.
pub fn cheapest_per_city(averages: &BTreeMap<GroupKey, GroupAverage>) -> BTreeMap<String, CheapestApp> {
    let mut best: BTreeMap<String, CheapestApp> = BTreeMap::new();

    for (key, group) in averages {
        let Some(city) = &key.city else { continue };
        let candidate = CheapestApp { app: key.app.clone(), average: group.average };
        match best.get_mut(city) {
            Some(current) if candidate.beats(current) => *current = candidate,
            Some(_) => {}
            None => {
                best.insert(city.clone(), candidate);
            }
        }
    }

    best
}

/// App with the lowest average final price across all records.
pub fn overall_cheapest_app(records: &[PriceRecord]) -> Result<CheapestApp> {
    group_average(records, Grouping::App)
        .into_iter()
        .map(|(key, group)| CheapestApp { app: key.app, average: group.average })
        .reduce(|best, candidate| if candidate.beats(&best) { candidate } else { best })
        .ok_or_else(|| AnalyticsError::EmptyDataset("no records to compare apps over".to_string()))
}

/// Fees of the first record matching the selection.
pub fn fee_breakdown(records: &[PriceRecord], city: &str, dish: &str, app: &str) -> Result<FeeBreakdown> {
    records
        .iter()
        .find(|r| r.city == city && r.dish == dish && r.app == app)
        .map(PriceRecord::fee_breakdown)
        .ok_or_else(|| AnalyticsError::RecordNotFound {
            city: city.to_string(),
            dish: dish.to_string(),
            app: app.to_string(),
        })
}

pub fn cost_profiles(subset: &[PriceRecord]) -> Vec<CostProfile> {
    subset.iter().map(CostProfile::from).collect()
}

/// First `limit` records.
pub fn preview(subset: &[PriceRecord], limit: usize) -> Vec<PriceRecord> {
    subset.iter().take(limit).cloned().collect()
}
