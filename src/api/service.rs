//! Shared view-building layer
//!
//! Used by both the terminal report and the REST handlers.

use crate::dataset::Dataset;
use crate::engine;
use crate::error::Result;
use crate::export;
use crate::models::{
    CheapestApp, CostProfile, FeeBreakdown, GroupAverage, GroupKey, Grouping, PriceRecord,
    TaggedRecord,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, Clone)]
pub struct Stats {
    pub total_records: usize,
    pub skipped_rows: usize,
    pub total_cities: usize,
    pub total_dishes: usize,
    pub total_apps: usize,
}

/// Values offered by the city/dish/app selectors
#[derive(Debug, Clone)]
pub struct SelectorOptions {
    pub cities: Vec<String>,
    pub dishes: Vec<String>,
    pub apps: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub city: String,
    pub dish: String,
    pub rows: Vec<TaggedRecord>,
    pub profiles: Vec<CostProfile>,
}

#[derive(Debug, Clone)]
pub struct Breakdown {
    pub app: String,
    pub fees: FeeBreakdown,
    /// Percent of fee total: delivery, packaging, platform
    pub shares: [f64; 3],
}

#[derive(Debug, Clone)]
pub struct RangeMatches {
    pub min: f64,
    pub max: f64,
    pub total_matches: usize,
    pub preview: Vec<PriceRecord>,
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub body: String,
}

// ============================================================================
// Analytics Service
// ============================================================================

#[derive(Clone)]
pub struct AnalyticsService {
    dataset: Arc<Dataset>,
}

impl AnalyticsService {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset: Arc::new(dataset) }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Dataset::load(path)?))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total_records: self.dataset.len(),
            skipped_rows: self.dataset.skipped_rows(),
            total_cities: self.dataset.cities().len(),
            total_dishes: self.dataset.dishes().len(),
            total_apps: self.dataset.apps().len(),
        }
    }

    pub fn options(&self) -> SelectorOptions {
        SelectorOptions {
            cities: self.dataset.cities(),
            dishes: self.dataset.dishes(),
            apps: self.dataset.apps(),
        }
    }

    pub fn comparison(&self, city: &str, dish: &str) -> Comparison {
        let subset = engine::filter_by_city_dish(self.dataset.records(), city, dish);
        debug!("{} quotes for {} in {}", subset.len(), dish, city);
        Comparison {
            city: city.to_string(),
            dish: dish.to_string(),
            rows: engine::tag_cheapest(&subset),
            profiles: engine::cost_profiles(&subset),
        }
    }

    /// Apps present in the city/dish selection, in file order
    pub fn apps_for(&self, city: &str, dish: &str) -> Vec<String> {
        let mut apps: Vec<String> = Vec::new();
        for r in engine::filter_by_city_dish(self.dataset.records(), city, dish) {
            if !apps.contains(&r.app) {
                apps.push(r.app);
            }
        }
        apps
    }

    pub fn fee_breakdown(&self, city: &str, dish: &str, app: &str) -> Result<Breakdown> {
        let fees = engine::fee_breakdown(self.dataset.records(), city, dish, app)?;
        Ok(Breakdown {
            app: app.to_string(),
            fees,
            shares: fees.shares(),
        })
    }

    pub fn price_range(&self, min: f64, max: f64, limit: usize) -> Result<RangeMatches> {
        let matches = engine::filter_by_price_range(self.dataset.records(), min, max)?;
        Ok(RangeMatches {
            min,
            max,
            total_matches: matches.len(),
            preview: engine::preview(&matches, limit),
        })
    }

    pub fn averages(&self, grouping: Grouping) -> BTreeMap<GroupKey, GroupAverage> {
        engine::group_average(self.dataset.records(), grouping)
    }

    pub fn cheapest_per_city(&self) -> BTreeMap<String, CheapestApp> {
        engine::cheapest_per_city(&self.averages(Grouping::CityApp))
    }

    pub fn overall_cheapest(&self) -> Result<CheapestApp> {
        engine::overall_cheapest_app(self.dataset.records())
    }

    pub fn export_csv(&self, city: &str, dish: &str) -> Result<CsvExport> {
        let subset = engine::filter_by_city_dish(self.dataset.records(), city, dish);
        Ok(CsvExport {
            file_name: export::export_file_name(city, dish),
            body: export::to_csv_string(&subset)?,
        })
    }

    pub fn export_to_dir(&self, dir: impl AsRef<Path>, city: &str, dish: &str) -> Result<PathBuf> {
        let subset = engine::filter_by_city_dish(self.dataset.records(), city, dish);
        export::export_to_dir(dir, city, dish, &subset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::models::PriceTag;

    fn service() -> AnalyticsService {
        let records = vec![
            PriceRecord::new("Pune", "Pizza", "Zomato", 150.0, 30.0, 10.0, 10.0, 200.0),
            PriceRecord::new("Pune", "Pizza", "Swiggy", 150.0, 20.0, 5.0, 5.0, 180.0),
            PriceRecord::new("Delhi", "Pizza", "Zomato", 160.0, 40.0, 10.0, 10.0, 220.0),
            PriceRecord::new("Delhi", "Pizza", "Swiggy", 160.0, 20.0, 10.0, 10.0, 200.0),
        ];
        AnalyticsService::new(Dataset::from_records(records).unwrap())
    }

    #[test]
    fn test_stats_and_options() {
        let svc = service();
        let stats = svc.stats();
        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.total_cities, 2);
        assert_eq!(stats.total_apps, 2);
        assert_eq!(svc.options().cities, vec!["Pune", "Delhi"]);
    }

    #[test]
    fn test_comparison_tags_cheapest() {
        let cmp = service().comparison("Pune", "Pizza");
        assert_eq!(cmp.rows.len(), 2);
        assert_eq!(cmp.profiles.len(), 2);
        let cheaper: Vec<_> = cmp.rows.iter().filter(|r| r.tag == PriceTag::Cheaper).collect();
        assert_eq!(cheaper.len(), 1);
        assert_eq!(cheaper[0].record.app, "Swiggy");
    }

    #[test]
    fn test_breakdown_shares() {
        let b = service().fee_breakdown("Pune", "Pizza", "Zomato").unwrap();
        assert_eq!(b.fees.total(), 50.0);
        assert_eq!(b.shares, [60.0, 20.0, 20.0]);
        assert!(matches!(
            service().fee_breakdown("Goa", "Pizza", "Zomato"),
            Err(AnalyticsError::RecordNotFound { .. })
        ));
    }

    #[test]
    fn test_price_range_preview_limit() {
        let m = service().price_range(180.0, 220.0, 2).unwrap();
        assert_eq!(m.total_matches, 4);
        assert_eq!(m.preview.len(), 2);
    }

    #[test]
    fn test_cheapest_views() {
        let svc = service();
        assert_eq!(svc.cheapest_per_city()["Delhi"].app, "Swiggy");
        let overall = svc.overall_cheapest().unwrap();
        assert_eq!(overall, CheapestApp { app: "Swiggy".into(), average: 190.0 });
    }

    #[test]
    fn test_export_csv_named_by_selection() {
        let export = service().export_csv("Pune", "Pizza").unwrap();
        assert_eq!(export.file_name, "Pune_Pizza_price_comparison.csv");
        assert_eq!(export.body.lines().count(), 3);
    }

    #[test]
    fn test_apps_for_selection() {
        assert_eq!(service().apps_for("Pune", "Pizza"), vec!["Zomato", "Swiggy"]);
        assert!(service().apps_for("Goa", "Pizza").is_empty());
    }
}
