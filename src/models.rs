use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Bounds of the selectable final-price window
pub const PRICE_WINDOW_BOUNDS: (f64, f64) = (0.0, 500.0);

/// Window applied when the user has not picked one
pub const DEFAULT_PRICE_WINDOW: (f64, f64) = (100.0, 300.0);

/// Raw record from CSV ingestion
///
/// Price columns stay textual here so that a bad cell only drops its row.
#[derive(Debug, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Dish")]
    pub dish: String,
    #[serde(rename = "App")]
    pub app: String,
    #[serde(rename = "Base Price")]
    pub base_price: String,
    #[serde(rename = "Delivery Fee")]
    pub delivery_fee: String,
    #[serde(rename = "Packaging Fee")]
    pub packaging_fee: String,
    #[serde(rename = "Platform Fee")]
    pub platform_fee: String,
    #[serde(rename = "Final Price")]
    pub final_price: String,
}

impl CsvRecord {
    /// Convert to a typed record, naming the first offending field on failure.
    pub fn to_price_record(&self) -> Result<PriceRecord, String> {
        for (field, value) in [("City", &self.city), ("Dish", &self.dish), ("App", &self.app)] {
            if value.trim().is_empty() {
                return Err(format!("empty {}", field));
            }
        }

        Ok(PriceRecord::new(
            self.city.trim(),
            self.dish.trim(),
            self.app.trim(),
            parse_amount("Base Price", &self.base_price)?,
            parse_amount("Delivery Fee", &self.delivery_fee)?,
            parse_amount("Packaging Fee", &self.packaging_fee)?,
            parse_amount("Platform Fee", &self.platform_fee)?,
            parse_amount("Final Price", &self.final_price)?,
        ))
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("non-numeric {}: {:?}", field, raw)),
    }
}

/// One delivery quote: what an app charges for a dish in a city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub city: String,
    pub dish: String,
    pub app: String,
    pub base_price: f64,
    pub delivery_fee: f64,
    pub packaging_fee: f64,
    pub platform_fee: f64,
    pub final_price: f64,
    /// `final_price - base_price`, fixed at construction
    pub extra_charges: f64,
}

impl PriceRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        city: impl Into<String>,
        dish: impl Into<String>,
        app: impl Into<String>,
        base_price: f64,
        delivery_fee: f64,
        packaging_fee: f64,
        platform_fee: f64,
        final_price: f64,
    ) -> Self {
        Self {
            city: city.into(),
            dish: dish.into(),
            app: app.into(),
            base_price,
            delivery_fee,
            packaging_fee,
            platform_fee,
            final_price,
            extra_charges: final_price - base_price,
        }
    }

    /// Sum of the itemised components
    pub fn itemised_total(&self) -> f64 {
        self.base_price + self.delivery_fee + self.packaging_fee + self.platform_fee
    }

    /// Whether the final price matches its components within `tolerance`
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        (self.final_price - self.itemised_total()).abs() <= tolerance
    }

    pub fn fee_breakdown(&self) -> FeeBreakdown {
        FeeBreakdown {
            delivery_fee: self.delivery_fee,
            packaging_fee: self.packaging_fee,
            platform_fee: self.platform_fee,
        }
    }
}

/// Cheap/costly label relative to the cheapest quote in a subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceTag {
    Cheaper,
    Costly,
}

impl fmt::Display for PriceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceTag::Cheaper => write!(f, "Cheaper"),
            PriceTag::Costly => write!(f, "Costly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedRecord {
    #[serde(flatten)]
    pub record: PriceRecord,
    pub tag: PriceTag,
}

/// Fee components of a single quote, for proportional display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeBreakdown {
    pub delivery_fee: f64,
    pub packaging_fee: f64,
    pub platform_fee: f64,
}

impl FeeBreakdown {
    pub fn total(&self) -> f64 {
        self.delivery_fee + self.packaging_fee + self.platform_fee
    }

    /// Percentage of the fee total per component (delivery, packaging, platform).
    /// All zero when there are no fees.
    pub fn shares(&self) -> [f64; 3] {
        let total = self.total();
        if total <= 0.0 {
            return [0.0; 3];
        }
        [
            self.delivery_fee * 100.0 / total,
            self.packaging_fee * 100.0 / total,
            self.platform_fee * 100.0 / total,
        ]
    }
}

/// Full cost shape of one quote (radar view row)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostProfile {
    pub app: String,
    pub base_price: f64,
    pub delivery_fee: f64,
    pub packaging_fee: f64,
    pub platform_fee: f64,
    pub final_price: f64,
}

impl From<&PriceRecord> for CostProfile {
    fn from(r: &PriceRecord) -> Self {
        Self {
            app: r.app.clone(),
            base_price: r.base_price,
            delivery_fee: r.delivery_fee,
            packaging_fee: r.packaging_fee,
            platform_fee: r.platform_fee,
            final_price: r.final_price,
        }
    }
}

/// Which fields partition records for averaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    CityApp,
    App,
}

/// Group identity. `city` is `None` under [`Grouping::App`].
///
/// Ordering is city first, then app name, which is what the cheapest-app
/// tie-break relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub city: Option<String>,
    pub app: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupAverage {
    pub average: f64,
    pub count: usize,
}

/// Winner of a cheapest-on-average comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheapestApp {
    pub app: String,
    pub average: f64,
}

impl CheapestApp {
    /// Lower average wins; equal averages fall back to app name order.
    pub(crate) fn beats(&self, other: &CheapestApp) -> bool {
        match self.average.partial_cmp(&other.average) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.app < other.app,
            _ => false,
        }
    }
}
