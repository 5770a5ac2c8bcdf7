//! Synthetic price dataset generator
//!
//! Writes one quote per (city, dish, app) with randomised base prices and
//! fees. A fraction of rows can have their final price nudged away from the
//! sum of components, to exercise the loader's data-quality reporting.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --seed <N>               Random seed for reproducibility (optional)
//!   --inconsistent-rate <F>  Fraction of rows with a perturbed final price (default: 0.05)
//!   --output <PATH>          Output CSV path (default: data/zomato_swiggy_full_dataset.csv)

use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

const CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bangalore", "Hyderabad", "Chennai", "Kolkata", "Pune", "Ahmedabad",
];

/// Dish name and typical restaurant base price
const DISHES: &[(&str, f64)] = &[
    ("Margherita Pizza", 249.0),
    ("Chicken Biryani", 229.0),
    ("Paneer Butter Masala", 199.0),
    ("Masala Dosa", 99.0),
    ("Veg Burger", 129.0),
    ("Hakka Noodles", 159.0),
    ("Chole Bhature", 139.0),
    ("Butter Chicken", 269.0),
];

const APPS: &[&str] = &["Zomato", "Swiggy"];

/// Synthetic data generator for delivery price comparison
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic food-delivery price dataset")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows whose final price disagrees with its components (0.0 - 1.0)
    #[arg(long, default_value = "0.05")]
    inconsistent_rate: f64,

    /// Maximum relative deviation of a base price from the dish's typical price
    #[arg(long, default_value = "0.15")]
    price_jitter: f64,

    /// Output CSV path
    #[arg(long, default_value = "data/zomato_swiggy_full_dataset.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct OutputRecord {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Dish")]
    dish: String,
    #[serde(rename = "App")]
    app: String,
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
}

/// Round to whole rupees
fn rupees(amount: f64) -> f64 {
    amount.round()
}

/// Restaurant price for a dish with some per-city variation
fn perturb_base(typical: f64, jitter_pct: f64, rng: &mut impl Rng) -> f64 {
    let factor = 1.0 + rng.gen_range(-jitter_pct..=jitter_pct);
    rupees((typical * factor).max(1.0))
}

/// Each app charges from its own fee ranges
fn app_fees(app: &str, rng: &mut impl Rng) -> (f64, f64, f64) {
    match app {
        "Zomato" => (
            rupees(rng.gen_range(20.0..=60.0)),
            rupees(rng.gen_range(5.0..=25.0)),
            rupees(rng.gen_range(4.0..=10.0)),
        ),
        _ => (
            rupees(rng.gen_range(15.0..=55.0)),
            rupees(rng.gen_range(5.0..=20.0)),
            rupees(rng.gen_range(3.0..=10.0)),
        ),
    }
}

fn generate_record(city: &str, dish: (&str, f64), app: &str, args: &Args, rng: &mut impl Rng) -> OutputRecord {
    let (dish_name, typical) = dish;
    let base_price = perturb_base(typical, args.price_jitter, rng);
    let (delivery_fee, packaging_fee, platform_fee) = app_fees(app, rng);
    let mut final_price = base_price + delivery_fee + packaging_fee + platform_fee;

    if rng.gen::<f64>() < args.inconsistent_rate {
        final_price = rupees(final_price + rng.gen_range(-30.0..=30.0)).max(0.0);
    }

    OutputRecord {
        city: city.to_string(),
        dish: dish_name.to_string(),
        app: app.to_string(),
        base_price,
        delivery_fee,
        packaging_fee,
        platform_fee,
        final_price,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !(0.0..=1.0).contains(&args.inconsistent_rate) {
        return Err("--inconsistent-rate must be between 0.0 and 1.0".into());
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    println!("Generating synthetic price data...");
    println!("  Cities: {}, Dishes: {}, Apps: {}", CITIES.len(), DISHES.len(), APPS.len());
    println!("  Inconsistent rate: {:.1}%", args.inconsistent_rate * 100.0);
    println!("  Seed: {:?}", args.seed);

    let mut writer = WriterBuilder::new().has_headers(true).from_path(&args.output)?;
    let mut count = 0;

    for city in CITIES {
        for dish in DISHES {
            for app in APPS {
                writer.serialize(generate_record(city, *dish, app, &args, &mut rng))?;
                count += 1;
            }
        }
    }

    writer.flush()?;
    println!("Wrote {} records to {:?}", count, args.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(inconsistent_rate: f64) -> Args {
        Args {
            seed: Some(7),
            inconsistent_rate,
            price_jitter: 0.15,
            output: PathBuf::from("unused.csv"),
        }
    }

    #[test]
    fn test_consistent_rows_sum_up() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let r = generate_record("Pune", ("Masala Dosa", 99.0), "Swiggy", &args(0.0), &mut rng);
            assert_eq!(r.final_price, r.base_price + r.delivery_fee + r.packaging_fee + r.platform_fee);
            assert!(r.base_price >= 84.0 && r.base_price <= 114.0);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = generate_record("Pune", ("Veg Burger", 129.0), "Zomato", &args(0.5), &mut StdRng::seed_from_u64(1));
        let b = generate_record("Pune", ("Veg Burger", 129.0), "Zomato", &args(0.5), &mut StdRng::seed_from_u64(1));
        assert_eq!(a.final_price, b.final_price);
        assert_eq!(a.base_price, b.base_price);
    }
}
