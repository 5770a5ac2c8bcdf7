//! Delivery price comparison report
//!
//! Run: ./target/release/delivery_price_analytics [OPTIONS] [SECTION]
//! Sections: all, comparison, breakdown, averages, cheapest, range

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use delivery_price_analytics::api::AnalyticsService;
use delivery_price_analytics::models::{Grouping, DEFAULT_PRICE_WINDOW, PRICE_WINDOW_BOUNDS};
use delivery_price_analytics::AnalyticsError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    All,
    Comparison,
    Breakdown,
    Averages,
    Cheapest,
    Range,
}

#[derive(Parser, Debug)]
#[command(name = "delivery_price_analytics")]
#[command(about = "Compare food-delivery app prices across cities and dishes")]
struct Args {
    /// Report section to print
    #[arg(value_enum, default_value = "all")]
    section: Section,

    /// Price dataset CSV
    #[arg(long, default_value = "data/zomato_swiggy_full_dataset.csv")]
    data: PathBuf,

    /// City to compare (defaults to the first city in the dataset)
    #[arg(long)]
    city: Option<String>,

    /// Dish to compare (defaults to the first dish in the dataset)
    #[arg(long)]
    dish: Option<String>,

    /// App for the fee breakdown (defaults to the first app offering the dish)
    #[arg(long)]
    app: Option<String>,

    /// Lower bound of the final price window
    #[arg(long, default_value_t = DEFAULT_PRICE_WINDOW.0)]
    min_price: f64,

    /// Upper bound of the final price window
    #[arg(long, default_value_t = DEFAULT_PRICE_WINDOW.1)]
    max_price: f64,

    /// Rows shown from the price window
    #[arg(long, default_value = "10")]
    limit: usize,

    /// Write the city/dish comparison as CSV into this directory
    #[arg(long)]
    export: Option<PathBuf>,
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(80));
    println!("  {}", title);
    println!("{}\n", "═".repeat(80));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(70));
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let (lo, hi) = PRICE_WINDOW_BOUNDS;
    for bound in [args.min_price, args.max_price] {
        if !(lo..=hi).contains(&bound) {
            bail!("price bounds must lie within {}..={}, got {}", lo, hi, bound);
        }
    }

    let service = AnalyticsService::load(&args.data)?;
    let options = service.options();
    let city = args.city.clone().or_else(|| options.cities.first().cloned()).unwrap_or_default();
    let dish = args.dish.clone().or_else(|| options.dishes.first().cloned()).unwrap_or_default();

    info!("Selection: {} in {}", dish, city);

    let all = args.section == Section::All;
    if all || args.section == Section::Comparison {
        run_comparison_section(&service, &city, &dish);
    }
    if all || args.section == Section::Breakdown {
        run_breakdown_section(&service, &city, &dish, args.app.as_deref())?;
    }
    if all || args.section == Section::Averages {
        run_averages_section(&service);
    }
    if all || args.section == Section::Cheapest {
        run_cheapest_section(&service)?;
    }
    if all || args.section == Section::Range {
        run_range_section(&service, args.min_price, args.max_price, args.limit)?;
    }

    if let Some(dir) = &args.export {
        let path = service.export_to_dir(dir, &city, &dish)?;
        println!("\nExported filtered data to {}", path.display());
    }

    Ok(())
}

fn run_comparison_section(service: &AnalyticsService, city: &str, dish: &str) {
    print_section_header(&format!("PRICE COMPARISON FOR '{}' IN {}", dish, city));

    let comparison = service.comparison(city, dish);
    if comparison.rows.is_empty() {
        println!("  No data for this selection.");
        return;
    }

    println!("  {:12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
             "App", "Base", "Delivery", "Packaging", "Platform", "Final", "Extra", "Tag");
    println!("  {}", "─".repeat(84));
    for row in &comparison.rows {
        let r = &row.record;
        println!("  {:12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}  {}",
                 r.app, r.base_price, r.delivery_fee, r.packaging_fee,
                 r.platform_fee, r.final_price, r.extra_charges, row.tag);
    }

    print_subsection("Final Price by App");
    let top = comparison
        .rows
        .iter()
        .map(|r| r.record.final_price)
        .fold(0.0_f64, f64::max);
    for row in &comparison.rows {
        let width = if top > 0.0 { (row.record.final_price / top * 50.0).round() as usize } else { 0 };
        println!("  {:12} {} {:.2}", row.record.app, "█".repeat(width), row.record.final_price);
    }
}

fn run_breakdown_section(
    service: &AnalyticsService,
    city: &str,
    dish: &str,
    app: Option<&str>,
) -> Result<()> {
    print_section_header("CHARGES BREAKDOWN");

    let app = match app {
        Some(a) => a.to_string(),
        None => match service.apps_for(city, dish).into_iter().next() {
            Some(a) => a,
            None => {
                println!("  No data for this selection.");
                return Ok(());
            }
        },
    };

    match service.fee_breakdown(city, dish, &app) {
        Ok(b) => {
            let [delivery, packaging, platform] = b.shares;
            println!("  App: {}", b.app);
            println!("  {:16} {:>10} {:>8}", "Fee", "Amount", "Share");
            println!("  {}", "─".repeat(36));
            println!("  {:16} {:>10.2} {:>7.1}%", "Delivery Fee", b.fees.delivery_fee, delivery);
            println!("  {:16} {:>10.2} {:>7.1}%", "Packaging Fee", b.fees.packaging_fee, packaging);
            println!("  {:16} {:>10.2} {:>7.1}%", "Platform Fee", b.fees.platform_fee, platform);
        }
        Err(e @ AnalyticsError::RecordNotFound { .. }) => println!("  {}", e),
        Err(e) => return Err(e.into()),
    }

    print_subsection("Cost Profile");
    let comparison = service.comparison(city, dish);
    println!("  {:12} {:>10} {:>10} {:>10} {:>10} {:>10}",
             "App", "Base", "Delivery", "Packaging", "Platform", "Final");
    for p in &comparison.profiles {
        println!("  {:12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                 p.app, p.base_price, p.delivery_fee, p.packaging_fee, p.platform_fee, p.final_price);
    }

    Ok(())
}

fn run_averages_section(service: &AnalyticsService) {
    print_section_header("AVERAGE FINAL PRICE ACROSS CITIES");

    let averages = service.averages(Grouping::CityApp);
    let apps = service.options().apps;

    // city -> app -> average, one column per app
    let mut table: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for (key, group) in &averages {
        if let Some(city) = &key.city {
            table.entry(city.as_str()).or_default().insert(key.app.as_str(), group.average);
        }
    }

    print!("  {:16}", "City");
    for app in &apps {
        print!(" {:>12}", app);
    }
    println!();
    println!("  {}", "─".repeat(16 + 13 * apps.len()));
    for (city, by_app) in &table {
        print!("  {:16}", city);
        for app in &apps {
            match by_app.get(app.as_str()) {
                Some(avg) => print!(" {:>12.2}", avg),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }
}

fn run_cheapest_section(service: &AnalyticsService) -> Result<()> {
    print_section_header("CHEAPEST APPS");

    print_subsection("App with Lowest Avg Price in Each City");
    println!("  {:16} {:12} {:>12}", "City", "App", "Avg Final");
    for (city, best) in service.cheapest_per_city() {
        println!("  {:16} {:12} {:>12.2}", city, best.app, best.average);
    }

    print_subsection("Cheapest App Overall (Across All Cities & Dishes)");
    let overall = service.overall_cheapest()?;
    println!("  {} is the overall cheapest on average (₹{:.2})", overall.app, overall.average);

    Ok(())
}

fn run_range_section(service: &AnalyticsService, min: f64, max: f64, limit: usize) -> Result<()> {
    print_section_header(&format!("RECORDS WITH FINAL PRICE IN {:.0}..={:.0}", min, max));

    let matches = service.price_range(min, max, limit)?;
    println!("  {} matching records, showing {}", matches.total_matches, matches.preview.len());
    println!();
    println!("  {:14} {:16} {:12} {:>10}", "City", "Dish", "App", "Final");
    println!("  {}", "─".repeat(56));
    for r in &matches.preview {
        println!("  {:14} {:16} {:12} {:>10.2}", r.city, r.dish, r.app, r.final_price);
    }

    Ok(())
}
