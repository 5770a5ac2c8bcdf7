//! REST API Server for delivery price analytics
//!
//! Loads the price dataset once and serves every view over HTTP.
//!
//! Usage:
//!   ./target/release/api_server [--port PORT] [--data PATH]
//!
//! REST endpoints:
//!   GET /api/v1/health                          - Health check
//!   GET /api/v1/stats                           - Dataset statistics
//!   GET /api/v1/options                         - City / dish / app selector values
//!   GET /api/v1/comparison?city=X&dish=Y        - Tagged price comparison
//!   GET /api/v1/breakdown?city=X&dish=Y&app=Z   - Fee breakdown
//!   GET /api/v1/records?min=N&max=N&limit=N     - Final price range matches
//!   GET /api/v1/averages?group=city_app|app     - Average final price per group
//!   GET /api/v1/cheapest/cities                 - Cheapest app per city
//!   GET /api/v1/cheapest/overall                - Cheapest app overall
//!   GET /api/v1/export?city=X&dish=Y            - CSV download

use anyhow::Result;
use clap::Parser;
use delivery_price_analytics::api::{create_rest_router, AnalyticsService};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "REST API for food-delivery price analytics")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Price dataset CSV
    #[arg(long, default_value = "data/zomato_swiggy_full_dataset.csv")]
    data: PathBuf,
}

fn print_banner(port: u16, data: &Path, records: usize) {
    println!("============================================================");
    println!("         DELIVERY PRICE ANALYTICS API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!("  Dataset:  {} ({} records)", data.display(), records);
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/stats               Dataset statistics");
    println!("  GET /api/v1/options             Selector values");
    println!("  GET /api/v1/comparison          Price comparison");
    println!("  GET /api/v1/breakdown           Fee breakdown");
    println!("  GET /api/v1/records             Price range matches");
    println!("  GET /api/v1/averages            Group averages");
    println!("  GET /api/v1/cheapest/cities     Cheapest app per city");
    println!("  GET /api/v1/cheapest/overall    Cheapest app overall");
    println!("  GET /api/v1/export              CSV download");
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();

    // No data, no server
    let service = AnalyticsService::load(&args.data)?;
    print_banner(args.port, &args.data, service.dataset().len());

    let app = create_rest_router(Arc::new(service));
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
