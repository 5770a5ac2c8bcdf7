//! Delivery price analytics: compare food-delivery apps across cities and dishes.

pub mod api;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;

pub use dataset::Dataset;
pub use error::{AnalyticsError, Result};
