//! Data models for the AgriWeather application
//!
//! - Query: search variants derived from raw place text
//! - Location: geocoded place candidates
//! - Forecast: aligned hourly and daily forecast series

pub mod forecast;
pub mod location;
pub mod query;

// Re-export all public types for convenient access
pub use forecast::{DailySeries, ForecastSeries, HourlyField, HourlySeries};
pub use location::PlaceCandidate;
pub use query::QueryVariant;
