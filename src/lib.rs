//! `AgriWeather` - place resolution and short-range weather/soil forecasts
//!
//! This library turns free-form place text into coordinates through
//! progressively more generic geocoding queries, lets the caller pick among
//! ambiguous matches, and projects a 7-day Open-Meteo forecast into
//! dashboard views.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod geocoding;
pub mod location_resolver;
pub mod models;
pub mod ranking;
pub mod telemetry;
pub mod variants;
pub mod weather;

// Re-export core types for public API
pub use config::AgriWeatherConfig;
pub use dashboard::{Dashboard, DashboardRenderer};
pub use error::AgriWeatherError;
pub use geocoding::{GeocodeClient, GeocodeSource, OpenMeteoGeocoder};
pub use location_resolver::{ResolutionController, ResolutionOutcome, ResolutionState};
pub use models::{ForecastSeries, PlaceCandidate, QueryVariant};
pub use ranking::CandidateRanker;
pub use variants::{QueryPlan, VariantGenerator};
pub use weather::ForecastClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!("AgriWeather/", env!("CARGO_PKG_VERSION"));

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AgriWeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(USER_AGENT.ends_with(VERSION));
    }
}
