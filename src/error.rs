//! Error types and handling for the `AgriWeather` application

use thiserror::Error;

/// Main error type for the `AgriWeather` library
#[derive(Error, Debug)]
pub enum AgriWeatherError {
    /// Blank or otherwise unusable place text
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Latitude or longitude is not a finite number
    #[error("Invalid coordinates: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Every geocoding variant, including the fallback, came back empty
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// A single geocoding request failed at the transport or HTTP level
    #[error("Geocoding request for '{query}' failed: {message}")]
    GeocodeTransport { query: String, message: String },

    /// The forecast service answered with a non-success status
    #[error("Forecast unavailable (HTTP {status})")]
    ForecastUnavailable { status: u16 },

    /// `select` was called with a candidate that was never offered
    #[error("Selection violation: {message}")]
    SelectionViolation { message: String },

    /// Forecast transport or decoding errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl AgriWeatherError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new invalid coordinates error
    #[must_use]
    pub fn invalid_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::InvalidCoordinates {
            latitude,
            longitude,
        }
    }

    /// Create a new not found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new geocoding transport error
    pub fn geocode_transport<Q: Into<String>, M: Into<String>>(query: Q, message: M) -> Self {
        Self::GeocodeTransport {
            query: query.into(),
            message: message.into(),
        }
    }

    /// Create a new selection violation
    pub fn selection_violation<S: Into<String>>(message: S) -> Self {
        Self::SelectionViolation {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AgriWeatherError::InvalidInput { message } => message.clone(),
            AgriWeatherError::InvalidCoordinates { .. } => "Invalid coordinates".to_string(),
            AgriWeatherError::NotFound { .. } => "Location not found".to_string(),
            AgriWeatherError::GeocodeTransport { .. } | AgriWeatherError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            AgriWeatherError::ForecastUnavailable { status } => {
                format!("Weather failed: {status}")
            }
            AgriWeatherError::SelectionViolation { .. } => {
                "Internal error: the chosen place was not one of the offered matches.".to_string()
            }
            AgriWeatherError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let input_err = AgriWeatherError::invalid_input("Enter a place name");
        assert!(matches!(input_err, AgriWeatherError::InvalidInput { .. }));

        let coord_err = AgriWeatherError::invalid_coordinates(f64::NAN, 1.0);
        assert!(matches!(coord_err, AgriWeatherError::InvalidCoordinates { .. }));

        let selection_err = AgriWeatherError::selection_violation("not offered");
        assert!(matches!(
            selection_err,
            AgriWeatherError::SelectionViolation { .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        let input_err = AgriWeatherError::invalid_input("Enter a place name");
        assert_eq!(input_err.user_message(), "Enter a place name");

        let not_found = AgriWeatherError::not_found("Atlantis");
        assert_eq!(not_found.user_message(), "Location not found");
        assert!(not_found.to_string().contains("Atlantis"));

        let forecast_err = AgriWeatherError::ForecastUnavailable { status: 503 };
        assert_eq!(forecast_err.user_message(), "Weather failed: 503");

        let transport = AgriWeatherError::geocode_transport("Pune", "timed out");
        assert!(transport.user_message().contains("Unable to connect"));
        assert!(transport.to_string().contains("Pune"));
    }
}
