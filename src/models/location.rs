//! Geocoded place candidates

use crate::{AgriWeatherError, Result};
use serde::{Deserialize, Serialize};

/// A geocoded place that a search could resolve to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceCandidate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Population reported by the geocoder, 0 when unknown
    pub population: u64,
    /// Display label, e.g. "Chennai, Tamil Nadu, IN"
    pub label: String,
}

impl PlaceCandidate {
    /// Create a candidate, rejecting non-finite coordinates
    pub fn new(latitude: f64, longitude: f64, population: u64, label: String) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(AgriWeatherError::invalid_coordinates(latitude, longitude));
        }

        Ok(Self {
            latitude,
            longitude,
            population,
            label,
        })
    }

    /// Candidate for a device-reported position. Skips geocoding entirely.
    pub fn current_position(latitude: f64, longitude: f64) -> Result<Self> {
        let label = format!("My Location ({latitude:.2}, {longitude:.2})");
        Self::new(latitude, longitude, 0, label)
    }

    /// Join name, admin region and country code with ", ", dropping empty parts
    #[must_use]
    pub fn compose_label(name: &str, admin1: Option<&str>, country_code: Option<&str>) -> String {
        [Some(name), admin1, country_code]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Label used when offering this candidate as one of several matches
    #[must_use]
    pub fn choice_label(&self) -> String {
        if self.population == 0 {
            self.label.clone()
        } else {
            format!("{} (pop {})", self.label, group_thousands(self.population))
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for PlaceCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label, self.format_coordinates())
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_label_skips_missing_parts() {
        assert_eq!(
            PlaceCandidate::compose_label("Chennai", Some("Tamil Nadu"), Some("IN")),
            "Chennai, Tamil Nadu, IN"
        );
        assert_eq!(
            PlaceCandidate::compose_label("Chennai", None, Some("IN")),
            "Chennai, IN"
        );
        assert_eq!(
            PlaceCandidate::compose_label("Chennai", Some(" "), None),
            "Chennai"
        );
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        let err = PlaceCandidate::new(f64::NAN, 80.27, 0, "x".into()).unwrap_err();
        assert!(matches!(err, AgriWeatherError::InvalidCoordinates { .. }));

        let err = PlaceCandidate::current_position(13.08, f64::INFINITY).unwrap_err();
        assert!(matches!(err, AgriWeatherError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_current_position_label() {
        let here = PlaceCandidate::current_position(13.0827, 80.2707).unwrap();
        assert_eq!(here.label, "My Location (13.08, 80.27)");
        assert_eq!(here.population, 0);
    }

    #[test]
    fn test_choice_label_groups_population() {
        let city = PlaceCandidate::new(19.07, 72.88, 12_691_836, "Mumbai, Maharashtra, IN".into())
            .unwrap();
        assert_eq!(
            city.choice_label(),
            "Mumbai, Maharashtra, IN (pop 12,691,836)"
        );

        let hamlet = PlaceCandidate::new(10.0, 78.0, 0, "Kottai, IN".into()).unwrap();
        assert_eq!(hamlet.choice_label(), "Kottai, IN");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(7), "7");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(123_456), "123,456");
    }
}
