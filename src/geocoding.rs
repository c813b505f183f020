//! Geocoding with progressive fallback
//!
//! [`GeocodeClient`] walks a [`QueryPlan`] one variant at a time and stops at
//! the first variant that produces a usable place. A failed request only
//! skips its own variant. The HTTP side lives behind [`GeocodeSource`] so the
//! search order can be exercised without a network.

use crate::config::GeocodingConfig;
use crate::models::{PlaceCandidate, QueryVariant};
use crate::variants::QueryPlan;
use crate::{AgriWeatherError, Result, USER_AGENT};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// A geocoding backend answering one query variant at a time
#[async_trait]
pub trait GeocodeSource: Send + Sync {
    /// Places matching `variant`, in the service's own order
    async fn search(&self, variant: &QueryVariant) -> Result<Vec<PlaceCandidate>>;
}

/// Open-Meteo geocoding API client (no API key required)
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
    result_count: u8,
    language: String,
}

impl OpenMeteoGeocoder {
    /// Create a new geocoder from configuration
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AgriWeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            result_count: config.result_count,
            language: config.language.clone(),
        })
    }

    /// Search URL for one variant
    #[must_use]
    pub fn search_url(&self, variant: &QueryVariant) -> String {
        let mut url = format!(
            "{}/search?name={}&count={}&language={}&format=json",
            self.base_url,
            urlencoding::encode(&variant.query_text),
            self.result_count,
            urlencoding::encode(&self.language)
        );
        if variant.has_country() {
            url.push_str("&countryCode=");
            url.push_str(&variant.country_code);
        }
        url
    }
}

#[async_trait]
impl GeocodeSource for OpenMeteoGeocoder {
    #[instrument(name = "geocode_search", skip(self), fields(query = %variant))]
    async fn search(&self, variant: &QueryVariant) -> Result<Vec<PlaceCandidate>> {
        let url = self.search_url(variant);
        debug!("Geocode URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgriWeatherError::geocode_transport(&variant.query_text, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgriWeatherError::geocode_transport(
                &variant.query_text,
                format!("HTTP {status}"),
            ));
        }

        let payload: openmeteo::GeocodingResponse = response.json().await.map_err(|e| {
            AgriWeatherError::geocode_transport(
                &variant.query_text,
                format!("Failed to parse geocoding response: {e}"),
            )
        })?;

        let candidates: Vec<PlaceCandidate> = payload
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(openmeteo::GeocodingResult::into_candidate)
            .collect();

        debug!(
            "Geocoding '{}' returned {} usable results in {:.3}s",
            variant,
            candidates.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(candidates)
    }
}

/// Short-circuiting search over a [`QueryPlan`]
pub struct GeocodeClient<G> {
    source: G,
    fallback_country: String,
}

impl<G: GeocodeSource> GeocodeClient<G> {
    /// `fallback_country` is the country tried once when nothing else matched;
    /// an empty string disables that retry.
    pub fn new(source: G, fallback_country: impl Into<String>) -> Self {
        Self {
            source,
            fallback_country: fallback_country.into(),
        }
    }

    pub fn source(&self) -> &G {
        &self.source
    }

    /// Candidates from the first variant that yields any, or the fallback.
    ///
    /// A failed request only skips its own variant. `Ok` with an empty list
    /// means nothing matched anywhere; `Err` carries the last transport error
    /// when every request failed.
    pub async fn resolve_candidates(&self, plan: &QueryPlan) -> Result<Vec<PlaceCandidate>> {
        let mut answered = false;
        let mut last_error = None;

        let fallback = plan.fallback_variant(&self.fallback_country);
        for (variant, is_fallback) in plan
            .variants
            .iter()
            .map(|v| (v, false))
            .chain(fallback.iter().map(|v| (v, true)))
        {
            if is_fallback {
                info!(
                    "No variant matched '{}', retrying with '{}'",
                    plan.normalized, variant
                );
            }

            match self.try_variant(variant).await {
                Ok(candidates) if !candidates.is_empty() => {
                    info!(
                        "Found {} candidates for '{}' using variant '{}'",
                        candidates.len(),
                        plan.normalized,
                        variant
                    );
                    return Ok(candidates);
                }
                Ok(_) => answered = true,
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) if !answered => {
                warn!("Every geocoding request for '{}' failed", plan.normalized);
                Err(e)
            }
            _ => {
                warn!("No results found for location '{}'", plan.normalized);
                Ok(Vec::new())
            }
        }
    }

    async fn try_variant(&self, variant: &QueryVariant) -> Result<Vec<PlaceCandidate>> {
        match self.source.search(variant).await {
            Ok(mut candidates) => {
                candidates.retain(|c| c.latitude.is_finite() && c.longitude.is_finite());
                Ok(candidates)
            }
            Err(e) => {
                warn!("Skipping variant '{}': {}", variant, e);
                Err(e)
            }
        }
    }
}

/// `OpenMeteo` geocoding response structures
mod openmeteo {
    use crate::models::PlaceCandidate;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: Option<String>,
        pub latitude: Option<f64>,
        pub longitude: Option<f64>,
        pub population: Option<f64>,
        pub admin1: Option<String>,
        pub country_code: Option<String>,
    }

    impl GeocodingResult {
        /// `None` when the coordinates are missing or not finite
        pub fn into_candidate(self) -> Option<PlaceCandidate> {
            let population = self
                .population
                .filter(|p| p.is_finite() && *p > 0.0)
                .map_or(0, |p| p as u64);
            let label = PlaceCandidate::compose_label(
                self.name.as_deref().unwrap_or_default(),
                self.admin1.as_deref(),
                self.country_code.as_deref(),
            );
            PlaceCandidate::new(self.latitude?, self.longitude?, population, label).ok()
        }
    }
}
