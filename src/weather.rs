//! Forecast client for the Open-Meteo forecast API

use crate::config::ForecastConfig;
use crate::models::{ForecastSeries, HourlyField};
use crate::{AgriWeatherError, Result, USER_AGENT};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Fixed forecast horizon in days
pub const FORECAST_DAYS: u8 = 7;

/// Fetches hourly weather/soil and daily maximum temperature series
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    /// Create a new forecast client from configuration
    pub fn new(config: &ForecastConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AgriWeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Forecast URL for a coordinate; rejects non-finite values
    pub fn forecast_url(&self, lat: f64, lon: f64) -> Result<String> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(AgriWeatherError::invalid_coordinates(lat, lon));
        }

        let hourly = HourlyField::ALL
            .iter()
            .map(|field| field.api_name())
            .collect::<Vec<_>>()
            .join(",");

        Ok(format!(
            "{}/forecast?latitude={}&longitude={}&timezone=auto&hourly={}&daily=temperature_2m_max&forecast_days={}",
            self.base_url,
            lat,
            lon,
            urlencoding::encode(&hourly),
            FORECAST_DAYS
        ))
    }

    /// Get the 7-day hourly and daily forecast for a coordinate
    #[instrument(skip(self))]
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries> {
        let url = self.forecast_url(lat, lon)?;
        info!("Getting 7-day forecast for coordinates: {:.4}, {:.4}", lat, lon);
        debug!("Forecast URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgriWeatherError::api(format!("Forecast request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Forecast request returned status {}", status);
            return Err(AgriWeatherError::ForecastUnavailable {
                status: status.as_u16(),
            });
        }

        let payload: openmeteo::ForecastResponse = response.json().await.map_err(|e| {
            AgriWeatherError::api(format!("Failed to parse Open-Meteo forecast response: {e}"))
        })?;

        let series = payload.into_series()?;
        series.validate()?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved forecast with {} hourly and {} daily points in {:.3}s",
            series.hourly.len(),
            series.daily.timestamps.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow forecast API response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(series)
    }
}

/// `OpenMeteo` forecast response structures and conversion
mod openmeteo {
    use crate::models::{DailySeries, ForecastSeries, HourlySeries};
    use crate::{AgriWeatherError, Result};
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub timezone: Option<String>,
        pub hourly: Option<HourlyData>,
        pub daily: Option<DailyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub time: Vec<String>,
        pub temperature_2m: Vec<Option<f64>>,
        pub relative_humidity_2m: Vec<Option<f64>>,
        pub precipitation: Vec<Option<f64>>,
        pub soil_temperature_0cm: Option<Vec<Option<f64>>>,
        pub soil_temperature_6cm: Option<Vec<Option<f64>>>,
        #[serde(rename = "soil_moisture_0_to_1cm")]
        pub soil_moisture_0_1cm: Option<Vec<Option<f64>>>,
        #[serde(rename = "soil_moisture_1_to_3cm")]
        pub soil_moisture_1_3cm: Option<Vec<Option<f64>>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<String>,
        pub temperature_2m_max: Vec<Option<f64>>,
    }

    impl ForecastResponse {
        pub fn into_series(self) -> Result<ForecastSeries> {
            let hourly = self
                .hourly
                .ok_or_else(|| AgriWeatherError::api("forecast payload: missing hourly"))?;
            let daily = self
                .daily
                .ok_or_else(|| AgriWeatherError::api("forecast payload: missing daily"))?;

            let timestamps = hourly
                .time
                .iter()
                .map(|raw| parse_hour(raw))
                .collect::<Result<Vec<_>>>()?;
            let dates = daily
                .time
                .iter()
                .map(|raw| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                        AgriWeatherError::api(format!("forecast payload: bad date '{raw}': {e}"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(ForecastSeries {
                hourly: HourlySeries {
                    timestamps,
                    temperature_2m: hourly.temperature_2m,
                    relative_humidity_2m: hourly.relative_humidity_2m,
                    precipitation: hourly.precipitation,
                    soil_temperature_0cm: hourly.soil_temperature_0cm,
                    soil_temperature_6cm: hourly.soil_temperature_6cm,
                    soil_moisture_0_1cm: hourly.soil_moisture_0_1cm,
                    soil_moisture_1_3cm: hourly.soil_moisture_1_3cm,
                },
                daily: DailySeries {
                    timestamps: dates,
                    temperature_2m_max: daily.temperature_2m_max,
                },
                timezone: self.timezone,
            })
        }
    }

    /// Open-Meteo hourly times are local "YYYY-MM-DDTHH:MM", sometimes with seconds
    fn parse_hour(raw: &str) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|e| AgriWeatherError::api(format!("forecast payload: bad time '{raw}': {e}")))
    }
}
