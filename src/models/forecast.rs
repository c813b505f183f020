//! Forecast series model
//!
//! Hourly and daily series are stored column-wise exactly as the forecast
//! service returns them: every column is aligned index-for-index with its
//! timestamps. Individual readings may be missing (`None`), and the soil
//! columns may be absent altogether.

use crate::{AgriWeatherError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Hourly measurement columns
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HourlySeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub temperature_2m: Vec<Option<f64>>,
    pub relative_humidity_2m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
    pub soil_temperature_0cm: Option<Vec<Option<f64>>>,
    pub soil_temperature_6cm: Option<Vec<Option<f64>>>,
    pub soil_moisture_0_1cm: Option<Vec<Option<f64>>>,
    pub soil_moisture_1_3cm: Option<Vec<Option<f64>>>,
}

/// Daily measurement columns
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DailySeries {
    pub timestamps: Vec<NaiveDate>,
    pub temperature_2m_max: Vec<Option<f64>>,
}

/// Hourly and daily forecast for one coordinate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ForecastSeries {
    pub hourly: HourlySeries,
    pub daily: DailySeries,
    /// IANA timezone the service resolved for `timezone=auto`
    pub timezone: Option<String>,
}

/// Named hourly column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourlyField {
    Temperature,
    RelativeHumidity,
    Precipitation,
    SoilTemperature0cm,
    SoilTemperature6cm,
    SoilMoisture0To1cm,
    SoilMoisture1To3cm,
}

impl HourlyField {
    pub const ALL: [HourlyField; 7] = [
        HourlyField::Temperature,
        HourlyField::RelativeHumidity,
        HourlyField::Precipitation,
        HourlyField::SoilTemperature0cm,
        HourlyField::SoilTemperature6cm,
        HourlyField::SoilMoisture0To1cm,
        HourlyField::SoilMoisture1To3cm,
    ];

    /// Field name as used on the wire
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            HourlyField::Temperature => "temperature_2m",
            HourlyField::RelativeHumidity => "relative_humidity_2m",
            HourlyField::Precipitation => "precipitation",
            HourlyField::SoilTemperature0cm => "soil_temperature_0cm",
            HourlyField::SoilTemperature6cm => "soil_temperature_6cm",
            HourlyField::SoilMoisture0To1cm => "soil_moisture_0_to_1cm",
            HourlyField::SoilMoisture1To3cm => "soil_moisture_1_to_3cm",
        }
    }
}

impl HourlySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Index of the final hourly entry, `None` for an empty series
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Column for a field, `None` if the service did not return it
    #[must_use]
    pub fn column(&self, field: HourlyField) -> Option<&[Option<f64>]> {
        match field {
            HourlyField::Temperature => Some(&self.temperature_2m),
            HourlyField::RelativeHumidity => Some(&self.relative_humidity_2m),
            HourlyField::Precipitation => Some(&self.precipitation),
            HourlyField::SoilTemperature0cm => self.soil_temperature_0cm.as_deref(),
            HourlyField::SoilTemperature6cm => self.soil_temperature_6cm.as_deref(),
            HourlyField::SoilMoisture0To1cm => self.soil_moisture_0_1cm.as_deref(),
            HourlyField::SoilMoisture1To3cm => self.soil_moisture_1_3cm.as_deref(),
        }
    }

    /// Reading at `index`, `None` when the column, the index or the value is missing
    #[must_use]
    pub fn reading(&self, field: HourlyField, index: usize) -> Option<f64> {
        self.column(field)
            .and_then(|values| values.get(index).copied().flatten())
    }
}

impl ForecastSeries {
    /// Check that every column matches its timestamp count
    pub fn validate(&self) -> Result<()> {
        let expected = self.hourly.len();
        for field in HourlyField::ALL {
            if let Some(values) = self.hourly.column(field)
                && values.len() != expected
            {
                return Err(AgriWeatherError::api(format!(
                    "hourly '{}' has {} values for {} timestamps",
                    field.api_name(),
                    values.len(),
                    expected
                )));
            }
        }

        if self.daily.temperature_2m_max.len() != self.daily.timestamps.len() {
            return Err(AgriWeatherError::api(format!(
                "daily 'temperature_2m_max' has {} values for {} dates",
                self.daily.temperature_2m_max.len(),
                self.daily.timestamps.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> ForecastSeries {
        ForecastSeries {
            hourly: HourlySeries {
                timestamps: vec![hour(0), hour(1)],
                temperature_2m: vec![Some(28.0), Some(27.5)],
                relative_humidity_2m: vec![Some(80.0), None],
                precipitation: vec![Some(0.0), Some(0.2)],
                soil_temperature_0cm: Some(vec![Some(30.1), Some(29.8)]),
                ..HourlySeries::default()
            },
            daily: DailySeries {
                timestamps: vec![hour(0).date()],
                temperature_2m_max: vec![Some(33.0)],
            },
            timezone: Some("Asia/Kolkata".into()),
        }
    }

    #[test]
    fn test_reading_handles_gaps() {
        let series = sample();
        assert_eq!(series.hourly.reading(HourlyField::Temperature, 1), Some(27.5));
        assert_eq!(series.hourly.reading(HourlyField::RelativeHumidity, 1), None);
        assert_eq!(series.hourly.reading(HourlyField::SoilTemperature6cm, 0), None);
        assert_eq!(series.hourly.reading(HourlyField::Temperature, 9), None);
        assert_eq!(series.hourly.last_index(), Some(1));
    }

    #[test]
    fn test_validate_accepts_aligned_series() {
        assert!(sample().validate().is_ok());
        assert!(ForecastSeries::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_misaligned_column() {
        let mut series = sample();
        series.hourly.soil_moisture_1_3cm = Some(vec![Some(0.3)]);
        let err = series.validate().unwrap_err();
        assert!(err.to_string().contains("soil_moisture_1_to_3cm"));

        let mut series = sample();
        series.daily.temperature_2m_max.push(Some(31.0));
        assert!(series.validate().is_err());
    }
}
