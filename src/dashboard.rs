//! Dashboard projection of a forecast
//!
//! [`DashboardRenderer::render`] reads a [`ForecastSeries`] and produces three
//! views: current conditions (the final hourly entry), the daily maxima, and a
//! 3-hourly strip. The result serializes to JSON and implements `Display` for
//! terminal output. Missing readings, including absent soil columns, show as
//! [`PLACEHOLDER`].

use crate::models::{ForecastSeries, HourlyField};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Shown in place of any missing reading
pub const PLACEHOLDER: &str = "—";

/// Days in the daily view
pub const DAILY_DAYS: usize = 7;

/// Hourly entries covered by the strip window
pub const STRIP_SPAN: usize = 24;

/// Sampling step within the strip window
pub const STRIP_STEP: usize = 3;

/// Readings at the final hourly index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub time: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub soil_temperature_0cm_c: Option<f64>,
    pub soil_temperature_6cm_c: Option<f64>,
    pub soil_moisture_0_1cm: Option<f64>,
    pub soil_moisture_1_3cm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub temperature_max_c: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

/// Rendered views for one place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub label: String,
    pub timezone: Option<String>,
    /// `None` only for a forecast without hourly data
    pub current: Option<CurrentConditions>,
    pub daily: Vec<DailyEntry>,
    pub hourly: Vec<HourlyEntry>,
}

pub struct DashboardRenderer;

impl DashboardRenderer {
    #[must_use]
    pub fn render(series: &ForecastSeries, label: &str) -> Dashboard {
        let hourly = &series.hourly;

        let current = hourly.last_index().map(|idx| CurrentConditions {
            time: hourly.timestamps[idx],
            temperature_c: hourly.reading(HourlyField::Temperature, idx),
            humidity_pct: hourly.reading(HourlyField::RelativeHumidity, idx),
            precipitation_mm: hourly.reading(HourlyField::Precipitation, idx),
            soil_temperature_0cm_c: hourly.reading(HourlyField::SoilTemperature0cm, idx),
            soil_temperature_6cm_c: hourly.reading(HourlyField::SoilTemperature6cm, idx),
            soil_moisture_0_1cm: hourly.reading(HourlyField::SoilMoisture0To1cm, idx),
            soil_moisture_1_3cm: hourly.reading(HourlyField::SoilMoisture1To3cm, idx),
        });

        let daily = series
            .daily
            .timestamps
            .iter()
            .take(DAILY_DAYS)
            .enumerate()
            .map(|(i, date)| DailyEntry {
                date: *date,
                temperature_max_c: series.daily.temperature_2m_max.get(i).copied().flatten(),
            })
            .collect();

        let hourly_strip = strip_indices(hourly.len())
            .map(|idx| HourlyEntry {
                time: hourly.timestamps[idx],
                temperature_c: hourly.reading(HourlyField::Temperature, idx),
                humidity_pct: hourly.reading(HourlyField::RelativeHumidity, idx),
                precipitation_mm: hourly.reading(HourlyField::Precipitation, idx),
            })
            .collect();

        Dashboard {
            label: label.to_string(),
            timezone: series.timezone.clone(),
            current,
            daily,
            hourly: hourly_strip,
        }
    }
}

/// Hourly indices shown in the strip for a series of `len` entries.
///
/// The window starts one entry before the final index and spans at most
/// [`STRIP_SPAN`] entries, sampled every [`STRIP_STEP`].
pub fn strip_indices(len: usize) -> impl Iterator<Item = usize> {
    let start = len.saturating_sub(2);
    let end = len.min(start + STRIP_SPAN);
    (start..end).step_by(STRIP_STEP)
}

/// Whole degrees, without a negative zero
fn whole_degrees(value: Option<f64>) -> String {
    match value {
        Some(v) => {
            let rounded = v.round();
            let rounded = if rounded == 0.0 { 0.0 } else { rounded };
            format!("{rounded:.0}°C")
        }
        None => PLACEHOLDER.to_string(),
    }
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => PLACEHOLDER.to_string(),
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📍 {}", self.label)?;

        match &self.current {
            Some(now) => {
                match &self.timezone {
                    Some(tz) => writeln!(f, "   {} ({tz})", now.time.format("%a %H:%M"))?,
                    None => writeln!(f, "   {}", now.time.format("%a %H:%M"))?,
                }
                writeln!(f)?;
                writeln!(f, "🌡️  Now: {}", whole_degrees(now.temperature_c))?;
                writeln!(f, "   Humidity: {}", with_unit(now.humidity_pct, "%"))?;
                writeln!(
                    f,
                    "   Precipitation: {}",
                    with_unit(now.precipitation_mm, " mm")
                )?;
                writeln!(
                    f,
                    "   Soil Temp 0 cm: {}",
                    with_unit(now.soil_temperature_0cm_c, "°C")
                )?;
                writeln!(
                    f,
                    "   Soil Temp 6 cm: {}",
                    with_unit(now.soil_temperature_6cm_c, "°C")
                )?;
                writeln!(
                    f,
                    "   Soil Moist 0-1 cm: {}",
                    with_unit(now.soil_moisture_0_1cm, " m³/m³")
                )?;
                writeln!(
                    f,
                    "   Soil Moist 1-3 cm: {}",
                    with_unit(now.soil_moisture_1_3cm, " m³/m³")
                )?;
            }
            None => writeln!(f, "   No current conditions available")?,
        }

        if !self.daily.is_empty() {
            writeln!(f)?;
            writeln!(f, "📅 Daily maximum")?;
            for day in &self.daily {
                writeln!(
                    f,
                    "   {} {:>6}",
                    day.date.format("%a"),
                    whole_degrees(day.temperature_max_c)
                )?;
            }
        }

        if !self.hourly.is_empty() {
            writeln!(f)?;
            writeln!(f, "⏱️  Next hours")?;
            for hour in &self.hourly {
                writeln!(
                    f,
                    "   {}  {:>6}  RH {}  Rain {}",
                    hour.time.format("%H:00"),
                    whole_degrees(hour.temperature_c),
                    with_unit(hour.humidity_pct, "%"),
                    with_unit(hour.precipitation_mm, " mm")
                )?;
            }
        }

        Ok(())
    }
}
