//! Weather cards: current conditions and a three-day outlook per location.

use std::{fmt, str::FromStr};

use chrono::{Days, NaiveDate, Timelike};
use serde::Serialize;

use crate::{api::met::ForecastPoint, fmt::LOCALE, prelude::*, quantity::temperature::Celsius};

/// Forecast location: `latitude,longitude,name`.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Location {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                latitude: 59.761_408_780_821_62,
                longitude: 10.101_495_914_357_141,
                name: "Vinneslia, Drammen".to_owned(),
            },
            Self {
                latitude: 59.305_252_382_257_24,
                longitude: 9.138_461_785_099_198,
                name: "Barlaugkleiva, Nome".to_owned(),
            },
        ]
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let mut parts = text.splitn(3, ',').map(str::trim);
        let (Some(latitude), Some(longitude), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("expected `latitude,longitude,name`, got `{text}`");
        };
        ensure!(!name.is_empty(), "location name is empty in `{text}`");
        Ok(Self {
            latitude: latitude.parse().with_context(|| format!("invalid latitude `{latitude}`"))?,
            longitude: longitude
                .parse()
                .with_context(|| format!("invalid longitude `{longitude}`"))?,
            name: name.to_owned(),
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{},{},{}", self.latitude, self.longitude, self.name)
    }
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub current: Conditions,

    /// Up to three days after today.
    pub forecast: Vec<DailyForecast>,
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub temperature: i64,
    pub symbol_code: String,
    pub icon: &'static str,

    /// Today's range.
    pub min: i64,
    pub max: i64,
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// Short weekday: `tir`.
    pub label: String,

    /// Around noon.
    pub temperature: i64,

    pub symbol_code: String,
    pub icon: &'static str,
    pub min: i64,
    pub max: i64,
}

impl WeatherReport {
    /// Build the report from the chronological forecast points.
    pub fn try_new(location: &Location, points: &[ForecastPoint], today: NaiveDate) -> Result<Self> {
        let first = points.first().context("the forecast is empty")?;
        let (min, max) = temperature_range(points, today);
        let current = Conditions {
            temperature: first.temperature.round_to_degrees(),
            symbol_code: first.symbol_code.clone(),
            icon: icon(&first.symbol_code),
            min,
            max,
        };
        let forecast = (1..=3)
            .filter_map(|n_days| today.checked_add_days(Days::new(n_days)))
            .filter_map(|date| {
                let point = points.iter().find(|point| {
                    point.time.date_naive() == date && point.time.hour().abs_diff(12) < 2
                })?;
                let (min, max) = temperature_range(points, date);
                Some(DailyForecast {
                    label: point
                        .time
                        .format_localized("%a", LOCALE)
                        .to_string()
                        .trim_end_matches('.')
                        .to_owned(),
                    temperature: point.temperature.round_to_degrees(),
                    symbol_code: point.symbol_code.clone(),
                    icon: icon(&point.symbol_code),
                    min,
                    max,
                })
            })
            .collect();
        Ok(Self { location: location.name.clone(), current, forecast })
    }
}

/// Rounded minimum and maximum on the date, `(0, 0)` without any points on the date.
fn temperature_range(points: &[ForecastPoint], date: NaiveDate) -> (i64, i64) {
    points
        .iter()
        .filter(|point| point.time.date_naive() == date)
        .map(|point| point.temperature)
        .fold(None, |range: Option<(Celsius, Celsius)>, temperature| {
            Some(range.map_or((temperature, temperature), |(min, max)| {
                (min.min(temperature), max.max(temperature))
            }))
        })
        .map_or((0, 0), |(min, max)| (min.round_to_degrees(), max.round_to_degrees()))
}

#[must_use]
pub fn icon(symbol_code: &str) -> &'static str {
    if symbol_code.starts_with("clearsky") {
        "☀️"
    } else if symbol_code.starts_with("fair") {
        "🌤️"
    } else if symbol_code.starts_with("partlycloudy") {
        "⛅"
    } else if symbol_code.starts_with("cloudy") {
        "☁️"
    } else if symbol_code.contains("rain") && symbol_code.contains("thunder") {
        "⛈️"
    } else if symbol_code.contains("rain") {
        "🌧️"
    } else if symbol_code.contains("snow") {
        "❄️"
    } else if symbol_code.contains("sleet") {
        "🌨️"
    } else if symbol_code.starts_with("fog") {
        "🌫️"
    } else {
        "☁️"
    }
}
