use chrono::{DateTime, Local};
use reqwest::Client;
use serde::Deserialize;

use crate::{api::client, prelude::*, quantity::temperature::Celsius};

pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// MET Norway location forecast.
pub struct Api(Client);

impl Api {
    /// MET requires an identifying user agent, anonymous requests are rejected.
    pub fn try_new(user_agent: &str) -> Result<Self> {
        Ok(Self(client::builder().user_agent(user_agent).build()?))
    }

    #[instrument(skip_all, fields(latitude = latitude, longitude = longitude))]
    pub async fn get_forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastPoint>> {
        info!("fetching the forecast…");
        let response = self
            .0
            .get("https://api.met.no/weatherapi/locationforecast/2.0/compact")
            .query(&[("lat", coordinate(latitude)), ("lon", coordinate(longitude))])
            .send()
            .await?
            .error_for_status()?
            .json::<Response>()
            .await
            .context("failed to deserialize the MET forecast")?;
        let points: Vec<ForecastPoint> =
            response.properties.timeseries.into_iter().map(ForecastPoint::from).collect();
        debug!(n_points = points.len(), "fetched");
        Ok(points)
    }
}

/// MET accepts at most 4 decimals.
fn coordinate(value: f64) -> String {
    format!("{:.4}", (value * 10_000.0).trunc() / 10_000.0)
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForecastPoint {
    pub time: DateTime<Local>,
    pub temperature: Celsius,

    /// For example, `partlycloudy_day`.
    pub symbol_code: String,
}

impl From<Entry> for ForecastPoint {
    fn from(entry: Entry) -> Self {
        let data = entry.data;
        let symbol_code = [data.next_1_hours, data.next_6_hours, data.next_12_hours]
            .into_iter()
            .flatten()
            .find_map(|period| period.summary.map(|summary| summary.symbol_code))
            .unwrap_or_else(|| "cloudy".to_owned());
        Self {
            time: entry.time,
            temperature: Celsius::from(data.instant.details.air_temperature),
            symbol_code,
        }
    }
}

#[derive(Deserialize)]
struct Response {
    properties: Properties,
}

#[derive(Deserialize)]
struct Properties {
    timeseries: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    time: DateTime<Local>,
    data: EntryData,
}

#[derive(Deserialize)]
struct EntryData {
    instant: Instant,
    next_1_hours: Option<Period>,
    next_6_hours: Option<Period>,
    next_12_hours: Option<Period>,
}

#[derive(Deserialize)]
struct Instant {
    details: InstantDetails,
}

#[derive(Deserialize)]
struct InstantDetails {
    air_temperature: f64,
}

#[derive(Deserialize)]
struct Period {
    summary: Option<Summary>,
}

#[derive(Deserialize)]
struct Summary {
    symbol_code: String,
}
