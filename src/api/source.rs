use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    api::{Met, Tibber, met::ForecastPoint, tibber::Snapshot},
    prelude::*,
    weather::{Location, WeatherReport},
};

#[async_trait]
pub trait EnergySource: Send + Sync {
    /// Prices and consumption of the home, or of the first home when not specified.
    async fn get_snapshot(&self, home_id: Option<&str>) -> Result<Snapshot>;
}

#[async_trait]
impl EnergySource for Tibber {
    async fn get_snapshot(&self, home_id: Option<&str>) -> Result<Snapshot> {
        Self::get_snapshot(self, home_id).await
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    #[instrument(skip_all, fields(location = %location.name))]
    async fn get_report(&self, location: &Location, today: NaiveDate) -> Result<WeatherReport> {
        let points = self.get_forecast(location).await?;
        WeatherReport::try_new(location, &points, today)
    }

    /// Chronological forecast points.
    async fn get_forecast(&self, location: &Location) -> Result<Vec<ForecastPoint>>;
}

#[async_trait]
impl WeatherSource for Met {
    async fn get_forecast(&self, location: &Location) -> Result<Vec<ForecastPoint>> {
        Self::get_forecast(self, location.latitude, location.longitude).await
    }
}
