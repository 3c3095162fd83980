//! Everything the page shows, computed from a single Tibber snapshot and the weather forecasts.

use std::{
    ops::{Add, Div},
    sync::Arc,
};

use bon::Builder;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    api::{EnergySource, WeatherSource, tibber::Price},
    core::{Aggregation, Aggregator},
    prelude::*,
    quantity::{Zero, cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    weather::{Location, WeatherReport},
};

#[must_use]
#[derive(Builder)]
pub struct Service {
    energy: Arc<dyn EnergySource>,
    weather: Arc<dyn WeatherSource>,

    #[builder(default)]
    locations: Vec<Location>,

    reference_rate: KilowattHourRate,
    anchor: NaiveDateTime,
}

impl Service {
    #[instrument(skip_all, fields(home_id = ?home_id))]
    pub async fn build(&self, home_id: Option<&str>, now: DateTime<Local>) -> Result<Dashboard> {
        let (snapshot, weather) =
            tokio::join!(self.energy.get_snapshot(home_id), self.get_weather(now.date_naive()));
        let snapshot = snapshot.context("failed to fetch the energy snapshot")?;

        let aggregation = Aggregator::builder()
            .reference_rate(self.reference_rate)
            .anchor(self.anchor)
            .now(now.naive_local())
            .build()
            .aggregate(&snapshot.hourly, &snapshot.daily);

        let homes = snapshot
            .homes
            .iter()
            .map(|home| HomeOption {
                id: home.id.clone(),
                name: home.display_name().to_owned(),
                is_selected: home.id == snapshot.home_id,
            })
            .collect();
        let price_chart = PriceChart::new(
            &snapshot.prices.today,
            &snapshot.prices.tomorrow,
            now,
            self.reference_rate,
        );
        let consumption_chart = ConsumptionChart::new(
            snapshot.hourly.iter().map(|record| (record.from, record.consumption)),
            self.reference_rate,
        );
        let historical_price_stats =
            Stats::new(aggregation.historical_prices.iter().map(|price| price.price));
        let monthly_savings_total =
            aggregation.monthly_savings.iter().map(|savings| savings.amount).sum();

        info!(
            n_prices = price_chart.points.len(),
            n_hours = consumption_chart.points.len(),
            n_weather_reports = weather.len(),
            "built",
        );
        Ok(Dashboard {
            homes,
            home_id: snapshot.home_id,
            current_price: snapshot.prices.current.map(|price| price.total),
            reference_rate: self.reference_rate,
            anchor: self.anchor,
            aggregation,
            price_chart,
            consumption_chart,
            historical_price_stats,
            monthly_savings_total,
            weather,
        })
    }

    /// Fetch the reports for all locations concurrently, dropping the failed ones.
    async fn get_weather(&self, today: NaiveDate) -> Vec<WeatherReport> {
        let handles: Vec<_> = self
            .locations
            .iter()
            .cloned()
            .map(|location| {
                let weather = Arc::clone(&self.weather);
                tokio::spawn(async move {
                    let report = weather.get_report(&location, today).await;
                    (location, report)
                })
            })
            .collect();
        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((_, Ok(report))) => reports.push(report),
                Ok((location, Err(error))) => {
                    warn!(location = %location.name, "failed to fetch the weather: {error:#}");
                }
                Err(error) => {
                    warn!("weather task failed: {error:#}");
                }
            }
        }
        reports
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub homes: Vec<HomeOption>,
    pub home_id: String,
    pub current_price: Option<KilowattHourRate>,
    pub reference_rate: KilowattHourRate,

    /// Start of the savings tracking.
    pub anchor: NaiveDateTime,

    #[serde(flatten)]
    pub aggregation: Aggregation,

    pub price_chart: PriceChart,
    pub consumption_chart: ConsumptionChart,
    pub historical_price_stats: Option<Stats<KilowattHourRate>>,
    pub monthly_savings_total: Cost,
    pub weather: Vec<WeatherReport>,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeOption {
    pub id: String,
    pub name: String,
    pub is_selected: bool,
}

/// Average, minimum and maximum of a series.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stats<V> {
    pub average: V,
    pub min: V,
    pub max: V,
}

impl<V> Stats<V>
where
    V: Copy + Ord + Zero + Add<Output = V> + Div<f64, Output = V>,
{
    /// Returns `None` for an empty series.
    pub fn new(values: impl IntoIterator<Item = V>) -> Option<Self> {
        let mut values = values.into_iter();
        let first = values.next()?;
        let (n_values, sum, min, max) = values.fold(
            (1_u32, first, first, first),
            |(n_values, sum, min, max), value| {
                (n_values + 1, sum + value, min.min(value), max.max(value))
            },
        );
        Some(Self { average: sum / f64::from(n_values), min, max })
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChart {
    /// Today's prices followed by tomorrow's.
    pub points: Vec<PricePoint>,

    pub reference_rate: KilowattHourRate,
    pub stats: Option<Stats<KilowattHourRate>>,

    /// Tomorrow's prices get published around 13:00.
    pub is_tomorrow_published: bool,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// `HH:MM`.
    pub label: String,

    /// `I dag` or `I morgen`.
    pub day: &'static str,

    pub price: KilowattHourRate,
    pub is_current: bool,
}

impl PriceChart {
    pub fn new(
        today: &[Price],
        tomorrow: &[Price],
        now: DateTime<Local>,
        reference_rate: KilowattHourRate,
    ) -> Self {
        let current_index = today.iter().rposition(|price| price.starts_at <= now);
        let points: Vec<PricePoint> = today
            .iter()
            .enumerate()
            .map(|(index, price)| (price, "I dag", Some(index) == current_index))
            .chain(tomorrow.iter().map(|price| (price, "I morgen", false)))
            .map(|(price, day, is_current)| PricePoint {
                label: price.starts_at.format("%H:%M").to_string(),
                day,
                price: price.total,
                is_current,
            })
            .collect();
        Self {
            stats: Stats::new(points.iter().map(|point| point.price)),
            points,
            reference_rate,
            is_tomorrow_published: !tomorrow.is_empty(),
        }
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionChart {
    pub points: Vec<ConsumptionPoint>,
    pub stats: Option<Stats<KilowattHours>>,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionPoint {
    /// `HH:00`.
    pub label: String,

    pub consumption: KilowattHours,

    /// At the reference rate.
    pub cost: Cost,
}

impl ConsumptionChart {
    pub fn new(
        hourly: impl IntoIterator<Item = (DateTime<Local>, KilowattHours)>,
        reference_rate: KilowattHourRate,
    ) -> Self {
        let points: Vec<ConsumptionPoint> = hourly
            .into_iter()
            .map(|(from, consumption)| ConsumptionPoint {
                label: from.format("%H:00").to_string(),
                consumption,
                cost: consumption * reference_rate,
            })
            .collect();
        Self { stats: Stats::new(points.iter().map(|point| point.consumption)), points }
    }
}

#[cfg(test)]
pub mod fixtures {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        api::{
            met::ForecastPoint,
            tibber::{Home, PriceInfo, Snapshot},
        },
        core::record::fixtures::{daily, hourly, local},
        quantity::temperature::Celsius,
    };

    pub struct StubEnergy;

    #[async_trait]
    impl EnergySource for StubEnergy {
        async fn get_snapshot(&self, home_id: Option<&str>) -> Result<Snapshot> {
            let home_id = home_id.unwrap_or("home-1");
            ensure!(home_id.starts_with("home-"), "home not found");
            Ok(snapshot(home_id))
        }
    }

    pub struct StubWeather;

    #[async_trait]
    impl WeatherSource for StubWeather {
        async fn get_forecast(&self, location: &Location) -> Result<Vec<ForecastPoint>> {
            ensure!(location.name != "Nowhere", "no forecast");
            Ok(vec![ForecastPoint {
                time: local(2025, 11, 10, 15),
                temperature: Celsius::from(4.6),
                symbol_code: "rain".to_owned(),
            }])
        }
    }

    pub fn price(starts_at: DateTime<Local>, total: f64) -> Price {
        Price {
            total: KilowattHourRate::from(total),
            energy: KilowattHourRate::from(total * 0.75),
            tax: KilowattHourRate::from(total * 0.25),
            starts_at,
        }
    }

    pub fn snapshot(home_id: &str) -> Snapshot {
        Snapshot {
            homes: vec![
                Home { id: "home-1".to_owned(), nickname: Some("Hjemme".to_owned()), address: None },
                Home { id: "home-2".to_owned(), nickname: None, address: None },
            ],
            home_id: home_id.to_owned(),
            prices: PriceInfo {
                current: Some(price(local(2025, 11, 10, 15), 1.25)),
                today: (0..24).map(|hour| price(local(2025, 11, 10, hour), 0.25 + 0.05 * f64::from(hour))).collect(),
                tomorrow: Vec::new(),
            },
            daily: (1..=9).map(|day| daily(local(2025, 11, day, 0), 4.0, 0.5)).collect(),
            hourly: (0..15).map(|hour| hourly(local(2025, 11, 10, hour), 1.0, 1.5)).collect(),
        }
    }

    pub fn service(locations: Vec<Location>) -> Service {
        Service::builder()
            .energy(Arc::new(StubEnergy))
            .weather(Arc::new(StubWeather))
            .locations(locations)
            .reference_rate(KilowattHourRate::from(0.5))
            .anchor(local(2025, 10, 1, 0).naive_local())
            .build()
    }
}
