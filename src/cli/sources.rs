use std::sync::Arc;

use chrono::NaiveDateTime;
use clap::Parser;
use reqwest::Url;

use crate::{
    api::{Met, Tibber, met, tibber},
    dashboard::Service,
    prelude::*,
    quantity::rate::KilowattHourRate,
    weather::Location,
};

/// Upstream APIs and the savings parameters, shared by all commands.
#[derive(Parser)]
pub struct SourceArgs {
    #[clap(flatten)]
    pub tibber: TibberArgs,

    #[clap(flatten)]
    pub weather: WeatherArgs,

    #[clap(flatten)]
    pub aggregation: AggregationArgs,
}

impl SourceArgs {
    pub fn service(&self) -> Result<Service> {
        let locations = if self.weather.locations.is_empty() {
            Location::defaults()
        } else {
            self.weather.locations.clone()
        };
        Ok(Service::builder()
            .energy(Arc::new(Tibber::try_new(&self.tibber.access_token, self.tibber.url.clone())?))
            .weather(Arc::new(Met::try_new(&self.weather.user_agent)?))
            .locations(locations)
            .reference_rate(self.aggregation.reference_rate)
            .anchor(self.aggregation.anchor)
            .build())
    }
}

#[derive(Parser)]
pub struct TibberArgs {
    /// Tibber API access token.
    #[clap(long = "tibber-api-token", env = "TIBBER_API_TOKEN")]
    pub access_token: String,

    #[clap(long = "tibber-api-url", env = "TIBBER_API_URL", default_value = tibber::DEFAULT_URL)]
    pub url: Url,
}

#[derive(Parser)]
pub struct WeatherArgs {
    /// Forecast locations as `latitude,longitude,name`, Drammen and Nome when not set.
    #[clap(long = "weather-location", env = "WEATHER_LOCATIONS", value_delimiter = ';')]
    pub locations: Vec<Location>,

    /// MET Norway requires an identifying user agent.
    #[clap(long = "met-user-agent", env = "MET_USER_AGENT", default_value = met::DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

#[derive(Copy, Clone, Parser)]
pub struct AggregationArgs {
    /// Flat rate to measure the savings against («Norgespris»), kr/kWh.
    #[clap(long = "reference-rate", env = "REFERENCE_RATE", default_value = "0.50")]
    pub reference_rate: KilowattHourRate,

    /// Local time to count the savings from.
    #[clap(long = "savings-anchor", env = "SAVINGS_ANCHOR", default_value = "2025-10-01T00:00:00")]
    pub anchor: NaiveDateTime,
}
