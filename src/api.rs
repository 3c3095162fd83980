mod client;
pub mod met;
mod source;
pub mod tibber;

pub use self::{
    met::Api as Met,
    source::{EnergySource, WeatherSource},
    tibber::Api as Tibber,
};
