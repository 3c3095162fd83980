use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate};

/// Consumption and its cost over a single hour or day.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    /// Inclusive.
    pub from: DateTime<Local>,

    /// Exclusive.
    pub to: DateTime<Local>,

    pub cost: Cost,

    /// All-inclusive spot price, VAT included.
    pub unit_price: KilowattHourRate,

    #[serde(rename = "unitPriceVAT")]
    pub unit_price_vat: KilowattHourRate,

    pub consumption: KilowattHours,

    pub consumption_unit: String,
}

impl ConsumptionRecord {
    /// Savings of the reference rate over the spot price.
    ///
    /// Positive when the spot price was above the reference rate.
    pub fn savings(&self, reference_rate: KilowattHourRate) -> Cost {
        (self.unit_price - reference_rate) * self.consumption
    }
}

#[cfg(test)]
pub mod fixtures {
    use chrono::{TimeDelta, TimeZone};

    use super::*;

    pub fn local(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    /// Record with the cost charged at the unit price.
    pub fn record(
        from: DateTime<Local>,
        duration: TimeDelta,
        consumption: f64,
        unit_price: f64,
    ) -> ConsumptionRecord {
        ConsumptionRecord {
            from,
            to: from + duration,
            cost: Cost::from(consumption * unit_price),
            unit_price: KilowattHourRate::from(unit_price),
            unit_price_vat: KilowattHourRate::from(unit_price * 0.2),
            consumption: KilowattHours::from(consumption),
            consumption_unit: "kWh".to_owned(),
        }
    }

    pub fn daily(from: DateTime<Local>, consumption: f64, unit_price: f64) -> ConsumptionRecord {
        record(from, TimeDelta::days(1), consumption, unit_price)
    }

    pub fn hourly(from: DateTime<Local>, consumption: f64, unit_price: f64) -> ConsumptionRecord {
        record(from, TimeDelta::hours(1), consumption, unit_price)
    }
}
