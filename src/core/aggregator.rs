use std::ops::{Add, Div, Mul};

use bon::Builder;
use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;

use crate::{
    core::{
        grouping::OrderedSums,
        record::ConsumptionRecord,
        window::{Window, days_in_month},
    },
    fmt::{LOCALE, capitalize},
    quantity::{Zero, cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Derives the cost, savings and forecast figures from the hourly and daily feeds.
///
/// The hourly feed is expected to cover the trailing 24 hours, and the daily one – the last
/// months, both in chronological order. Order is preserved in the series, never corrected.
#[must_use]
#[derive(Builder)]
pub struct Aggregator {
    /// Flat rate the savings are measured against.
    reference_rate: KilowattHourRate,

    /// Start of the «since» savings and of the monthly savings series.
    anchor: NaiveDateTime,

    /// Local wall-clock «now».
    now: NaiveDateTime,
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview<V> {
    pub today: V,
    pub this_month: V,

    /// Month-to-date total extrapolated linearly to the end of the month.
    pub forecast: V,
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSummary {
    pub today: Cost,
    pub this_month: Cost,
    pub last_month: Cost,
    pub since_anchor: Cost,
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HistoricalPrice {
    pub label: String,
    pub price: KilowattHourRate,
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MonthlySavings {
    pub month: String,
    pub amount: Cost,
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub cost: Overview<Cost>,
    pub consumption_overview: Overview<KilowattHours>,
    pub savings: SavingsSummary,
    pub historical_prices: Vec<HistoricalPrice>,
    pub monthly_savings: Vec<MonthlySavings>,
}

impl Aggregator {
    pub fn aggregate(
        &self,
        hourly: &[ConsumptionRecord],
        daily: &[ConsumptionRecord],
    ) -> Aggregation {
        Aggregation {
            cost: self.cost_overview(hourly, daily),
            consumption_overview: self.consumption_overview(hourly, daily),
            savings: self.savings_summary(hourly, daily),
            historical_prices: self.historical_prices(daily),
            monthly_savings: self.monthly_savings(daily),
        }
    }

    /// Total savings of the records starting within the window.
    pub fn savings<'a>(
        &self,
        records: impl IntoIterator<Item = &'a ConsumptionRecord>,
        window: Window,
    ) -> Cost {
        records
            .into_iter()
            .filter(|record| window.contains(&record.from))
            .map(|record| record.savings(self.reference_rate))
            .sum()
    }

    pub fn cost_overview(
        &self,
        hourly: &[ConsumptionRecord],
        daily: &[ConsumptionRecord],
    ) -> Overview<Cost> {
        self.overview(hourly, daily, |record| record.cost)
    }

    pub fn consumption_overview(
        &self,
        hourly: &[ConsumptionRecord],
        daily: &[ConsumptionRecord],
    ) -> Overview<KilowattHours> {
        self.overview(hourly, daily, |record| record.consumption)
    }

    /// Today's and month-to-date totals of the field, and the month-end forecast.
    ///
    /// The forecast assumes that every remaining day of the month costs the average of the days
    /// so far. Without any days so far, the forecast is zero.
    pub fn overview<V>(
        &self,
        hourly: &[ConsumptionRecord],
        daily: &[ConsumptionRecord],
        field: impl Fn(&ConsumptionRecord) -> V,
    ) -> Overview<V>
    where
        V: Copy + Zero + Add<Output = V> + Mul<f64, Output = V> + Div<f64, Output = V>,
    {
        let today_window = Window::today(self.now);
        let today = hourly
            .iter()
            .filter(|record| today_window.contains(&record.from))
            .map(&field)
            .fold(V::ZERO, |sum, value| sum + value);

        let month_window = Window::this_month(self.now);
        let (n_days, this_month) = daily
            .iter()
            .filter(|record| month_window.contains(&record.from))
            .map(&field)
            .fold((0_u32, V::ZERO), |(n_days, sum), value| (n_days + 1, sum + value));

        let forecast = if n_days == 0 {
            V::ZERO
        } else {
            let n_remaining_days = f64::from(days_in_month(self.now.date())) - f64::from(n_days);
            this_month + this_month / f64::from(n_days) * n_remaining_days
        };

        Overview { today, this_month, forecast }
    }

    pub fn savings_summary(
        &self,
        hourly: &[ConsumptionRecord],
        daily: &[ConsumptionRecord],
    ) -> SavingsSummary {
        SavingsSummary {
            today: self.savings(hourly, Window::today(self.now)),
            this_month: self.savings(daily, Window::this_month(self.now)),
            last_month: self.savings(daily, Window::last_month(self.now)),
            since_anchor: self.savings(daily, Window::since(self.anchor)),
        }
    }

    /// Daily spot prices since the start of the previous month.
    pub fn historical_prices(&self, daily: &[ConsumptionRecord]) -> Vec<HistoricalPrice> {
        let window = Window::since_previous_month(self.now);
        daily
            .iter()
            .filter(|record| window.contains(&record.from))
            .map(|record| HistoricalPrice {
                label: record.from.format("%d.%m").to_string(),
                price: record.unit_price,
            })
            .collect()
    }

    /// Savings since the anchor, grouped by month in the order the months first appear.
    pub fn monthly_savings(&self, daily: &[ConsumptionRecord]) -> Vec<MonthlySavings> {
        let window = Window::since(self.anchor);
        daily
            .iter()
            .filter(|record| window.contains(&record.from))
            .map(|record| (month_label(&record.from), record.savings(self.reference_rate)))
            .collect::<OrderedSums<_, _>>()
            .into_iter()
            .map(|(month, amount)| MonthlySavings { month, amount })
            .collect()
    }
}

/// `Oktober 2025`.
fn month_label(timestamp: &DateTime<Local>) -> String {
    capitalize(&timestamp.format_localized("%B %Y", LOCALE).to_string())
}
