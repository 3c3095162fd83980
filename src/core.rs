//! Aggregation of the consumption feeds into cost, savings and forecast figures.
//!
//! Everything here is a pure function of its inputs: «now» is always injected by the caller.

mod aggregator;
mod grouping;
pub mod record;
mod window;

pub use self::{
    aggregator::{Aggregation, Aggregator, HistoricalPrice, MonthlySavings, Overview, SavingsSummary},
    record::ConsumptionRecord,
};
