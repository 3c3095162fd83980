//! Norwegian number and date formatting for the page and the report.

use chrono::{Local, Locale, NaiveDateTime, TimeZone};
use itertools::Itertools;

use crate::quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate};

pub const LOCALE: Locale = Locale::nb_NO;

/// Upper-case the first character: `oktober 2025` → `Oktober 2025`.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// Whole kroner with the thousands grouped by a no-break space: `-1 235 kr`.
#[must_use]
pub fn kroner(cost: Cost) -> String {
    let rounded = cost.round().0;
    let digits = format!("{:.0}", rounded.abs());
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .join("\u{a0}");
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}\u{a0}kr")
}

#[must_use]
pub fn rate(rate: KilowattHourRate) -> String {
    format!("{:.2}\u{a0}kr", rate.0)
}

#[must_use]
pub fn energy(energy: KilowattHours) -> String {
    format!("{:.2}\u{a0}kWh", energy.0)
}

/// `1. oktober`.
#[must_use]
pub fn day_and_month(timestamp: NaiveDateTime) -> String {
    Local.from_local_datetime(&timestamp).earliest().map_or_else(
        || timestamp.format("%-d.%-m.").to_string(),
        |timestamp| timestamp.format_localized("%-d. %B", LOCALE).to_string(),
    )
}
