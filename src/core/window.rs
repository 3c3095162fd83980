use std::ops::{Bound, RangeBounds, RangeInclusive};

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Aggregation window over the local wall-clock time.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Window {
    /// Inclusive.
    pub start: NaiveDateTime,

    pub end: Bound<NaiveDateTime>,
}

impl Window {
    pub const fn since(start: NaiveDateTime) -> Self {
        Self { start, end: Bound::Unbounded }
    }

    /// Whole calendar days, both ends inclusive.
    pub fn days(days: RangeInclusive<NaiveDate>) -> Self {
        Self {
            start: start_of(*days.start()),
            end: Bound::Excluded(start_of(*days.end() + Days::new(1))),
        }
    }

    /// From the last midnight on, without an upper bound.
    pub fn today(now: NaiveDateTime) -> Self {
        Self::since(start_of(now.date()))
    }

    /// From the first day of the month on, without an upper bound.
    pub fn this_month(now: NaiveDateTime) -> Self {
        Self::since(start_of(first_of_month(now.date())))
    }

    /// The entire previous calendar month.
    pub fn last_month(now: NaiveDateTime) -> Self {
        let first_of_month = first_of_month(now.date());
        Self::days(first_of_previous_month(now.date())..=(first_of_month - Days::new(1)))
    }

    /// From the first day of the previous month on.
    pub fn since_previous_month(now: NaiveDateTime) -> Self {
        Self::since(start_of(first_of_previous_month(now.date())))
    }

    #[must_use]
    pub fn contains(&self, timestamp: &DateTime<Local>) -> bool {
        (Bound::Included(self.start), self.end).contains(&timestamp.naive_local())
    }
}

#[must_use]
pub fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

#[must_use]
pub fn first_of_previous_month(date: NaiveDate) -> NaiveDate {
    first_of_month(first_of_month(date) - Days::new(1))
}

/// Number of days in the month of the date: 28 to 31.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first_of_month = first_of_month(date);
    (first_of_month + Months::new(1)).signed_duration_since(first_of_month).num_days() as u32
}
