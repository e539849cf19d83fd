//! Calendar months used to filter and total ledger entries.

use std::{fmt::Display, ops::RangeInclusive};

use serde::Deserialize;
use time::{Date, Month};

/// How many years either side of the current one the period picker offers.
pub const YEAR_WINDOW: i32 = 5;

/// A calendar month of a specific year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: Month,
}

impl Period {
    /// The period for `month` of `year`, or `None` if the year is outside
    /// the range of [Date].
    pub fn new(year: i32, month: Month) -> Option<Self> {
        let period = Self { year, month };

        period.checked_last_day().map(|_| period)
    }

    /// The period that contains `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The true last calendar day of the month, accounting for leap years.
    pub fn last_day(&self) -> Date {
        self.checked_last_day().unwrap_or(Date::MAX)
    }

    fn checked_last_day(&self) -> Option<Date> {
        (28..=31u8)
            .rev()
            .find_map(|day| Date::from_calendar_date(self.year, self.month, day).ok())
    }

    /// Every date from the first to the last day of the month.
    pub fn date_range(&self) -> RangeInclusive<Date> {
        self.first_day()..=self.last_day()
    }

    pub fn contains(&self, date: Date) -> bool {
        self.date_range().contains(&date)
    }

    pub fn previous(&self) -> Option<Self> {
        match self.month {
            Month::January => Self::new(self.year - 1, Month::December),
            month => Self::new(self.year, month.previous()),
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self.month {
            Month::December => Self::new(self.year + 1, Month::January),
            month => Self::new(self.year, month.next()),
        }
    }

    /// The years offered by the period picker, centred on `today`'s year.
    ///
    /// The period's own year is always included, in order, so that a month
    /// outside the window stays selected.
    pub fn year_choices(&self, today: Date) -> Vec<i32> {
        let mut years: Vec<i32> =
            ((today.year() - YEAR_WINDOW)..=(today.year() + YEAR_WINDOW)).collect();

        if let Err(index) = years.binary_search(&self.year) {
            years.insert(index, self.year);
        }

        years
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// The `?month=&year=` query parameters of the dashboard.
///
/// Kept as text so that junk values fall back to the current month instead
/// of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

impl PeriodQuery {
    /// The requested period, with any missing or invalid part taken from `today`.
    pub fn resolve(&self, today: Date) -> Period {
        let month = self
            .month
            .as_deref()
            .and_then(|month| month.trim().parse::<u8>().ok())
            .and_then(|month| Month::try_from(month).ok())
            .unwrap_or(today.month());
        let year = self
            .year
            .as_deref()
            .and_then(|year| year.trim().parse::<i32>().ok())
            .unwrap_or(today.year());

        Period::new(year, month).unwrap_or_else(|| {
            tracing::warn!("Requested period {month} {year} is out of range, using today's month");
            Period::containing(today)
        })
    }
}

/// The dashboard URL for `period`.
pub fn dashboard_url(period: Period) -> String {
    format!(
        "{}?month={}&year={}",
        crate::endpoints::DASHBOARD_VIEW,
        u8::from(period.month()),
        period.year()
    )
}
