use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Entry;

/// Calendar range used to narrow entries before aggregating them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    #[default]
    All,
    Day,
    Week,
    Month,
}

impl Window {
    pub fn next(self) -> Self {
        match self {
            Window::All => Window::Day,
            Window::Day => Window::Week,
            Window::Week => Window::Month,
            Window::Month => Window::All,
        }
    }

    /// Whether an entry dated `date` falls in this window around `reference`.
    /// Both instants are compared as calendar dates in the reference's time zone;
    /// an undated entry only belongs to `All`.
    pub fn contains<Tz: TimeZone>(self, date: Option<DateTime<Utc>>, reference: &DateTime<Tz>) -> bool {
        if self == Window::All {
            return true;
        }

        let Some(date) = date else {
            return false;
        };
        let day = date.with_timezone(&reference.timezone()).date_naive();
        let today = reference.date_naive();

        match self {
            Window::All => true,
            Window::Day => day == today,
            Window::Week => day.iso_week() == today.iso_week(),
            Window::Month => day.year() == today.year() && day.month() == today.month(),
        }
    }

    pub fn label(self, today: NaiveDate) -> String {
        match self {
            Window::All => "All time".to_string(),
            Window::Day => format!("Today ({})", today.format("%d/%m/%Y")),
            Window::Week => format!(
                "This week ({} - {})",
                start_of_week(today).format("%d/%m/%Y"),
                today.format("%d/%m/%Y")
            ),
            Window::Month => format!("This month ({})", today.format("%B %Y")),
        }
    }
}

pub fn filter_entries<Tz: TimeZone>(
    entries: &[Entry],
    window: Window,
    reference: &DateTime<Tz>,
) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| window.contains(entry.date, reference))
        .cloned()
        .collect()
}

pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let days_from_monday = day.weekday().num_days_from_monday() as i64;
    day - Duration::days(days_from_monday)
}
