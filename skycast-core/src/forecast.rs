//! Collapses the 5-day/3-hour forecast into per-day summaries.

use chrono::{Local, TimeZone};

use crate::model::{DailySummary, ForecastEntry};

/// At most this many calendar days are summarized.
pub const MAX_DAILY_SUMMARIES: usize = 5;

/// Aggregate 3-hour samples into daily summaries using the local timezone.
pub fn daily_summaries(entries: &[ForecastEntry]) -> Vec<DailySummary> {
    daily_summaries_in(entries, &Local)
}

/// Aggregate 3-hour samples into daily summaries, grouping by calendar date
/// in `tz`.
///
/// The first sample seen for a date seeds min, max and the representative
/// condition; later samples of the same date only widen min/max. The
/// first-seen condition wins on purpose, there is no "most common condition"
/// vote. Only the first [`MAX_DAILY_SUMMARIES`] distinct dates are kept.
/// Pure: no I/O, input untouched, deterministic for a fixed order and
/// timezone.
pub fn daily_summaries_in<Tz: TimeZone>(entries: &[ForecastEntry], tz: &Tz) -> Vec<DailySummary> {
    let mut summaries: Vec<DailySummary> = Vec::with_capacity(MAX_DAILY_SUMMARIES);

    for entry in entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();

        match summaries.iter_mut().find(|summary| summary.date == date) {
            Some(summary) => {
                summary.temp_min_c = summary.temp_min_c.min(entry.temperature_c);
                summary.temp_max_c = summary.temp_max_c.max(entry.temperature_c);
            }
            None => {
                if summaries.len() == MAX_DAILY_SUMMARIES {
                    continue;
                }
                summaries.push(DailySummary {
                    date,
                    temp_min_c: entry.temperature_c,
                    temp_max_c: entry.temperature_c,
                    condition_main: entry.condition_main.clone(),
                    condition_description: entry.condition_description.clone(),
                });
            }
        }
    }

    summaries
}
