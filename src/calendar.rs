use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc};

use crate::constants::GRID_SETTINGS;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Inclusive span of calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }
}

/// Current calendar day in UTC. Only the presentation layer reads the clock.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// The trailing year shown by the grid: 365 days ending on `today`.
pub fn contributions_date_range(today: NaiveDate) -> DateRange {
    date_range_ending(today, GRID_SETTINGS.window_days)
}

pub fn date_range_ending(today: NaiveDate, days: i64) -> DateRange {
    let days = days.max(1);
    DateRange {
        start: today - ChronoDuration::days(days - 1),
        end: today,
    }
}

pub fn all_dates_in_range(range: &DateRange) -> Vec<NaiveDate> {
    range.start.iter_days().take(range.len_days()).collect()
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - ChronoDuration::days(day_of_week(date) as i64)
}

/// Number of Sunday-aligned columns needed to hold every day of `range`.
pub fn week_span(range: &DateRange) -> usize {
    if range.end < range.start {
        return 0;
    }
    let days = (week_start(range.end) - week_start(range.start)).num_days();
    days as usize / GRID_SETTINGS.days_per_week + 1
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
}

pub type WeekColumn = [Option<NaiveDate>; 7];

/// Week-major calendar lattice. Row 0 of every column is Sunday; `None`
/// marks a cell outside the range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionsGrid {
    range: DateRange,
    columns: Vec<WeekColumn>,
}

impl ContributionsGrid {
    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn weeks(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[WeekColumn] {
        &self.columns
    }

    pub fn cell(&self, week: usize, day: usize) -> Option<NaiveDate> {
        self.columns.get(week).and_then(|column| column.get(day).copied().flatten())
    }

    pub fn position_of(&self, date: NaiveDate) -> Option<(usize, usize)> {
        if !self.range.contains(date) {
            return None;
        }
        let day = day_of_week(date);
        self.columns
            .iter()
            .position(|column| column[day] == Some(date))
            .map(|week| (week, day))
    }

    /// Columns that contain the first day of a month, with the month's
    /// short name.
    pub fn month_labels(&self) -> Vec<(usize, String)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(week, column)| {
                column
                    .iter()
                    .flatten()
                    .find(|date| date.day() == 1)
                    .map(|date| (week, date.format("%b").to_string()))
            })
            .collect()
    }
}

/// Lays `range` out in Sunday-aligned weeks, sized so nothing is dropped.
pub fn build_grid(range: &DateRange) -> ContributionsGrid {
    build_grid_with_capacity(range, week_span(range))
}

/// Fixed-capacity layout. Dates that would land past column `max_weeks`
/// are clipped without error.
pub fn build_grid_with_capacity(range: &DateRange, max_weeks: usize) -> ContributionsGrid {
    let mut columns: Vec<WeekColumn> = vec![[None; 7]; max_weeks];

    let mut week_index = 0usize;
    let mut current_week_start = week_start(range.start);

    for date in all_dates_in_range(range) {
        let start = week_start(date);
        if start != current_week_start {
            week_index += 1;
            current_week_start = start;
        }

        if let Some(column) = columns.get_mut(week_index) {
            column[day_of_week(date)] = Some(date);
        }
    }

    ContributionsGrid {
        range: *range,
        columns,
    }
}
