//! Calendar dimension spanning full months around the transaction range.

use chrono::{Datelike, NaiveDate, Weekday};
use log::info;
use std::collections::BTreeSet;

use crate::model::CalendarDay;
use crate::report::CalendarReport;

/// Extend a transaction date range outward to whole months: the first day
/// of the starting month through the last day of the ending month.
pub fn calendar_span(min_date: NaiveDate, max_date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = first_of_month(min_date);

    // December rolls over into the next year
    let (end_year, end_month) = if max_date.month() == 12 {
        (max_date.year() + 1, 1)
    } else {
        (max_date.year(), max_date.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(end_year, end_month, 1)
        .and_then(|d| d.pred_opt())
        .expect("end of month is a valid date");

    (start, end)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("first of month is a valid date")
}

/// Generate one row per day over the extended range, tagging weekends and
/// holidays. Gap detection runs over the finished sequence; a gap signals
/// malformed inputs upstream and is reported, not raised.
pub fn build_calendar(
    min_date: NaiveDate,
    max_date: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> (Vec<CalendarDay>, CalendarReport) {
    let (start, end) = calendar_span(min_date, max_date);
    info!("Calendar dimension range: {} to {}", start, end);

    let days: Vec<CalendarDay> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| calendar_day(date, holidays))
        .collect();

    let report = CalendarReport {
        start,
        end,
        days: days.len() as u64,
        weekend_days: days.iter().filter(|d| d.is_weekend).count() as u64,
        holiday_days: days.iter().filter(|d| d.is_uk_holiday).count() as u64,
        gaps: gap_count(&days),
    };

    (days, report)
}

fn calendar_day(date: NaiveDate, holidays: &BTreeSet<NaiveDate>) -> CalendarDay {
    let weekday = date.weekday();
    let iso = date.iso_week();

    CalendarDay {
        date,
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        is_uk_holiday: holidays.contains(&date),
        iso_year: iso.year(),
        iso_week: iso.week(),
        month: date.month(),
        year: date.year(),
        day_of_week: weekday.num_days_from_sunday(),
        day_name: day_name(weekday).to_string(),
        month_name: month_name(date.month()).to_string(),
    }
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => unreachable!("chrono months are 1-12"),
    }
}

/// Count consecutive-date gaps wider than one day
fn gap_count(days: &[CalendarDay]) -> u64 {
    days.windows(2)
        .filter(|pair| (pair[1].date - pair[0].date).num_days() > 1)
        .count() as u64
}
