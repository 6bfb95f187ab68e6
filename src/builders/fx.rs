//! Daily FX rate alignment over the sales date range.
//!
//! Sparse trading-day observations become one rate per calendar day via a
//! single left-to-right pass carrying the last seen rate. Gaps are filled
//! forward, never interpolated, and a rate is never applied before its
//! observation date.

use chrono::NaiveDate;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{DailyRate, FxObservation, SalesLine};
use crate::report::FxReport;

/// Expand observations into a contiguous daily series over `[min, max]`.
/// Days before the first observed rate are dropped (no backward-fill).
pub fn align_daily_rates(
    observations: &[FxObservation],
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> Vec<DailyRate> {
    // Null-rate observations are skipped. Staging's primary key rules out
    // duplicate dates; if handed duplicates anyway, the later value wins
    let observed: BTreeMap<NaiveDate, f64> = observations
        .iter()
        .filter_map(|o| o.gbp_per_eur.map(|rate| (o.date, rate)))
        .collect();

    let mut rates = Vec::new();
    let mut last_seen: Option<f64> = None;

    for date in min_date.iter_days().take_while(|d| *d <= max_date) {
        if let Some(rate) = observed.get(&date) {
            last_seen = Some(*rate);
        }
        if let Some(rate) = last_seen {
            rates.push(DailyRate {
                date,
                gbp_per_eur: rate,
            });
        }
    }

    rates
}

/// Align rates to the fact's date range and report coverage. A shortfall
/// means conversion rows for those dates will simply be absent downstream;
/// it is surfaced as a warning, not a failure.
pub fn build_daily_rates(
    observations: &[FxObservation],
    sales: &[SalesLine],
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> (Vec<DailyRate>, FxReport) {
    let rates = align_daily_rates(observations, min_date, max_date);

    let covered: BTreeSet<NaiveDate> = rates.iter().map(|r| r.date).collect();
    let sales_dates: BTreeSet<NaiveDate> = sales.iter().map(|l| l.date).collect();
    let uncovered = sales_dates.difference(&covered).count() as u64;

    let report = FxReport {
        days: rates.len() as u64,
        first_rate_date: rates.first().map(|r| r.date),
        last_rate_date: rates.last().map(|r| r.date),
        uncovered_sales_dates: uncovered,
    };

    info!(
        "Built daily_fx_rates with {} daily rates ({} sales dates uncovered)",
        report.days, uncovered
    );

    (rates, report)
}
