//! Pipeline orchestration: staging → dimensions → fact → FX-aligned fact →
//! aggregate → validation, strictly in that order against one store.
//!
//! Each stage's relation is fully materialized before the next stage reads
//! it, and every relation is dropped and recreated, so a re-run from the
//! same staging snapshot is idempotent. There is no catch-and-retry: a
//! fatal precondition aborts the run and propagates unchanged, leaving
//! downstream tables stale or absent.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::HashSet;

use crate::builders::{aggregate, calendar, conversion, dimensions, fx, sales};
use crate::config::WarehouseConfig;
use crate::report::RunReport;
use crate::staging;
use crate::store::Warehouse;

/// Rebuild the whole warehouse from the staged relations.
pub fn run_pipeline(store: &mut Warehouse, config: &WarehouseConfig) -> Result<RunReport> {
    info!("Starting warehouse build");

    // Staging preconditions are the only fatal territory
    let records = staging::read_retail(store)?;
    let observations = staging::read_fx(store)?;
    let holidays = staging::read_holidays(store)?;

    let (min_date, max_date) = match sales::fact_date_bounds(&records, config) {
        Some(bounds) => bounds,
        None => bail!("Staging data contains zero fact-eligible rows"),
    };
    info!("Transaction date range: {} to {}", min_date, max_date);

    // Dimensions
    let (calendar_days, calendar_report) = calendar::build_calendar(min_date, max_date, &holidays);
    store.rebuild_with_rows(&calendar_days)?;
    if calendar_report.gaps > 0 {
        warn!(
            "Calendar sequence has {} gaps wider than one day",
            calendar_report.gaps
        );
    }

    let (products, product_report) = dimensions::build_products(&records, config);
    store.rebuild_with_rows(&products)?;

    let (customers, customer_report) = dimensions::build_customers(&records, config);
    store.rebuild_with_rows(&customers)?;

    // Base fact
    let product_codes: HashSet<String> =
        products.iter().map(|p| p.stock_code.clone()).collect();
    let customer_ids: HashSet<i64> = customers.iter().map(|c| c.key.storage_id()).collect();
    let calendar_dates: HashSet<NaiveDate> = calendar_days.iter().map(|d| d.date).collect();

    let (sales_lines, sales_report) = sales::build_sales_fact(
        &records,
        &product_codes,
        &customer_ids,
        &calendar_dates,
        config,
    );
    store.rebuild_with_rows(&sales_lines)?;

    // FX alignment over the fact's own date range
    let (fact_min, fact_max) = match (sales_report.min_date, sales_report.max_date) {
        (Some(min), Some(max)) => (min, max),
        _ => (min_date, max_date),
    };
    let (daily_rates, fx_report) =
        fx::build_daily_rates(&observations, &sales_lines, fact_min, fact_max);
    store.rebuild_with_rows(&daily_rates)?;
    if fx_report.uncovered_sales_dates > 0 {
        warn!(
            "{} sales dates have no aligned FX rate; their conversion rows will be absent",
            fx_report.uncovered_sales_dates
        );
    }

    // Converted fact and rollup
    let (converted, conversion_report) = conversion::convert_sales(&sales_lines, &daily_rates);
    store.rebuild_with_rows(&converted)?;

    let (agg_rows, aggregate_report) =
        aggregate::aggregate_country_day(&converted, &customers, &calendar_days, config);
    store.rebuild_with_rows(&agg_rows)?;

    // Non-fatal quality gates
    let quality = crate::quality::validate(store, config)?;

    for name in crate::schema::tables::table_names() {
        info!("{}: {} rows", name, store.count(name)?);
    }

    let report = RunReport {
        calendar: calendar_report,
        products: product_report,
        customers: customer_report,
        sales: sales_report,
        fx: fx_report,
        conversion: conversion_report,
        aggregate: aggregate_report,
        quality,
    };

    let warnings = report.warnings();
    if warnings.is_empty() {
        info!("Warehouse build completed with no warnings");
    } else {
        info!("Warehouse build completed with {} warnings", warnings.len());
    }

    Ok(report)
}
