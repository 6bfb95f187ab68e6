//! Post-build data-quality checks.
//!
//! Everything here is a recount over the persisted relations, independent
//! of the builders' own bookkeeping, and strictly non-fatal: findings land
//! in the [`QualityReport`] and the log, never in an `Err`.

use anyhow::{Context, Result};
use log::warn;
use rusqlite::params;

use crate::config::WarehouseConfig;
use crate::report::QualityReport;
use crate::store::Warehouse;

/// Run the three check classes: orphan-key detection, structural sanity on
/// the aggregate, and the coarse cross-currency tolerance comparison.
pub fn validate(store: &Warehouse, config: &WarehouseConfig) -> Result<QualityReport> {
    let report = QualityReport {
        orphan_product_rows: orphan_count(store, "dim_product", "stock_code")?,
        orphan_customer_rows: orphan_count(store, "dim_customer", "customer_id")?,
        orphan_calendar_rows: orphan_count(store, "dim_calendar", "date")?,
        staging_rows_dropped: staging_rows_dropped(store)?,
        staging_invalid_stock_code: staging_invalid_stock_code(store, config)?,
        staging_null_price_or_qty: staging_null_price_or_qty(store, config)?,
        negative_orders: count_where(store, "agg_country_day", "orders < 0")?,
        negative_items: count_where(store, "agg_country_day", "items < 0")?,
        tolerance_violations: tolerance_violations(store, config)?,
    };

    for issue in report.issues() {
        warn!("Data quality: {}", issue);
    }
    if report.staging_rows_dropped > 0 {
        warn!(
            "Data quality: fact build dropped {} staging rows ({} invalid stock code, {} null price/qty)",
            report.staging_rows_dropped,
            report.staging_invalid_stock_code,
            report.staging_null_price_or_qty
        );
    }

    Ok(report)
}

/// Left-join the fact back to a dimension and count unmatched rows.
/// Zero by construction; a nonzero count means a builder regressed.
fn orphan_count(store: &Warehouse, dim_table: &str, key: &str) -> Result<u64> {
    let sql = format!(
        "SELECT COUNT(*)
         FROM fct_sales f
         LEFT JOIN {dim} d ON f.{key} = d.{key}
         WHERE d.{key} IS NULL",
        dim = dim_table,
        key = key
    );
    let count: i64 = store
        .conn()
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("Orphan check against {} failed", dim_table))?;
    Ok(count as u64)
}

/// How many staging rows the fact build's inner joins and filters dropped,
/// recomputed from the tables rather than trusted from the builder
fn staging_rows_dropped(store: &Warehouse) -> Result<u64> {
    let staged = store.count("raw_retail_data")?;
    let kept = store.count("fct_sales")?;
    Ok((staged - kept).max(0) as u64)
}

fn staging_invalid_stock_code(store: &Warehouse, config: &WarehouseConfig) -> Result<u64> {
    let count: i64 = store.conn().query_row(
        "SELECT COUNT(*) FROM raw_retail_data
         WHERE stock_code IS NULL OR stock_code = '' OR stock_code = ?1",
        params![config.missing_stock_placeholder],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn staging_null_price_or_qty(store: &Warehouse, config: &WarehouseConfig) -> Result<u64> {
    let count: i64 = store.conn().query_row(
        "SELECT COUNT(*) FROM raw_retail_data
         WHERE stock_code IS NOT NULL AND stock_code != '' AND stock_code != ?1
           AND (unit_price_gbp IS NULL OR qty IS NULL)",
        params![config.missing_stock_placeholder],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn count_where(store: &Warehouse, table: &str, predicate: &str) -> Result<u64> {
    let count: i64 = store.conn().query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE {}", table, predicate),
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// Coarse sanity check: re-derive base revenue from converted revenue via a
/// single fixed reference ratio and flag rows outside the relative
/// tolerance. The ratio deliberately does not track the daily FX series, so
/// rates far from the reference will trip it; treat violations as a prompt
/// to look, not as proof of corruption. The denominator is signed, so
/// zero-revenue and negative-revenue (return-heavy) rows never flag.
fn tolerance_violations(store: &Warehouse, config: &WarehouseConfig) -> Result<u64> {
    let count: i64 = store.conn().query_row(
        "SELECT COUNT(*) FROM agg_country_day
         WHERE ABS(net_revenue_eur * ?1 - net_revenue_gbp)
               / NULLIF(net_revenue_gbp, 0.0) > ?2",
        params![config.reference_gbp_per_eur, config.revenue_tolerance],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}
