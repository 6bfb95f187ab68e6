//! Structured per-stage results.
//!
//! Builders return these instead of printing; the orchestrator collects them
//! into a [`RunReport`] so outcomes are inspectable and unit-testable.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CalendarReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u64,
    pub weekend_days: u64,
    pub holiday_days: u64,
    /// Consecutive-date gaps wider than one day (warning, never fatal)
    pub gaps: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductReport {
    pub products: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerReport {
    pub known_customers: u64,
    pub has_unknown: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub lines: u64,
    pub invoices: u64,
    pub customers: u64,
    pub products: u64,
    pub cancellations: u64,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub net_revenue_gbp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FxReport {
    pub days: u64,
    pub first_rate_date: Option<NaiveDate>,
    pub last_rate_date: Option<NaiveDate>,
    /// Distinct sales dates with no aligned rate (warning, never fatal)
    pub uncovered_sales_dates: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub lines: u64,
    pub net_revenue_gbp: f64,
    pub net_revenue_eur: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub rows: u64,
    pub countries: u64,
    pub dates: u64,
}

/// Results of the non-fatal data-quality checks
#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    /// Fact rows whose dimension key is missing (left-join recount;
    /// zero by construction, kept as a regression guard)
    pub orphan_product_rows: u64,
    pub orphan_customer_rows: u64,
    pub orphan_calendar_rows: u64,
    /// Staging rows the fact build silently dropped, recomputed here
    pub staging_rows_dropped: u64,
    pub staging_invalid_stock_code: u64,
    pub staging_null_price_or_qty: u64,
    /// Aggregate rows with impossible negative counts
    pub negative_orders: u64,
    pub negative_items: u64,
    /// Aggregate rows outside the coarse cross-currency tolerance
    pub tolerance_violations: u64,
}

impl QualityReport {
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.orphan_product_rows > 0 {
            issues.push(format!(
                "{} fact rows reference a missing product",
                self.orphan_product_rows
            ));
        }
        if self.orphan_customer_rows > 0 {
            issues.push(format!(
                "{} fact rows reference a missing customer",
                self.orphan_customer_rows
            ));
        }
        if self.orphan_calendar_rows > 0 {
            issues.push(format!(
                "{} fact rows reference a missing calendar date",
                self.orphan_calendar_rows
            ));
        }
        if self.negative_orders > 0 {
            issues.push(format!(
                "{} aggregate rows have negative order counts",
                self.negative_orders
            ));
        }
        if self.negative_items > 0 {
            issues.push(format!(
                "{} aggregate rows have negative item counts",
                self.negative_items
            ));
        }
        if self.tolerance_violations > 0 {
            issues.push(format!(
                "{} aggregate rows exceed the cross-currency tolerance",
                self.tolerance_violations
            ));
        }
        issues
    }
}

/// Outcome of a completed pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub calendar: CalendarReport,
    pub products: ProductReport,
    pub customers: CustomerReport,
    pub sales: SalesReport,
    pub fx: FxReport,
    pub conversion: ConversionReport,
    pub aggregate: AggregateReport,
    pub quality: QualityReport,
}

impl RunReport {
    /// Every warning the run surfaced, across all stages
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.calendar.gaps > 0 {
            warnings.push(format!(
                "calendar has {} gaps wider than one day",
                self.calendar.gaps
            ));
        }
        if self.fx.uncovered_sales_dates > 0 {
            warnings.push(format!(
                "{} sales dates have no aligned FX rate",
                self.fx.uncovered_sales_dates
            ));
        }
        warnings.extend(self.quality.issues());
        warnings
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
