//! Typed rows for the staging and warehouse relations.
//!
//! In-memory logic works with these structs; SQL only appears at the storage
//! layer. The "unknown customer" sentinel is a proper enum variant here and
//! becomes the persisted magic id only when a row is bound to a statement.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Persisted surrogate id for the unknown-customer sentinel
pub const UNKNOWN_CUSTOMER_ID: i64 = -1;

/// Customer dimension key. Null customer ids in staging collapse onto the
/// `Unknown` variant so real ids can never be confused with the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CustomerKey {
    Known(i64),
    Unknown,
}

impl CustomerKey {
    /// Coalesce a nullable staging customer id onto the key space
    pub fn from_staging(customer_id: Option<i64>) -> Self {
        match customer_id {
            Some(id) => CustomerKey::Known(id),
            None => CustomerKey::Unknown,
        }
    }

    /// The id persisted in `dim_customer` / `fct_sales`
    pub fn storage_id(self) -> i64 {
        match self {
            CustomerKey::Known(id) => id,
            CustomerKey::Unknown => UNKNOWN_CUSTOMER_ID,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, CustomerKey::Unknown)
    }
}

// =============================================================================
// Staging rows
// =============================================================================

/// One staged retail transaction line (`raw_retail_data`)
#[derive(Debug, Clone, PartialEq)]
pub struct RetailRecord {
    pub invoice_no: String,
    pub stock_code: Option<String>,
    pub description: Option<String>,
    pub qty: Option<i64>,
    pub invoice_ts: NaiveDateTime,
    pub unit_price_gbp: Option<f64>,
    pub customer_id: Option<i64>,
    pub country: Option<String>,
}

impl RetailRecord {
    /// Transaction date, truncated from the invoice timestamp
    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_ts.date()
    }
}

/// One staged holiday date (`raw_uk_holidays`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HolidayDate(pub NaiveDate);

/// One staged FX observation (`raw_fx_rates`); rate may be null for
/// malformed observations, which the aligner skips
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxObservation {
    pub date: NaiveDate,
    pub gbp_per_eur: Option<f64>,
}

// =============================================================================
// Warehouse rows
// =============================================================================

/// One row of `dim_calendar`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_uk_holiday: bool,
    pub iso_year: i32,
    pub iso_week: u32,
    pub month: u32,
    pub year: i32,
    /// Sunday = 0 .. Saturday = 6
    pub day_of_week: u32,
    pub day_name: String,
    pub month_name: String,
}

/// One row of `dim_product`
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub stock_code: String,
    pub description: Option<String>,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
}

/// One row of `dim_customer`
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub key: CustomerKey,
    pub country: String,
}

/// One row of `fct_sales` (base currency)
#[derive(Debug, Clone, PartialEq)]
pub struct SalesLine {
    pub invoice_no: String,
    pub stock_code: String,
    pub customer: CustomerKey,
    pub date: NaiveDate,
    pub qty: i64,
    pub unit_price_gbp: f64,
    pub gross_amount_gbp: f64,
}

/// One row of `daily_fx_rates` after forward-fill alignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRate {
    pub date: NaiveDate,
    pub gbp_per_eur: f64,
}

/// One row of `fct_sales_eur`
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSalesLine {
    pub invoice_no: String,
    pub stock_code: String,
    pub customer: CustomerKey,
    pub date: NaiveDate,
    pub qty: i64,
    pub unit_price_gbp: f64,
    pub unit_price_eur: f64,
    pub gross_amount_gbp: f64,
    pub gross_amount_eur: f64,
    pub fx_rate_used: f64,
}

/// One row of `agg_country_day`
#[derive(Debug, Clone, PartialEq)]
pub struct CountryDayRow {
    pub date: NaiveDate,
    pub country: String,
    pub orders: i64,
    pub items: i64,
    pub net_qty: i64,
    pub net_revenue_gbp: f64,
    pub net_revenue_eur: f64,
    pub is_weekend: bool,
    pub is_uk_holiday: bool,
    pub iso_week: u32,
    pub iso_year: i32,
    pub month: u32,
    pub year: i32,
}
