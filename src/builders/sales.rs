//! Base-currency sales fact, one row per invoice line item.

use chrono::NaiveDate;
use log::info;
use std::collections::{BTreeSet, HashSet};

use crate::config::WarehouseConfig;
use crate::model::{CustomerKey, RetailRecord, SalesLine};
use crate::report::SalesReport;

/// Date bounds over fact-eligible staging rows (valid stock code, non-null
/// price and quantity). Drives the calendar span and, transitively, the FX
/// alignment range. `None` when no row qualifies.
pub fn fact_date_bounds(
    records: &[RetailRecord],
    config: &WarehouseConfig,
) -> Option<(NaiveDate, NaiveDate)> {
    records
        .iter()
        .filter(|r| is_fact_eligible(r, config))
        .map(|r| r.invoice_date())
        .fold(None, |acc, date| match acc {
            None => Some((date, date)),
            Some((min, max)) => Some((min.min(date), max.max(date))),
        })
}

fn is_fact_eligible(record: &RetailRecord, config: &WarehouseConfig) -> bool {
    config.is_valid_stock_code(record.stock_code.as_deref())
        && record.unit_price_gbp.is_some()
        && record.qty.is_some()
}

/// Inner-join staging rows against the three dimensions and compute line
/// amounts. Rows failing any join or missing price/qty are dropped without
/// ceremony; the validator recounts them later. Cancellations stay in so
/// returns surface as negative revenue downstream.
pub fn build_sales_fact(
    records: &[RetailRecord],
    product_codes: &HashSet<String>,
    customer_ids: &HashSet<i64>,
    calendar_dates: &HashSet<NaiveDate>,
    config: &WarehouseConfig,
) -> (Vec<SalesLine>, SalesReport) {
    let mut lines = Vec::new();

    for record in records {
        let stock_code = match record.stock_code.as_deref() {
            Some(code) if config.is_valid_stock_code(Some(code)) => code,
            _ => continue,
        };
        let (qty, unit_price) = match (record.qty, record.unit_price_gbp) {
            (Some(qty), Some(price)) => (qty, price),
            _ => continue,
        };

        let customer = CustomerKey::from_staging(record.customer_id);
        let date = record.invoice_date();

        // Dimension joins; a miss silently drops the row
        if !product_codes.contains(stock_code)
            || !customer_ids.contains(&customer.storage_id())
            || !calendar_dates.contains(&date)
        {
            continue;
        }

        lines.push(SalesLine {
            invoice_no: record.invoice_no.clone(),
            stock_code: stock_code.to_string(),
            customer,
            date,
            qty,
            unit_price_gbp: unit_price,
            gross_amount_gbp: qty as f64 * unit_price,
        });
    }

    lines.sort_by(|a, b| {
        (&a.date, &a.invoice_no, &a.stock_code).cmp(&(&b.date, &b.invoice_no, &b.stock_code))
    });

    let invoices: BTreeSet<&str> = lines.iter().map(|l| l.invoice_no.as_str()).collect();
    let customers: BTreeSet<i64> = lines.iter().map(|l| l.customer.storage_id()).collect();
    let products: BTreeSet<&str> = lines.iter().map(|l| l.stock_code.as_str()).collect();
    let cancellations = lines.iter().filter(|l| l.qty < 0).count() as u64;
    let net_revenue_gbp: f64 = lines.iter().map(|l| l.gross_amount_gbp).sum();

    let report = SalesReport {
        lines: lines.len() as u64,
        invoices: invoices.len() as u64,
        customers: customers.len() as u64,
        products: products.len() as u64,
        cancellations,
        min_date: lines.first().map(|l| l.date),
        max_date: lines.last().map(|l| l.date),
        net_revenue_gbp,
    };

    info!(
        "Built fct_sales with {} line items ({} cancellations, net £{:.2})",
        report.lines, report.cancellations, report.net_revenue_gbp
    );

    (lines, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(invoice: &str, stock: Option<&str>, qty: Option<i64>, price: Option<f64>) -> RetailRecord {
        RetailRecord {
            invoice_no: invoice.to_string(),
            stock_code: stock.map(String::from),
            description: None,
            qty,
            invoice_ts: ts("2010-12-01 08:26:00"),
            unit_price_gbp: price,
            customer_id: Some(17850),
            country: Some("United Kingdom".to_string()),
        }
    }

    fn dims() -> (HashSet<String>, HashSet<i64>, HashSet<NaiveDate>) {
        let products = ["A1".to_string()].into_iter().collect();
        let customers = [17850, -1].into_iter().collect();
        let dates = [d("2010-12-01")].into_iter().collect();
        (products, customers, dates)
    }

    #[test]
    fn test_gross_amount() {
        let cfg = WarehouseConfig::default();
        let (products, customers, dates) = dims();
        let records = vec![record("536365", Some("A1"), Some(6), Some(2.55))];

        let (lines, report) = build_sales_fact(&records, &products, &customers, &dates, &cfg);
        assert_eq!(lines.len(), 1);
        assert!((lines[0].gross_amount_gbp - 15.30).abs() < 1e-9);
        assert_eq!(report.invoices, 1);
        assert_eq!(report.min_date, Some(d("2010-12-01")));
    }

    #[test]
    fn test_null_price_or_qty_excluded() {
        let cfg = WarehouseConfig::default();
        let (products, customers, dates) = dims();
        let records = vec![
            record("536365", Some("A1"), Some(6), Some(2.55)),
            record("536366", Some("A1"), None, Some(2.55)),
            record("536367", Some("A1"), Some(6), None),
        ];

        let (lines, _) = build_sales_fact(&records, &products, &customers, &dates, &cfg);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_failed_join_silently_drops() {
        let cfg = WarehouseConfig::default();
        let (products, customers, dates) = dims();
        let records = vec![
            record("536365", Some("A1"), Some(6), Some(2.55)),
            record("536366", Some("B2"), Some(6), Some(2.55)), // not in dim_product
        ];

        let (lines, report) = build_sales_fact(&records, &products, &customers, &dates, &cfg);
        assert_eq!(lines.len(), 1);
        assert_eq!(report.lines, 1);
    }

    #[test]
    fn test_cancellations_retained() {
        let cfg = WarehouseConfig::default();
        let (products, customers, dates) = dims();
        let records = vec![record("C536365", Some("A1"), Some(-6), Some(2.55))];

        let (lines, report) = build_sales_fact(&records, &products, &customers, &dates, &cfg);
        assert_eq!(lines.len(), 1);
        assert_eq!(report.cancellations, 1);
        assert!((lines[0].gross_amount_gbp + 15.30).abs() < 1e-9);
    }

    #[test]
    fn test_null_customer_joins_through_sentinel() {
        let cfg = WarehouseConfig::default();
        let (products, customers, dates) = dims();
        let mut r = record("536365", Some("A1"), Some(6), Some(2.55));
        r.customer_id = None;

        let (lines, _) = build_sales_fact(&[r], &products, &customers, &dates, &cfg);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].customer, CustomerKey::Unknown);
    }

    #[test]
    fn test_fact_date_bounds_skip_ineligible_rows() {
        let cfg = WarehouseConfig::default();
        let mut early = record("1", Some("nan"), Some(1), Some(1.0));
        early.invoice_ts = ts("2010-01-01 00:00:00");
        let records = vec![early, record("2", Some("A1"), Some(1), Some(1.0))];

        let bounds = fact_date_bounds(&records, &cfg).unwrap();
        assert_eq!(bounds, (d("2010-12-01"), d("2010-12-01")));
    }

    #[test]
    fn test_fact_date_bounds_empty() {
        let cfg = WarehouseConfig::default();
        assert!(fact_date_bounds(&[], &cfg).is_none());
    }
}
