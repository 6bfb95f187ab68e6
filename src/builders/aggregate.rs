//! Country-day rollup of the converted sales fact.

use chrono::NaiveDate;
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::WarehouseConfig;
use crate::model::{CalendarDay, ConvertedSalesLine, CountryDayRow, Customer};
use crate::report::AggregateReport;

#[derive(Default)]
struct Accumulator {
    order_invoices: BTreeSet<String>,
    items: i64,
    net_qty: i64,
    net_revenue_gbp: f64,
    net_revenue_eur: f64,
}

/// Regroup the converted fact (each row already joined 1:1 to its base
/// counterpart) to date×country grain. Orders count distinct non-cancelled
/// invoices; items and the net sums include cancellations, so returns
/// subtract. Only pairs with at least one fact row appear; zero-activity
/// days are absent, not zero-filled.
pub fn aggregate_country_day(
    converted: &[ConvertedSalesLine],
    customers: &[Customer],
    calendar: &[CalendarDay],
    config: &WarehouseConfig,
) -> (Vec<CountryDayRow>, AggregateReport) {
    let country_by_customer: HashMap<i64, &str> = customers
        .iter()
        .map(|c| (c.key.storage_id(), c.country.as_str()))
        .collect();
    let calendar_by_date: HashMap<NaiveDate, &CalendarDay> =
        calendar.iter().map(|d| (d.date, d)).collect();

    let mut groups: BTreeMap<(NaiveDate, String), Accumulator> = BTreeMap::new();

    for line in converted {
        // The fact joins guarantee both lookups; a miss would mean a stage
        // wrote rows it does not own
        let country = match country_by_customer.get(&line.customer.storage_id()) {
            Some(country) => country.to_string(),
            None => continue,
        };

        let acc = groups.entry((line.date, country)).or_default();
        if !config.is_cancellation(&line.invoice_no) {
            acc.order_invoices.insert(line.invoice_no.clone());
        }
        acc.items += 1;
        acc.net_qty += line.qty;
        acc.net_revenue_gbp += line.gross_amount_gbp;
        acc.net_revenue_eur += line.gross_amount_eur;
    }

    let rows: Vec<CountryDayRow> = groups
        .into_iter()
        .filter_map(|((date, country), acc)| {
            let day = calendar_by_date.get(&date)?;
            Some(CountryDayRow {
                date,
                country,
                orders: acc.order_invoices.len() as i64,
                items: acc.items,
                net_qty: acc.net_qty,
                net_revenue_gbp: acc.net_revenue_gbp,
                net_revenue_eur: acc.net_revenue_eur,
                is_weekend: day.is_weekend,
                is_uk_holiday: day.is_uk_holiday,
                iso_week: day.iso_week,
                iso_year: day.iso_year,
                month: day.month,
                year: day.year,
            })
        })
        .collect();

    let countries: BTreeSet<&str> = rows.iter().map(|r| r.country.as_str()).collect();
    let dates: BTreeSet<NaiveDate> = rows.iter().map(|r| r.date).collect();

    let report = AggregateReport {
        rows: rows.len() as u64,
        countries: countries.len() as u64,
        dates: dates.len() as u64,
    };

    info!(
        "Built agg_country_day with {} country-day rows ({} countries, {} dates)",
        report.rows, report.countries, report.dates
    );

    (rows, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::calendar::build_calendar;
    use crate::model::CustomerKey;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn line(invoice: &str, date: &str, customer: CustomerKey, qty: i64, price: f64) -> ConvertedSalesLine {
        let gross = qty as f64 * price;
        ConvertedSalesLine {
            invoice_no: invoice.to_string(),
            stock_code: "A1".to_string(),
            customer,
            date: d(date),
            qty,
            unit_price_gbp: price,
            unit_price_eur: price / 0.85,
            gross_amount_gbp: gross,
            gross_amount_eur: gross / 0.85,
            fx_rate_used: 0.85,
        }
    }

    fn fixtures() -> (Vec<Customer>, Vec<CalendarDay>) {
        let customers = vec![
            Customer {
                key: CustomerKey::Known(17850),
                country: "United Kingdom".to_string(),
            },
            Customer {
                key: CustomerKey::Unknown,
                country: "UNKNOWN".to_string(),
            },
        ];
        let (calendar, _) =
            build_calendar(d("2010-12-01"), d("2010-12-31"), &BTreeSet::new());
        (customers, calendar)
    }

    #[test]
    fn test_single_invoice_rollup() {
        let cfg = WarehouseConfig::default();
        let (customers, calendar) = fixtures();
        let converted = vec![line("536365", "2010-12-01", CustomerKey::Known(17850), 6, 2.55)];

        let (rows, report) = aggregate_country_day(&converted, &customers, &calendar, &cfg);
        assert_eq!(report.rows, 1);

        let row = &rows[0];
        assert_eq!(row.country, "United Kingdom");
        assert_eq!(row.orders, 1);
        assert_eq!(row.items, 1);
        assert_eq!(row.net_qty, 6);
        assert!((row.net_revenue_gbp - 15.30).abs() < 1e-9);
        assert!((row.net_revenue_eur - 18.00).abs() < 1e-9);
        assert!(!row.is_weekend); // 2010-12-01 was a Wednesday
    }

    #[test]
    fn test_cancellation_excluded_from_orders_only() {
        let cfg = WarehouseConfig::default();
        let (customers, calendar) = fixtures();
        let converted = vec![
            line("536365", "2010-12-01", CustomerKey::Known(17850), 6, 2.55),
            line("C536365", "2010-12-01", CustomerKey::Known(17850), -6, 2.55),
        ];

        let (rows, _) = aggregate_country_day(&converted, &customers, &calendar, &cfg);
        let row = &rows[0];
        assert_eq!(row.orders, 1); // cancellation not counted as an order
        assert_eq!(row.items, 2); // but still a line item
        assert_eq!(row.net_qty, 0); // and its qty subtracts
        assert!(row.net_revenue_gbp.abs() < 1e-9);
    }

    #[test]
    fn test_distinct_invoice_count() {
        let cfg = WarehouseConfig::default();
        let (customers, calendar) = fixtures();
        let converted = vec![
            line("536365", "2010-12-01", CustomerKey::Known(17850), 1, 1.0),
            line("536365", "2010-12-01", CustomerKey::Known(17850), 2, 1.0),
            line("536370", "2010-12-01", CustomerKey::Known(17850), 3, 1.0),
        ];

        let (rows, _) = aggregate_country_day(&converted, &customers, &calendar, &cfg);
        assert_eq!(rows[0].orders, 2);
        assert_eq!(rows[0].items, 3);
    }

    #[test]
    fn test_grouping_by_date_and_country() {
        let cfg = WarehouseConfig::default();
        let (customers, calendar) = fixtures();
        let converted = vec![
            line("536365", "2010-12-01", CustomerKey::Known(17850), 1, 1.0),
            line("536366", "2010-12-01", CustomerKey::Unknown, 1, 1.0),
            line("536367", "2010-12-02", CustomerKey::Known(17850), 1, 1.0),
        ];

        let (rows, report) = aggregate_country_day(&converted, &customers, &calendar, &cfg);
        assert_eq!(report.rows, 3);
        assert_eq!(report.countries, 2);
        assert_eq!(report.dates, 2);
        // No zero-filled pairs beyond the three observed
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_revenue_reconciles_with_fact() {
        let cfg = WarehouseConfig::default();
        let (customers, calendar) = fixtures();
        let converted = vec![
            line("536365", "2010-12-01", CustomerKey::Known(17850), 6, 2.55),
            line("C536399", "2010-12-02", CustomerKey::Unknown, -2, 1.25),
            line("536400", "2010-12-02", CustomerKey::Unknown, 10, 0.42),
        ];

        let fact_total: f64 = converted.iter().map(|l| l.gross_amount_gbp).sum();
        let (rows, _) = aggregate_country_day(&converted, &customers, &calendar, &cfg);
        let agg_total: f64 = rows.iter().map(|r| r.net_revenue_gbp).sum();
        assert!((fact_total - agg_total).abs() < 1e-9);
    }
}
