//! Product and customer dimensions derived from staged transactions.

use log::info;
use std::collections::{BTreeMap, HashMap};

use crate::config::WarehouseConfig;
use crate::model::{Customer, CustomerKey, Product, RetailRecord};
use crate::report::{CustomerReport, ProductReport};

/// Group staged transactions by stock code. Description is the most
/// frequent observed value per code; first/last seen track the product's
/// observation window. Null, empty, and placeholder stock codes are
/// dropped entirely.
pub fn build_products(
    records: &[RetailRecord],
    config: &WarehouseConfig,
) -> (Vec<Product>, ProductReport) {
    struct Group {
        descriptions: HashMap<String, usize>,
        first_seen: chrono::NaiveDate,
        last_seen: chrono::NaiveDate,
    }

    let mut groups: BTreeMap<&str, Group> = BTreeMap::new();

    for record in records {
        let code = match record.stock_code.as_deref() {
            Some(code) if config.is_valid_stock_code(Some(code)) => code,
            _ => continue,
        };

        let date = record.invoice_date();
        let group = groups.entry(code).or_insert_with(|| Group {
            descriptions: HashMap::new(),
            first_seen: date,
            last_seen: date,
        });

        group.first_seen = group.first_seen.min(date);
        group.last_seen = group.last_seen.max(date);
        if let Some(desc) = record.description.as_deref() {
            *group.descriptions.entry(desc.to_string()).or_insert(0) += 1;
        }
    }

    let products: Vec<Product> = groups
        .into_iter()
        .map(|(code, group)| Product {
            stock_code: code.to_string(),
            description: most_frequent(&group.descriptions),
            first_seen: group.first_seen,
            last_seen: group.last_seen,
        })
        .collect();

    info!("Built dim_product with {} unique products", products.len());
    let report = ProductReport {
        products: products.len() as u64,
    };

    (products, report)
}

/// Group staged transactions by customer, null ids coalescing onto the
/// unknown sentinel. Country is the most frequent observed value for known
/// customers and the fixed sentinel literal for the unknown one.
pub fn build_customers(
    records: &[RetailRecord],
    config: &WarehouseConfig,
) -> (Vec<Customer>, CustomerReport) {
    let mut groups: BTreeMap<CustomerKey, HashMap<String, usize>> = BTreeMap::new();

    for record in records {
        let key = CustomerKey::from_staging(record.customer_id);
        let countries = groups.entry(key).or_default();
        if let Some(country) = record.country.as_deref() {
            *countries.entry(country.to_string()).or_insert(0) += 1;
        }
    }

    let customers: Vec<Customer> = groups
        .into_iter()
        .map(|(key, countries)| Customer {
            key,
            country: if key.is_unknown() {
                config.unknown_country.clone()
            } else {
                most_frequent(&countries).unwrap_or_else(|| config.unknown_country.clone())
            },
        })
        .collect();

    let has_unknown = customers.iter().any(|c| c.key.is_unknown());
    let known = customers.iter().filter(|c| !c.key.is_unknown()).count() as u64;
    info!(
        "Built dim_customer with {} known customers (unknown sentinel: {})",
        known, has_unknown
    );

    let report = CustomerReport {
        known_customers: known,
        has_unknown,
    };

    (customers, report)
}

/// Any value achieving the maximum frequency; order among ties is
/// unspecified and callers must not rely on it.
fn most_frequent(counts: &HashMap<String, usize>) -> Option<String> {
    counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(value, _)| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn record(
        stock_code: Option<&str>,
        description: Option<&str>,
        ts_str: &str,
        customer_id: Option<i64>,
        country: Option<&str>,
    ) -> RetailRecord {
        RetailRecord {
            invoice_no: "536365".to_string(),
            stock_code: stock_code.map(String::from),
            description: description.map(String::from),
            qty: Some(6),
            invoice_ts: ts(ts_str),
            unit_price_gbp: Some(2.55),
            customer_id,
            country: country.map(String::from),
        }
    }

    #[test]
    fn test_products_exclude_placeholder_codes() {
        let cfg = WarehouseConfig::default();
        let records = vec![
            record(Some("A1"), Some("MUG"), "2010-12-01 08:26:00", Some(1), None),
            record(Some(""), Some("BLANK"), "2010-12-01 08:26:00", Some(1), None),
            record(Some("nan"), Some("NAN"), "2010-12-01 08:26:00", Some(1), None),
            record(None, Some("NULL"), "2010-12-01 08:26:00", Some(1), None),
        ];

        let (products, report) = build_products(&records, &cfg);
        assert_eq!(report.products, 1);
        assert_eq!(products[0].stock_code, "A1");
    }

    #[test]
    fn test_product_description_most_frequent() {
        let cfg = WarehouseConfig::default();
        let records = vec![
            record(Some("A1"), Some("RED MUG"), "2010-12-01 08:26:00", Some(1), None),
            record(Some("A1"), Some("RED MUG"), "2010-12-03 09:00:00", Some(1), None),
            record(Some("A1"), Some("red mug?"), "2010-12-02 10:00:00", Some(1), None),
            record(Some("A1"), None, "2010-12-04 10:00:00", Some(1), None),
        ];

        let (products, _) = build_products(&records, &cfg);
        assert_eq!(products[0].description.as_deref(), Some("RED MUG"));
        assert_eq!(products[0].first_seen, "2010-12-01".parse().unwrap());
        assert_eq!(products[0].last_seen, "2010-12-04".parse().unwrap());
    }

    #[test]
    fn test_null_customer_maps_to_sentinel() {
        let cfg = WarehouseConfig::default();
        let records = vec![
            record(Some("A1"), None, "2010-12-01 08:26:00", Some(17850), Some("United Kingdom")),
            record(Some("A1"), None, "2010-12-01 09:00:00", None, Some("France")),
        ];

        let (customers, report) = build_customers(&records, &cfg);
        assert_eq!(report.known_customers, 1);
        assert!(report.has_unknown);

        let unknown = customers.iter().find(|c| c.key.is_unknown()).unwrap();
        // Sentinel country ignores whatever the underlying rows say
        assert_eq!(unknown.country, "UNKNOWN");

        let known = customers
            .iter()
            .find(|c| c.key == CustomerKey::Known(17850))
            .unwrap();
        assert_eq!(known.country, "United Kingdom");
    }

    #[test]
    fn test_customer_country_most_frequent() {
        let cfg = WarehouseConfig::default();
        let records = vec![
            record(Some("A1"), None, "2010-12-01 08:26:00", Some(5), Some("Germany")),
            record(Some("A1"), None, "2010-12-02 08:26:00", Some(5), Some("Germany")),
            record(Some("A1"), None, "2010-12-03 08:26:00", Some(5), Some("Austria")),
        ];

        let (customers, _) = build_customers(&records, &cfg);
        assert_eq!(customers[0].country, "Germany");
    }

    #[test]
    fn test_tie_break_returns_some_maximal_value() {
        let mut counts = HashMap::new();
        counts.insert("A".to_string(), 2);
        counts.insert("B".to_string(), 2);
        counts.insert("C".to_string(), 1);

        let winner = most_frequent(&counts).unwrap();
        assert!(winner == "A" || winner == "B");
    }
}
