//! Typed staging access.
//!
//! Ingestion of source files is someone else's job: collaborators (and
//! tests) push already-flattened rows through these loaders, and the
//! pipeline reads them back with its fatal precondition checks applied.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeSet;

use crate::model::{FxObservation, HolidayDate, RetailRecord};
use crate::schema::tables::{RAW_FX_RATES, RAW_RETAIL_DATA, RAW_UK_HOLIDAYS, STAGING_TABLES};
use crate::store::Warehouse;

/// Create (or recreate) the three empty staging tables
pub fn init_staging(store: &Warehouse) -> Result<()> {
    for schema in STAGING_TABLES {
        store.rebuild_table(schema)?;
    }
    Ok(())
}

pub fn load_retail(store: &mut Warehouse, records: &[RetailRecord]) -> Result<u64> {
    let count = store.append_rows(records)?;
    info!("Loaded {} rows into raw_retail_data", count);
    Ok(count)
}

pub fn load_fx(store: &mut Warehouse, observations: &[FxObservation]) -> Result<u64> {
    let count = store.append_rows(observations)?;
    info!("Loaded {} rows into raw_fx_rates", count);
    Ok(count)
}

pub fn load_holidays(store: &mut Warehouse, dates: &[NaiveDate]) -> Result<u64> {
    let rows: Vec<HolidayDate> = dates.iter().copied().map(HolidayDate).collect();
    let count = store.append_rows(&rows)?;
    info!("Loaded {} rows into raw_uk_holidays", count);
    Ok(count)
}

/// Read all staged retail transactions. Fatal if the table is missing,
/// malformed, or empty.
pub fn read_retail(store: &Warehouse) -> Result<Vec<RetailRecord>> {
    store.require_table(&RAW_RETAIL_DATA)?;

    let mut stmt = store.conn().prepare(
        "SELECT invoice_no, stock_code, description, qty, invoice_ts,
                unit_price_gbp, customer_id, country
         FROM raw_retail_data",
    )?;
    let records: Vec<RetailRecord> = stmt
        .query_map([], |row| {
            Ok(RetailRecord {
                invoice_no: row.get(0)?,
                stock_code: row.get(1)?,
                description: row.get(2)?,
                qty: row.get(3)?,
                invoice_ts: row.get(4)?,
                unit_price_gbp: row.get(5)?,
                customer_id: row.get(6)?,
                country: row.get(7)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()
        .context("Failed to read raw_retail_data")?;

    if records.is_empty() {
        bail!("raw_retail_data is empty: staging yielded zero candidate rows");
    }

    info!("Read {} staged retail transactions", records.len());
    Ok(records)
}

/// Read all staged FX observations ordered by date. Fatal if the table is
/// missing or carries zero valid (non-null-rate) observations.
pub fn read_fx(store: &Warehouse) -> Result<Vec<FxObservation>> {
    store.require_table(&RAW_FX_RATES)?;

    let mut stmt = store
        .conn()
        .prepare("SELECT date, gbp_per_eur FROM raw_fx_rates ORDER BY date")?;
    let observations: Vec<FxObservation> = stmt
        .query_map([], |row| {
            Ok(FxObservation {
                date: row.get(0)?,
                gbp_per_eur: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<_>>()
        .context("Failed to read raw_fx_rates")?;

    let valid = observations
        .iter()
        .filter(|o| o.gbp_per_eur.is_some())
        .count();
    if valid == 0 {
        bail!("raw_fx_rates contains zero valid FX observations");
    }

    info!(
        "Read {} staged FX observations ({} with a rate)",
        observations.len(),
        valid
    );
    Ok(observations)
}

/// Read the holiday calendar, deduplicated and sorted. Fatal if the table
/// is missing or no valid dates remain after cleaning.
pub fn read_holidays(store: &Warehouse) -> Result<BTreeSet<NaiveDate>> {
    store.require_table(&RAW_UK_HOLIDAYS)?;

    let mut stmt = store
        .conn()
        .prepare("SELECT holiday_date FROM raw_uk_holidays")?;
    let holidays: BTreeSet<NaiveDate> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()
        .context("Failed to read raw_uk_holidays")?;

    if holidays.is_empty() {
        bail!("raw_uk_holidays contains zero valid holiday dates");
    }

    info!("Read {} distinct holiday dates", holidays.len());
    Ok(holidays)
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

    fn record(invoice: &str) -> RetailRecord {
        RetailRecord {
            invoice_no: invoice.to_string(),
            stock_code: Some("85123A".to_string()),
            description: Some("WHITE HANGING HEART".to_string()),
            qty: Some(6),
            invoice_ts: ts("2010-12-01 08:26:00"),
            unit_price_gbp: Some(2.55),
            customer_id: Some(17850),
            country: Some("United Kingdom".to_string()),
        }
    }

    #[test]
    fn test_retail_round_trip() {
        let mut store = Warehouse::open_in_memory().unwrap();
        init_staging(&store).unwrap();
        load_retail(&mut store, &[record("536365"), record("536366")]).unwrap();

        let records = read_retail(&store).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].invoice_no, "536365");
        assert_eq!(records[0].invoice_date(), d("2010-12-01"));
        assert_eq!(records[0].customer_id, Some(17850));
    }

    #[test]
    fn test_empty_retail_is_fatal() {
        let store = Warehouse::open_in_memory().unwrap();
        init_staging(&store).unwrap();
        let err = read_retail(&store).unwrap_err();
        assert!(err.to_string().contains("zero candidate rows"));
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let store = Warehouse::open_in_memory().unwrap();
        assert!(read_retail(&store).is_err());
        assert!(read_fx(&store).is_err());
        assert!(read_holidays(&store).is_err());
    }

    #[test]
    fn test_fx_requires_one_valid_observation() {
        let mut store = Warehouse::open_in_memory().unwrap();
        init_staging(&store).unwrap();
        load_fx(
            &mut store,
            &[FxObservation {
                date: d("2010-12-01"),
                gbp_per_eur: None,
            }],
        )
        .unwrap();

        let err = read_fx(&store).unwrap_err();
        assert!(err.to_string().contains("zero valid FX observations"));
    }

    #[test]
    fn test_holidays_deduplicated_and_sorted() {
        let mut store = Warehouse::open_in_memory().unwrap();
        init_staging(&store).unwrap();
        load_holidays(
            &mut store,
            &[d("2010-12-28"), d("2010-12-27"), d("2010-12-28")],
        )
        .unwrap();

        let holidays = read_holidays(&store).unwrap();
        let dates: Vec<NaiveDate> = holidays.into_iter().collect();
        assert_eq!(dates, vec![d("2010-12-27"), d("2010-12-28")]);
    }
}
