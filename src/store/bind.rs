//! `TableRow` implementations: the only place where in-memory rows meet
//! SQL parameters, and where the customer sentinel becomes its magic id.

use rusqlite::Statement;

use super::sqlite::TableRow;
use crate::model::{
    CalendarDay, ConvertedSalesLine, CountryDayRow, Customer, DailyRate, FxObservation,
    HolidayDate, Product, RetailRecord, SalesLine,
};
use crate::schema::tables::{
    AGG_COUNTRY_DAY, DAILY_FX_RATES, DIM_CALENDAR, DIM_CUSTOMER, DIM_PRODUCT, FCT_SALES,
    FCT_SALES_EUR, RAW_FX_RATES, RAW_RETAIL_DATA, RAW_UK_HOLIDAYS,
};
use crate::schema::TableSchema;

impl TableRow for RetailRecord {
    const SCHEMA: &'static TableSchema = &RAW_RETAIL_DATA;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.invoice_no.as_str())?;
        stmt.raw_bind_parameter(2, self.stock_code.as_deref())?;
        stmt.raw_bind_parameter(3, self.description.as_deref())?;
        stmt.raw_bind_parameter(4, self.qty)?;
        stmt.raw_bind_parameter(5, self.invoice_ts)?;
        stmt.raw_bind_parameter(6, self.unit_price_gbp)?;
        stmt.raw_bind_parameter(7, self.customer_id)?;
        stmt.raw_bind_parameter(8, self.country.as_deref())?;
        Ok(())
    }
}

impl TableRow for FxObservation {
    const SCHEMA: &'static TableSchema = &RAW_FX_RATES;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.date)?;
        stmt.raw_bind_parameter(2, self.gbp_per_eur)?;
        Ok(())
    }
}

impl TableRow for HolidayDate {
    const SCHEMA: &'static TableSchema = &RAW_UK_HOLIDAYS;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.0)?;
        Ok(())
    }
}

impl TableRow for CalendarDay {
    const SCHEMA: &'static TableSchema = &DIM_CALENDAR;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.date)?;
        stmt.raw_bind_parameter(2, self.is_weekend)?;
        stmt.raw_bind_parameter(3, self.is_uk_holiday)?;
        stmt.raw_bind_parameter(4, self.iso_year)?;
        stmt.raw_bind_parameter(5, self.iso_week)?;
        stmt.raw_bind_parameter(6, self.month)?;
        stmt.raw_bind_parameter(7, self.year)?;
        stmt.raw_bind_parameter(8, self.day_of_week)?;
        stmt.raw_bind_parameter(9, self.day_name.as_str())?;
        stmt.raw_bind_parameter(10, self.month_name.as_str())?;
        Ok(())
    }
}

impl TableRow for Product {
    const SCHEMA: &'static TableSchema = &DIM_PRODUCT;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.stock_code.as_str())?;
        stmt.raw_bind_parameter(2, self.description.as_deref())?;
        stmt.raw_bind_parameter(3, self.first_seen)?;
        stmt.raw_bind_parameter(4, self.last_seen)?;
        Ok(())
    }
}

impl TableRow for Customer {
    const SCHEMA: &'static TableSchema = &DIM_CUSTOMER;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.key.storage_id())?;
        stmt.raw_bind_parameter(2, self.country.as_str())?;
        Ok(())
    }
}

impl TableRow for SalesLine {
    const SCHEMA: &'static TableSchema = &FCT_SALES;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.invoice_no.as_str())?;
        stmt.raw_bind_parameter(2, self.stock_code.as_str())?;
        stmt.raw_bind_parameter(3, self.customer.storage_id())?;
        stmt.raw_bind_parameter(4, self.date)?;
        stmt.raw_bind_parameter(5, self.qty)?;
        stmt.raw_bind_parameter(6, self.unit_price_gbp)?;
        stmt.raw_bind_parameter(7, self.gross_amount_gbp)?;
        Ok(())
    }
}

impl TableRow for DailyRate {
    const SCHEMA: &'static TableSchema = &DAILY_FX_RATES;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.date)?;
        stmt.raw_bind_parameter(2, self.gbp_per_eur)?;
        Ok(())
    }
}

impl TableRow for ConvertedSalesLine {
    const SCHEMA: &'static TableSchema = &FCT_SALES_EUR;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.invoice_no.as_str())?;
        stmt.raw_bind_parameter(2, self.stock_code.as_str())?;
        stmt.raw_bind_parameter(3, self.customer.storage_id())?;
        stmt.raw_bind_parameter(4, self.date)?;
        stmt.raw_bind_parameter(5, self.qty)?;
        stmt.raw_bind_parameter(6, self.unit_price_gbp)?;
        stmt.raw_bind_parameter(7, self.unit_price_eur)?;
        stmt.raw_bind_parameter(8, self.gross_amount_gbp)?;
        stmt.raw_bind_parameter(9, self.gross_amount_eur)?;
        stmt.raw_bind_parameter(10, self.fx_rate_used)?;
        Ok(())
    }
}

impl TableRow for CountryDayRow {
    const SCHEMA: &'static TableSchema = &AGG_COUNTRY_DAY;

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        stmt.raw_bind_parameter(1, self.date)?;
        stmt.raw_bind_parameter(2, self.country.as_str())?;
        stmt.raw_bind_parameter(3, self.orders)?;
        stmt.raw_bind_parameter(4, self.items)?;
        stmt.raw_bind_parameter(5, self.net_qty)?;
        stmt.raw_bind_parameter(6, self.net_revenue_gbp)?;
        stmt.raw_bind_parameter(7, self.net_revenue_eur)?;
        stmt.raw_bind_parameter(8, self.is_weekend)?;
        stmt.raw_bind_parameter(9, self.is_uk_holiday)?;
        stmt.raw_bind_parameter(10, self.iso_week)?;
        stmt.raw_bind_parameter(11, self.iso_year)?;
        stmt.raw_bind_parameter(12, self.month)?;
        stmt.raw_bind_parameter(13, self.year)?;
        Ok(())
    }
}
