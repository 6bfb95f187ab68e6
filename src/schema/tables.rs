//! Relation catalog for the retail warehouse.
//!
//! Three staging tables are loaded by external ingestion collaborators;
//! seven warehouse tables are rebuilt from them on every pipeline run.

use super::types::{Column, ColumnType, ForeignKey, Index, TableSchema};

// =============================================================================
// Staging tables (inputs)
// =============================================================================

pub static RAW_RETAIL_DATA: TableSchema = TableSchema {
    name: "raw_retail_data",
    columns: &[
        Column::required("invoice_no", ColumnType::Text),
        Column::new("stock_code", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::new("qty", ColumnType::Integer),
        Column::required("invoice_ts", ColumnType::Timestamp),
        Column::new("unit_price_gbp", ColumnType::Real),
        Column::new("customer_id", ColumnType::Integer),
        Column::new("country", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[Index::on(&["invoice_no"])],
};

pub static RAW_FX_RATES: TableSchema = TableSchema {
    name: "raw_fx_rates",
    columns: &[
        Column::required("date", ColumnType::Date),
        Column::new("gbp_per_eur", ColumnType::Real),
    ],
    primary_key: &["date"],
    foreign_keys: &[],
    indexes: &[],
};

pub static RAW_UK_HOLIDAYS: TableSchema = TableSchema {
    name: "raw_uk_holidays",
    columns: &[Column::required("holiday_date", ColumnType::Date)],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

// =============================================================================
// Dimension tables
// =============================================================================

pub static DIM_CALENDAR: TableSchema = TableSchema {
    name: "dim_calendar",
    columns: &[
        Column::required("date", ColumnType::Date),
        Column::required("is_weekend", ColumnType::Boolean),
        Column::required("is_uk_holiday", ColumnType::Boolean),
        Column::required("iso_year", ColumnType::Integer),
        Column::required("iso_week", ColumnType::Integer),
        Column::required("month", ColumnType::Integer),
        Column::required("year", ColumnType::Integer),
        Column::required("day_of_week", ColumnType::Integer),
        Column::required("day_name", ColumnType::Text),
        Column::required("month_name", ColumnType::Text),
    ],
    primary_key: &["date"],
    foreign_keys: &[],
    indexes: &[],
};

pub static DIM_PRODUCT: TableSchema = TableSchema {
    name: "dim_product",
    columns: &[
        Column::required("stock_code", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::required("first_seen", ColumnType::Date),
        Column::required("last_seen", ColumnType::Date),
    ],
    primary_key: &["stock_code"],
    foreign_keys: &[],
    indexes: &[],
};

pub static DIM_CUSTOMER: TableSchema = TableSchema {
    name: "dim_customer",
    columns: &[
        Column::required("customer_id", ColumnType::Integer),
        Column::required("country", ColumnType::Text),
    ],
    primary_key: &["customer_id"],
    foreign_keys: &[],
    indexes: &[Index::on(&["country"])],
};

// =============================================================================
// Fact and aggregate tables
// =============================================================================

pub static FCT_SALES: TableSchema = TableSchema {
    name: "fct_sales",
    columns: &[
        Column::required("invoice_no", ColumnType::Text),
        Column::required("stock_code", ColumnType::Text),
        Column::required("customer_id", ColumnType::Integer),
        Column::required("date", ColumnType::Date),
        Column::required("qty", ColumnType::Integer),
        Column::required("unit_price_gbp", ColumnType::Real),
        Column::required("gross_amount_gbp", ColumnType::Real),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("stock_code", "dim_product", "stock_code"),
        ForeignKey::new("customer_id", "dim_customer", "customer_id"),
        ForeignKey::new("date", "dim_calendar", "date"),
    ],
    indexes: &[Index::on(&["invoice_no"])],
};

pub static DAILY_FX_RATES: TableSchema = TableSchema {
    name: "daily_fx_rates",
    columns: &[
        Column::required("date", ColumnType::Date),
        Column::required("gbp_per_eur", ColumnType::Real),
    ],
    primary_key: &["date"],
    foreign_keys: &[],
    indexes: &[],
};

pub static FCT_SALES_EUR: TableSchema = TableSchema {
    name: "fct_sales_eur",
    columns: &[
        Column::required("invoice_no", ColumnType::Text),
        Column::required("stock_code", ColumnType::Text),
        Column::required("customer_id", ColumnType::Integer),
        Column::required("date", ColumnType::Date),
        Column::required("qty", ColumnType::Integer),
        Column::required("unit_price_gbp", ColumnType::Real),
        Column::required("unit_price_eur", ColumnType::Real),
        Column::required("gross_amount_gbp", ColumnType::Real),
        Column::required("gross_amount_eur", ColumnType::Real),
        Column::required("fx_rate_used", ColumnType::Real),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("stock_code", "dim_product", "stock_code"),
        ForeignKey::new("customer_id", "dim_customer", "customer_id"),
        ForeignKey::new("date", "daily_fx_rates", "date"),
    ],
    indexes: &[Index::on(&["invoice_no"])],
};

pub static AGG_COUNTRY_DAY: TableSchema = TableSchema {
    name: "agg_country_day",
    columns: &[
        Column::required("date", ColumnType::Date),
        Column::required("country", ColumnType::Text),
        Column::required("orders", ColumnType::Integer),
        Column::required("items", ColumnType::Integer),
        Column::required("net_qty", ColumnType::Integer),
        Column::required("net_revenue_gbp", ColumnType::Real),
        Column::required("net_revenue_eur", ColumnType::Real),
        Column::required("is_weekend", ColumnType::Boolean),
        Column::required("is_uk_holiday", ColumnType::Boolean),
        Column::required("iso_week", ColumnType::Integer),
        Column::required("iso_year", ColumnType::Integer),
        Column::required("month", ColumnType::Integer),
        Column::required("year", ColumnType::Integer),
    ],
    primary_key: &["date", "country"],
    foreign_keys: &[],
    indexes: &[Index::on(&["country"])],
};

// =============================================================================
// Catalog
// =============================================================================

/// Staging relations loaded by ingestion collaborators
pub static STAGING_TABLES: &[&TableSchema] =
    &[&RAW_RETAIL_DATA, &RAW_FX_RATES, &RAW_UK_HOLIDAYS];

/// Warehouse relations in build order (each depends only on earlier ones)
pub static WAREHOUSE_TABLES: &[&TableSchema] = &[
    &DIM_CALENDAR,
    &DIM_PRODUCT,
    &DIM_CUSTOMER,
    &FCT_SALES,
    &DAILY_FX_RATES,
    &FCT_SALES_EUR,
    &AGG_COUNTRY_DAY,
];

/// All warehouse table names in build order
pub fn table_names() -> Vec<&'static str> {
    WAREHOUSE_TABLES.iter().map(|t| t.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_order_satisfies_dependencies() {
        let names = table_names();
        for table in WAREHOUSE_TABLES {
            let pos = names.iter().position(|n| *n == table.name).unwrap();
            for fk in table.foreign_keys {
                let parent_pos = names
                    .iter()
                    .position(|n| *n == fk.references_table)
                    .unwrap();
                assert!(
                    parent_pos < pos,
                    "{} must be built before {}",
                    fk.references_table,
                    table.name
                );
            }
        }
    }
}
