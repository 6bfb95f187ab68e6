//! Pipeline configuration.

use serde::Serialize;

/// Knobs for the warehouse build. `Default` matches the conventions of the
/// online-retail export this pipeline was written for.
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseConfig {
    /// Invoice numbers starting with this prefix are cancellations
    pub cancellation_prefix: String,
    /// Country persisted for the unknown-customer sentinel
    pub unknown_country: String,
    /// Textual placeholder that marks a missing stock code in staging
    /// (spreadsheet exports leave the string "nan" behind)
    pub missing_stock_placeholder: String,
    /// Reference GBP-per-EUR ratio for the coarse cross-currency sanity
    /// check. Deliberately fixed rather than tracking the daily series;
    /// see `quality::validate`.
    pub reference_gbp_per_eur: f64,
    /// Relative tolerance for the cross-currency check
    pub revenue_tolerance: f64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            cancellation_prefix: "C".to_string(),
            unknown_country: "UNKNOWN".to_string(),
            missing_stock_placeholder: "nan".to_string(),
            reference_gbp_per_eur: 0.8654,
            revenue_tolerance: 0.1,
        }
    }
}

impl WarehouseConfig {
    /// Whether an invoice number follows the cancellation convention
    pub fn is_cancellation(&self, invoice_no: &str) -> bool {
        invoice_no.starts_with(&self.cancellation_prefix)
    }

    /// Whether a staged stock code identifies a real product
    pub fn is_valid_stock_code(&self, stock_code: Option<&str>) -> bool {
        match stock_code {
            Some(code) => !code.is_empty() && code != self.missing_stock_placeholder,
            None => false,
        }
    }
}
