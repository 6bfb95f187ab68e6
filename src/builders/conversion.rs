//! EUR view of the sales fact.

use log::info;
use std::collections::HashMap;

use crate::model::{ConvertedSalesLine, DailyRate, SalesLine};
use crate::report::ConversionReport;

/// Inner-join the fact to the aligned daily rates by date. Sales dates the
/// series does not cover drop out here, consistent with the aligner's
/// warning-only coverage policy. Unit price and gross amount are each
/// divided by the rate independently so neither inherits the other's
/// rounding.
pub fn convert_sales(
    sales: &[SalesLine],
    rates: &[DailyRate],
) -> (Vec<ConvertedSalesLine>, ConversionReport) {
    let rate_by_date: HashMap<_, _> = rates.iter().map(|r| (r.date, r.gbp_per_eur)).collect();

    let lines: Vec<ConvertedSalesLine> = sales
        .iter()
        .filter_map(|line| {
            let rate = *rate_by_date.get(&line.date)?;
            Some(ConvertedSalesLine {
                invoice_no: line.invoice_no.clone(),
                stock_code: line.stock_code.clone(),
                customer: line.customer,
                date: line.date,
                qty: line.qty,
                unit_price_gbp: line.unit_price_gbp,
                unit_price_eur: line.unit_price_gbp / rate,
                gross_amount_gbp: line.gross_amount_gbp,
                gross_amount_eur: line.gross_amount_gbp / rate,
                fx_rate_used: rate,
            })
        })
        .collect();

    let report = ConversionReport {
        lines: lines.len() as u64,
        net_revenue_gbp: lines.iter().map(|l| l.gross_amount_gbp).sum(),
        net_revenue_eur: lines.iter().map(|l| l.gross_amount_eur).sum(),
    };

    info!(
        "Built fct_sales_eur with {} line items (net £{:.2} = €{:.2})",
        report.lines, report.net_revenue_gbp, report.net_revenue_eur
    );

    (lines, report)
}
