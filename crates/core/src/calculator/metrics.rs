use rust_decimal::Decimal;

use crate::calculator::solver::MarginSolution;
use crate::domain::snapshot::{AcquisitionMetrics, CostBreakdown};

/// Selling price left after every cost except the supplier's; the highest
/// supplier cost at which this price still breaks even.
pub fn breakeven(selling_price: Decimal, breakdown: &CostBreakdown) -> Option<Decimal> {
    selling_price.checked_sub(breakdown.non_supplier_total()?)
}

pub fn acquisition_metrics(
    solution: &MarginSolution,
    breakdown: &CostBreakdown,
) -> Option<AcquisitionMetrics> {
    let selling_price = solution.selling_price;
    let max_cpa = selling_price.checked_sub(breakdown.base_costs()?)?;

    Some(AcquisitionMetrics {
        proportional_cpa: solution.proportional_cpa,
        effective_cpa: solution.effective_cpa,
        roas: ratio(selling_price, solution.effective_cpa),
        break_even_roas: ratio(selling_price, max_cpa),
        max_cpa,
    })
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator <= Decimal::ZERO {
        return None;
    }
    numerator.checked_div(denominator)
}
