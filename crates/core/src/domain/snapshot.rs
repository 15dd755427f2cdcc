use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::checked_sum;

/// Cost side of one margin's price. Profit, total cost, chart series and
/// breakeven all read from this one structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub supplier_cost: Decimal,
    pub freight: Decimal,
    pub acquisition: Decimal,
    pub admin: Decimal,
    pub other: Decimal,
}

impl CostBreakdown {
    /// Everything except acquisition spend. `None` once the sum leaves the
    /// decimal range, as for the other groupings.
    pub fn base_costs(&self) -> Option<Decimal> {
        checked_sum([self.supplier_cost, self.freight, self.admin, self.other])
    }

    pub fn non_supplier_total(&self) -> Option<Decimal> {
        checked_sum([self.freight, self.acquisition, self.admin, self.other])
    }

    pub fn total(&self) -> Option<Decimal> {
        self.base_costs()?.checked_add(self.acquisition)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginResult {
    pub percentage: Decimal,
    pub selling_price: Decimal,
    pub landing_price: Decimal,
    pub profit: Decimal,
    pub breakdown: CostBreakdown,
    pub cpa_floor_applied: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionMetrics {
    pub proportional_cpa: Option<Decimal>,
    pub effective_cpa: Decimal,
    pub roas: Option<Decimal>,
    pub break_even_roas: Option<Decimal>,
    pub max_cpa: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationTrace {
    pub currency_code: String,
    pub steps: Vec<TraceStep>,
}

impl CalculationTrace {
    pub fn new(currency_code: &str) -> Self {
        Self { currency_code: currency_code.to_string(), steps: Vec::new() }
    }

    pub fn record(&mut self, stage: impl Into<String>, detail: impl Into<String>, amount: Decimal) {
        self.steps.push(TraceStep { stage: stage.into(), detail: detail.into(), amount });
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationSnapshot {
    pub currency_code: String,
    pub total_freight: Decimal,
    pub profit_margins: Vec<MarginResult>,
    pub total_cost: Decimal,
    pub chart_series: Vec<ChartSlice>,
    pub real_cpa: Decimal,
    pub breakeven: Decimal,
    pub metrics: Option<AcquisitionMetrics>,
    pub trace: CalculationTrace,
}

impl CalculationSnapshot {
    pub fn empty(currency_code: &str) -> Self {
        Self {
            currency_code: currency_code.to_string(),
            total_freight: Decimal::ZERO,
            profit_margins: Vec::new(),
            total_cost: Decimal::ZERO,
            chart_series: Vec::new(),
            real_cpa: Decimal::ZERO,
            breakeven: Decimal::ZERO,
            metrics: None,
            trace: CalculationTrace::new(currency_code),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.profit_margins.is_empty()
    }

    pub fn margin(&self, percentage: Decimal) -> Option<&MarginResult> {
        self.profit_margins.iter().find(|result| result.percentage == percentage)
    }
}
