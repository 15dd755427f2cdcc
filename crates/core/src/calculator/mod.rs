pub mod chart;
pub mod freight;
pub mod margins;
pub mod metrics;
pub mod rounding;
pub mod solver;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::country::CountryProfile;
use crate::domain::line_item::{LineItems, INEFFECTIVITY};
use crate::domain::snapshot::{CalculationSnapshot, CalculationTrace, CostBreakdown, MarginResult};
use crate::errors::DomainError;

use self::solver::{EstimateSource, MarginSolution, SOLVER_EPSILON};

/// An intermediate amount left the range a `Decimal` can hold.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{stage} exceeds the representable amount range")]
pub struct AmountOverflow {
    pub stage: &'static str,
}

impl AmountOverflow {
    pub fn at(stage: &'static str) -> Self {
        Self { stage }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorSettings {
    /// Share of the selling price assumed to go to customer acquisition.
    pub cpa_rate: Decimal,
    /// Reject degenerate inputs instead of degrading silently.
    pub strict: bool,
}

impl CalculatorSettings {
    pub const DEFAULT_CPA_RATE: Decimal = Decimal::from_parts(23, 0, 0, false, 2);
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self { cpa_rate: Self::DEFAULT_CPA_RATE, strict: false }
    }
}

#[derive(Clone, Debug)]
pub struct EvaluationInput<'a> {
    pub supplier_cost: Decimal,
    pub line_items: &'a LineItems,
    pub country: &'a CountryProfile,
    pub requested_margins: &'a [Decimal],
    pub selected_margin: Decimal,
}

pub trait PriceCalculator: Send + Sync {
    fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<CalculationSnapshot, DomainError>;
}

#[derive(Clone, Debug, Default)]
pub struct DeterministicPriceCalculator {
    settings: CalculatorSettings,
}

impl DeterministicPriceCalculator {
    pub fn new(settings: CalculatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }
}

impl PriceCalculator for DeterministicPriceCalculator {
    fn evaluate(&self, input: &EvaluationInput<'_>) -> Result<CalculationSnapshot, DomainError> {
        evaluate(input, &self.settings)
    }
}

/// Recomputes the full snapshot from scratch.
///
/// A non-positive supplier cost always yields the empty snapshot. In lenient
/// mode nothing else errors either: degenerate freight empties the snapshot,
/// unsolvable margins are dropped, a selected margin that was not evaluated
/// leaves the aggregates at zero, and amounts past the `Decimal` range empty
/// the snapshot. Strict mode rejects the last case as invalid input.
pub fn evaluate(
    input: &EvaluationInput<'_>,
    settings: &CalculatorSettings,
) -> Result<CalculationSnapshot, DomainError> {
    let currency_code = input.country.currency_code.as_str();

    if input.supplier_cost <= Decimal::ZERO {
        debug!(
            event_name = "calculator.evaluate.short_circuit",
            country = %input.country.code,
            supplier_cost = %input.supplier_cost,
            "supplier cost is not positive, returning empty snapshot"
        );
        return Ok(CalculationSnapshot::empty(currency_code));
    }

    if settings.strict {
        validate_strict(input, settings)?;
    }

    match price_snapshot(input, settings) {
        Ok(snapshot) => Ok(snapshot),
        Err(overflow) if settings.strict => {
            Err(DomainError::invalid_input("amounts", overflow.to_string()))
        }
        Err(overflow) => {
            warn!(
                event_name = "calculator.amount.overflow",
                country = %input.country.code,
                stage = overflow.stage,
                supplier_cost = %input.supplier_cost,
                "amounts exceed the decimal range, returning empty snapshot"
            );
            Ok(CalculationSnapshot::empty(currency_code))
        }
    }
}

fn price_snapshot(
    input: &EvaluationInput<'_>,
    settings: &CalculatorSettings,
) -> Result<CalculationSnapshot, AmountOverflow> {
    let currency_code = input.country.currency_code.as_str();
    let mut trace = CalculationTrace::new(currency_code);
    let line_items = input.line_items;
    let ineffectivity_pct = line_items.ineffectivity_pct();
    let base_freight = line_items.base_freight();

    let Some(total_freight) = freight::effective_freight(base_freight, ineffectivity_pct)? else {
        warn!(
            event_name = "calculator.freight.degenerate",
            country = %input.country.code,
            ineffectivity_pct = %ineffectivity_pct,
            "ineffectivity leaves no delivered shipments, returning empty snapshot"
        );
        return Ok(CalculationSnapshot::empty(currency_code));
    };
    trace.record(
        "freight",
        format!("{base_freight} / (1 - {ineffectivity_pct}%)"),
        total_freight,
    );

    let cpa_base = line_items.cpa_base(input.country);
    let base = CostBreakdown {
        supplier_cost: input.supplier_cost,
        freight: total_freight,
        acquisition: Decimal::ZERO,
        admin: line_items.admin_cost(),
        other: line_items.other_costs().ok_or(AmountOverflow::at("other_costs"))?,
    };
    let base_costs = base.base_costs().ok_or(AmountOverflow::at("base_costs"))?;
    trace.record("base_costs", "supplier + freight + admin + other", base_costs);

    let mut sweep: Vec<(MarginResult, MarginSolution)> =
        Vec::with_capacity(input.requested_margins.len());
    for &margin_pct in input.requested_margins {
        let Some(solution) =
            solver::solve_margin(base_costs, cpa_base, settings.cpa_rate, margin_pct)?
        else {
            warn!(
                event_name = "calculator.margin.unsolvable",
                country = %input.country.code,
                margin_pct = %margin_pct,
                cpa_rate = %settings.cpa_rate,
                "margin leaves no room for costs, skipping"
            );
            continue;
        };

        let result = margin_result(&solution, base, currency_code)?;
        record_margin(&mut trace, &solution, &result);
        sweep.push((result, solution));
    }

    let selected = sweep.iter().find(|(result, _)| result.percentage == input.selected_margin);
    let mut snapshot = CalculationSnapshot {
        total_freight,
        ..CalculationSnapshot::empty(currency_code)
    };

    match selected {
        Some((result, solution)) => {
            snapshot.total_cost =
                result.breakdown.total().ok_or(AmountOverflow::at("total_cost"))?;
            snapshot.chart_series = chart::chart_series(&result.breakdown, result.profit);
            snapshot.real_cpa = result.breakdown.acquisition;
            snapshot.breakeven = metrics::breakeven(result.selling_price, &result.breakdown)
                .ok_or(AmountOverflow::at("breakeven"))?;
            snapshot.metrics = Some(
                metrics::acquisition_metrics(solution, &result.breakdown)
                    .ok_or(AmountOverflow::at("max_cpa"))?,
            );

            trace.record(
                "total_cost",
                "supplier + freight + cpa + admin + other",
                snapshot.total_cost,
            );
            trace.record("breakeven", "selling price - non-supplier costs", snapshot.breakeven);
        }
        None => {
            warn!(
                event_name = "calculator.selection.missing",
                country = %input.country.code,
                selected_margin = %input.selected_margin,
                evaluated = sweep.len(),
                "selected margin was not evaluated, aggregates left at zero"
            );
        }
    }

    snapshot.profit_margins = sweep.into_iter().map(|(result, _)| result).collect();
    snapshot.trace = trace;

    debug!(
        event_name = "calculator.evaluate.completed",
        country = %input.country.code,
        currency = currency_code,
        margins = snapshot.profit_margins.len(),
        total_cost = %snapshot.total_cost,
        "pricing snapshot computed"
    );

    Ok(snapshot)
}

fn margin_result(
    solution: &MarginSolution,
    base: CostBreakdown,
    currency_code: &str,
) -> Result<MarginResult, AmountOverflow> {
    let breakdown = CostBreakdown { acquisition: solution.effective_cpa, ..base };
    let profit = breakdown
        .total()
        .and_then(|total| solution.selling_price.checked_sub(total))
        .ok_or(AmountOverflow::at("profit"))?;
    let landing_price = rounding::landing_price(solution.selling_price, currency_code)
        .ok_or(AmountOverflow::at("landing_price"))?;

    Ok(MarginResult {
        percentage: solution.percentage,
        selling_price: solution.selling_price,
        landing_price,
        profit,
        breakdown,
        cpa_floor_applied: solution.floor_applied(),
    })
}

fn record_margin(trace: &mut CalculationTrace, solution: &MarginSolution, result: &MarginResult) {
    let stage = format!("margin.{}", solution.percentage);

    if let Some(proportional_cpa) = solution.proportional_cpa {
        trace.record(
            format!("{stage}.proportional_cpa"),
            "selling price * cpa rate",
            proportional_cpa,
        );
    }
    let detail = match solution.source {
        EstimateSource::Proportional => "base / (1 - cpa rate - margin)",
        EstimateSource::Floored => "(base + cpa floor) / (1 - margin)",
    };
    trace.record(format!("{stage}.selling_price"), detail, result.selling_price);
    trace.record(format!("{stage}.landing_price"), "rounded up for display", result.landing_price);
    trace.record(format!("{stage}.profit"), "selling price - total cost", result.profit);
}

fn validate_strict(
    input: &EvaluationInput<'_>,
    settings: &CalculatorSettings,
) -> Result<(), DomainError> {
    let ineffectivity_pct = input.line_items.ineffectivity_pct();
    if ineffectivity_pct < Decimal::ZERO || ineffectivity_pct >= Decimal::ONE_HUNDRED {
        return Err(DomainError::invalid_input(
            INEFFECTIVITY,
            format!("{ineffectivity_pct}% must be in range [0, 100)"),
        ));
    }

    for &margin_pct in input.requested_margins {
        let solvable = solver::proportional_denominator(settings.cpa_rate, margin_pct)
            .is_some_and(|denominator| denominator > SOLVER_EPSILON)
            && solver::floored_denominator(margin_pct) > SOLVER_EPSILON;
        if !solvable {
            return Err(DomainError::invalid_input(
                "margin",
                format!(
                    "{margin_pct}% plus a cpa rate of {} must stay below 100%",
                    settings.cpa_rate
                ),
            ));
        }
    }

    if !input.requested_margins.contains(&input.selected_margin) {
        return Err(DomainError::invalid_input(
            "selected_margin",
            format!("{}% is not among the requested margins", input.selected_margin),
        ));
    }

    Ok(())
}
