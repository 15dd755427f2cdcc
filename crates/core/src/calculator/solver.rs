//! Per-margin price solve.
//!
//! Acquisition spend (CPA) is modelled as a fixed share of the final selling
//! price, which makes the price appear on both sides of
//! `price = base + cpa_rate * price + margin * price`. The closed form is
//! `price = base / (1 - cpa_rate - margin)`. When that proportional CPA lands
//! under the configured CPA floor, the floor is charged instead and the price
//! becomes `(base + floor) / (1 - margin)`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AmountOverflow;

/// Smallest denominator either closed form accepts.
pub const SOLVER_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub selling_price: Decimal,
    pub acquisition: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    Proportional,
    Floored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginSolution {
    pub percentage: Decimal,
    pub selling_price: Decimal,
    pub effective_cpa: Decimal,
    /// CPA implied by the proportional model, `None` when it had no solution.
    pub proportional_cpa: Option<Decimal>,
    pub source: EstimateSource,
}

impl MarginSolution {
    pub fn floor_applied(&self) -> bool {
        self.source == EstimateSource::Floored
    }
}

pub fn margin_fraction(margin_pct: Decimal) -> Decimal {
    margin_pct / Decimal::ONE_HUNDRED
}

/// `None` only for a CPA rate so far out of range that the subtraction
/// overflows; callers treat that like a denominator below the epsilon.
pub fn proportional_denominator(cpa_rate: Decimal, margin_pct: Decimal) -> Option<Decimal> {
    Decimal::ONE.checked_sub(cpa_rate)?.checked_sub(margin_fraction(margin_pct))
}

pub fn floored_denominator(margin_pct: Decimal) -> Decimal {
    Decimal::ONE - margin_fraction(margin_pct)
}

/// `Ok(None)` when the margin leaves no room for the proportional CPA,
/// `Err` when the price does not fit in a `Decimal`.
pub fn proportional_estimate(
    base_costs: Decimal,
    cpa_rate: Decimal,
    margin_pct: Decimal,
) -> Result<Option<PriceEstimate>, AmountOverflow> {
    let Some(denominator) = proportional_denominator(cpa_rate, margin_pct)
        .filter(|denominator| *denominator > SOLVER_EPSILON)
    else {
        return Ok(None);
    };

    let selling_price =
        base_costs.checked_div(denominator).ok_or(AmountOverflow::at("selling_price"))?;
    let acquisition =
        selling_price.checked_mul(cpa_rate).ok_or(AmountOverflow::at("proportional_cpa"))?;
    Ok(Some(PriceEstimate { selling_price, acquisition }))
}

pub fn floored_estimate(
    base_costs: Decimal,
    cpa_base: Decimal,
    margin_pct: Decimal,
) -> Result<Option<PriceEstimate>, AmountOverflow> {
    let denominator = floored_denominator(margin_pct);
    if denominator <= SOLVER_EPSILON {
        return Ok(None);
    }

    let selling_price = base_costs
        .checked_add(cpa_base)
        .and_then(|floored_base| floored_base.checked_div(denominator))
        .ok_or(AmountOverflow::at("selling_price"))?;
    Ok(Some(PriceEstimate { selling_price, acquisition: cpa_base }))
}

/// Keeps the proportional estimate unless its CPA falls under the floor or it
/// has no solution, in which case the floored estimate is taken.
pub fn select_estimate(
    proportional: Option<PriceEstimate>,
    floored: Option<PriceEstimate>,
    cpa_base: Decimal,
) -> Option<(PriceEstimate, EstimateSource)> {
    match proportional {
        Some(estimate) if estimate.acquisition >= cpa_base => {
            Some((estimate, EstimateSource::Proportional))
        }
        _ => floored.map(|estimate| (estimate, EstimateSource::Floored)),
    }
}

/// `Ok(None)` when neither closed form has a solution for this margin.
pub fn solve_margin(
    base_costs: Decimal,
    cpa_base: Decimal,
    cpa_rate: Decimal,
    margin_pct: Decimal,
) -> Result<Option<MarginSolution>, AmountOverflow> {
    let proportional = proportional_estimate(base_costs, cpa_rate, margin_pct)?;
    let floored = floored_estimate(base_costs, cpa_base, margin_pct)?;
    let Some((selected, source)) = select_estimate(proportional, floored, cpa_base) else {
        return Ok(None);
    };

    Ok(Some(MarginSolution {
        percentage: margin_pct,
        selling_price: selected.selling_price,
        effective_cpa: selected.acquisition,
        proportional_cpa: proportional.map(|estimate| estimate.acquisition),
        source,
    }))
}
