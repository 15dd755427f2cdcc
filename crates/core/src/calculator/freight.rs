use rust_decimal::Decimal;

use super::AmountOverflow;

/// Fraction of shipments that fail and have to be re-sent, as `[0, 1)`.
pub fn ineffectivity_fraction(ineffectivity_pct: Decimal) -> Decimal {
    ineffectivity_pct / Decimal::ONE_HUNDRED
}

/// Freight cost per successful delivery: `base / (1 - ineffectivity)`.
///
/// Returns `Ok(None)` when every shipment fails (`ineffectivity_pct >= 100`),
/// where no finite freight exists.
pub fn effective_freight(
    base_freight: Decimal,
    ineffectivity_pct: Decimal,
) -> Result<Option<Decimal>, AmountOverflow> {
    let delivered = Decimal::ONE - ineffectivity_fraction(ineffectivity_pct);
    if delivered <= Decimal::ZERO {
        return Ok(None);
    }

    base_freight.checked_div(delivered).map(Some).ok_or(AmountOverflow::at("freight"))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{effective_freight, AmountOverflow};

    #[test]
    fn zero_ineffectivity_keeps_base_freight() {
        assert_eq!(
            effective_freight(Decimal::from(20_000), Decimal::ZERO),
            Ok(Some(Decimal::from(20_000)))
        );
    }

    #[test]
    fn quarter_failure_rate_inflates_freight_by_a_third() {
        let freight = effective_freight(Decimal::from(20_000), Decimal::from(25))
            .ok()
            .flatten()
            .expect("freight should be finite below 100% ineffectivity");

        assert_eq!(freight.round_dp(2), Decimal::new(2_666_667, 2));
    }

    #[test]
    fn freight_grows_strictly_with_ineffectivity() {
        let base = Decimal::from(12_500);
        let mut previous = Decimal::ZERO;

        for pct in [0, 1, 10, 25, 50, 75, 90, 99] {
            let freight = effective_freight(base, Decimal::from(pct))
                .ok()
                .flatten()
                .expect("freight should be finite below 100% ineffectivity");
            assert!(freight > previous, "freight at {pct}% should exceed {previous}");
            previous = freight;
        }
    }

    #[test]
    fn total_failure_has_no_finite_freight() {
        assert_eq!(effective_freight(Decimal::from(20_000), Decimal::ONE_HUNDRED), Ok(None));
        assert_eq!(effective_freight(Decimal::from(20_000), Decimal::from(120)), Ok(None));
    }

    #[test]
    fn freight_past_the_decimal_range_is_an_overflow() {
        assert_eq!(
            effective_freight(Decimal::MAX, Decimal::from(25)),
            Err(AmountOverflow::at("freight"))
        );
    }
}
