use rust_decimal::Decimal;

/// Currencies whose shelf prices are quoted in whole hundreds.
pub const HUNDREDS_CURRENCIES: [&str; 2] = ["COP", "CLP"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandingRounding {
    Hundreds,
    WholeUnits,
}

impl LandingRounding {
    pub fn for_currency(currency_code: &str) -> Self {
        let code = currency_code.trim();
        if HUNDREDS_CURRENCIES.iter().any(|candidate| candidate.eq_ignore_ascii_case(code)) {
            Self::Hundreds
        } else {
            Self::WholeUnits
        }
    }

    /// Always rounds up, so the displayed price never undercuts the solved one.
    /// `None` when rounding up would leave the decimal range.
    pub fn apply(self, price: Decimal) -> Option<Decimal> {
        match self {
            Self::Hundreds => {
                (price / Decimal::ONE_HUNDRED).ceil().checked_mul(Decimal::ONE_HUNDRED)
            }
            Self::WholeUnits => Some(price.ceil()),
        }
    }
}

pub fn landing_price(selling_price: Decimal, currency_code: &str) -> Option<Decimal> {
    LandingRounding::for_currency(currency_code).apply(selling_price)
}
