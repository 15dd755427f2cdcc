use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::country::CountryProfile;

/// Currencies displayed without minor units.
pub const NO_DECIMAL_CURRENCIES: [&str; 3] = ["COP", "CLP", "ARS"];

const COMMA_DECIMAL_LOCALES: [&str; 7] =
    ["es-CO", "es-CL", "es-AR", "es-ES", "es-EC", "pt-BR", "de-DE"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Separators {
    pub thousands: char,
    pub decimal: char,
}

impl Separators {
    pub fn for_locale(locale: &str) -> Self {
        let locale = locale.trim();
        if COMMA_DECIMAL_LOCALES.iter().any(|candidate| candidate.eq_ignore_ascii_case(locale)) {
            Self { thousands: '.', decimal: ',' }
        } else {
            Self { thousands: ',', decimal: '.' }
        }
    }
}

pub fn fraction_digits(currency_code: &str) -> u32 {
    let code = currency_code.trim();
    if NO_DECIMAL_CURRENCIES.iter().any(|candidate| candidate.eq_ignore_ascii_case(code)) {
        0
    } else {
        2
    }
}

pub fn format_amount(amount: Decimal, separators: Separators, fraction_digits: u32) -> String {
    let rounded =
        amount.round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.*}", fraction_digits as usize, rounded.abs());
    let (integer, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut output = String::with_capacity(plain.len() + integer.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        output.push('-');
    }
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            output.push(separators.thousands);
        }
        output.push(digit);
    }
    if let Some(fraction) = fraction {
        output.push(separators.decimal);
        output.push_str(fraction);
    }

    output
}

pub fn format_currency(amount: Decimal, country: &CountryProfile) -> String {
    let digits = fraction_digits(&country.currency_code);
    let rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    let number = format_amount(rounded.abs(), Separators::for_locale(&country.locale), digits);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let gap = if country.symbol.chars().count() > 1 { " " } else { "" };

    format!("{sign}{}{gap}{number}", country.symbol)
}

pub fn format_percentage(percentage: Decimal) -> String {
    format!("{}%", percentage.normalize())
}
