pub mod country;
pub mod line_item;
pub mod snapshot;

use rust_decimal::Decimal;

/// Adds amounts without panicking, `None` on overflow.
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}
