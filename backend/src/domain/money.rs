//! Fixed-point money helpers.

use rust_decimal::{Decimal, RoundingStrategy};

use super::BookingValidationError;

/// Fraction digits used for every persisted monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12, 2)` money column holds: 9,999,999,999.99.
pub const MAX_MONEY_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Round to two fraction digits, half away from zero, and pin the scale so
/// `1500` renders as `1500.00`.
///
/// # Examples
/// ```
/// use orderdesk::domain::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(1125, 3)).to_string(), "1.13");
/// assert_eq!(round_money(Decimal::from(1500)).to_string(), "1500.00");
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Pass `amount` through while it fits a money column.
pub(crate) fn money_in_range(amount: Decimal) -> Result<Decimal, BookingValidationError> {
    if amount > MAX_MONEY_AMOUNT {
        return Err(BookingValidationError::AmountOutOfRange);
    }
    Ok(amount)
}

/// Add `amount` to `sum`, failing once the result leaves the money range.
pub(crate) fn add_money(sum: Decimal, amount: Decimal) -> Result<Decimal, BookingValidationError> {
    sum.checked_add(amount)
        .ok_or(BookingValidationError::AmountOutOfRange)
        .and_then(money_in_range)
}
