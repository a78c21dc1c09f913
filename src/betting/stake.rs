use rust_decimal::{Decimal, RoundingStrategy};

/// Every bet risks the same amount: 10 000.00.
pub const FIXED_STAKE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 2);

/// Odds must pay out more than the stake.
pub const MIN_ODDS_EXCLUSIVE: Decimal = Decimal::ONE;

/// Payout credited as points when the bet wins.
pub fn potential_return(odds: Decimal) -> Decimal {
    (FIXED_STAKE * odds).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
