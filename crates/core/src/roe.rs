//! Return-on-equity evaluation for open positions.

use crate::error::RiskError;
use crate::types::Position;
use rust_decimal::Decimal;

/// Compute the percentage return-on-equity of an open position.
///
/// `initial_margin = position_amt × mark_price / leverage`; the magnitude is
/// `unrealized_profit / initial_margin × 100`, rounded to 2 decimal places.
///
/// For a short position the raw division flips sign because the margin term
/// is itself negative, so the final sign is forced to track
/// `unrealized_profit`: non-negative profit yields a non-negative ROE.
///
/// # Errors
/// Returns `InvalidPosition` when leverage or position amount is zero (the
/// margin term would be zero); open positions by definition satisfy both.
pub fn roe(position: &Position) -> Result<Decimal, RiskError> {
    if position.leverage == 0 {
        return Err(RiskError::invalid_position(&position.symbol, "zero leverage"));
    }
    if position.position_amt.is_zero() {
        return Err(RiskError::invalid_position(
            &position.symbol,
            "zero position amount",
        ));
    }

    let initial_margin = position.current_value() / Decimal::from(position.leverage);
    if initial_margin.is_zero() {
        return Err(RiskError::invalid_position(&position.symbol, "zero margin"));
    }

    let magnitude = (position.unrealized_profit / initial_margin * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .abs();

    if position.unrealized_profit < Decimal::ZERO {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(amt: Decimal, mark: Decimal, leverage: u32, profit: Decimal) -> Position {
        Position {
            symbol: "XRPUSDT".to_string(),
            position_amt: amt,
            entry_price: dec!(1.0),
            mark_price: mark,
            leverage,
            unrealized_profit: profit,
        }
    }

    #[test]
    fn test_long_position_loss() {
        // value 80, margin 4, profit -1 => -25%
        let pos = position(dec!(100), dec!(0.8), 20, dec!(-1));
        assert_eq!(roe(&pos).unwrap(), dec!(-25.00));
    }

    #[test]
    fn test_long_position_gain() {
        let pos = position(dec!(100), dec!(1.2), 20, dec!(1.5));
        // value 120, margin 6, profit 1.5 => +25%
        assert_eq!(roe(&pos).unwrap(), dec!(25.00));
    }

    #[test]
    fn test_short_position_sign_forced_to_profit() {
        // Short with profit: value -80, margin -4, raw division gives -500
        // but the profit is positive, so ROE must come out +500.00.
        let pos = position(dec!(-100), dec!(0.8), 20, dec!(20));
        assert_eq!(roe(&pos).unwrap(), dec!(500.00));
    }

    #[test]
    fn test_short_position_loss_is_negative() {
        // Short under water: raw division is positive, forced negative.
        let pos = position(dec!(-100), dec!(1.2), 20, dec!(-20));
        assert_eq!(roe(&pos).unwrap(), dec!(-333.33));
    }

    #[test]
    fn test_roe_sign_tracks_profit_sign() {
        let cases = [
            (dec!(100), dec!(0.8), dec!(5)),
            (dec!(100), dec!(0.8), dec!(-5)),
            (dec!(-100), dec!(0.8), dec!(5)),
            (dec!(-100), dec!(0.8), dec!(-5)),
            (dec!(-100), dec!(0.8), dec!(0)),
        ];
        for (amt, mark, profit) in cases {
            let value = roe(&position(amt, mark, 20, profit)).unwrap();
            if profit < Decimal::ZERO {
                assert!(value < Decimal::ZERO, "amt={amt} profit={profit}");
            } else {
                assert!(value >= Decimal::ZERO, "amt={amt} profit={profit}");
            }
        }
    }

    #[test]
    fn test_rounded_to_two_places() {
        // margin 5, profit 0.3333 => 6.666% -> 6.67
        let pos = position(dec!(100), dec!(1.0), 20, dec!(0.3333));
        assert_eq!(roe(&pos).unwrap(), dec!(6.67));
    }

    #[test]
    fn test_zero_leverage_rejected() {
        let pos = position(dec!(100), dec!(1.0), 0, dec!(1));
        assert!(matches!(
            roe(&pos),
            Err(RiskError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_flat_position_rejected() {
        let pos = position(Decimal::ZERO, dec!(1.0), 20, dec!(0));
        assert!(matches!(
            roe(&pos),
            Err(RiskError::InvalidPosition { .. })
        ));
    }
}
