//! Equity-based position sizing.

use gale_domain::{Price, Quantity};
use rust_decimal::Decimal;

/// Minimum order size increment of the instrument.
pub const QTY_STEP: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Converts equity and leverage into an order quantity.
///
/// `total_equity` is the initial funded balance plus lifetime compounded
/// realized profit, so gains grow position size. The spend is capped by
/// the actually available balance.
#[derive(Debug, Clone)]
pub struct RiskSizer {
    trade_fraction: Decimal,
    leverage: Decimal,
}

impl RiskSizer {
    pub fn new(trade_fraction: Decimal, leverage: u32) -> Self {
        Self {
            trade_fraction,
            leverage: Decimal::from(leverage),
        }
    }

    /// Size an order at the given price. Returns None when the budget or
    /// the floored quantity is non-positive (abstain, never submit).
    pub fn size(
        &self,
        total_equity: Decimal,
        available_balance: Decimal,
        price: Price,
    ) -> Option<Quantity> {
        let budget = (total_equity * self.trade_fraction).min(available_balance);
        if budget <= Decimal::ZERO {
            return None;
        }

        let notional = budget * self.leverage;
        let raw = notional / price.as_decimal();
        let qty = (raw / QTY_STEP).floor() * QTY_STEP;
        Quantity::new(qty).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price(d: Decimal) -> Price {
        Price::new(d).unwrap()
    }

    #[test]
    fn test_sizes_from_equity_fraction() {
        let sizer = RiskSizer::new(dec!(0.60), 10);
        // 60% of 1000 = 600, available 1000 does not cap; x10 leverage
        let qty = sizer.size(dec!(1000), dec!(1000), price(dec!(0.1))).unwrap();
        assert_eq!(qty.as_decimal(), dec!(60000.00));
    }

    #[test]
    fn test_available_balance_caps_spend() {
        let sizer = RiskSizer::new(dec!(0.60), 10);
        // 60% of 1000 = 600 but only 400 is free
        let qty = sizer.size(dec!(1000), dec!(400), price(dec!(0.1))).unwrap();
        assert_eq!(qty.as_decimal(), dec!(40000.00));
    }

    #[test]
    fn test_floors_to_step() {
        let sizer = RiskSizer::new(dec!(1), 1);
        // 100 / 0.3 = 333.333... -> 333.33
        let qty = sizer.size(dec!(100), dec!(100), price(dec!(0.3))).unwrap();
        assert_eq!(qty.as_decimal(), dec!(333.33));
    }

    #[test]
    fn test_abstains_on_depleted_equity() {
        let sizer = RiskSizer::new(dec!(0.60), 10);
        assert!(sizer.size(dec!(0), dec!(100), price(dec!(0.1))).is_none());
        assert!(sizer.size(dec!(-50), dec!(100), price(dec!(0.1))).is_none());
        assert!(sizer.size(dec!(1000), dec!(0), price(dec!(0.1))).is_none());
    }

    #[test]
    fn test_abstains_when_quantity_rounds_to_zero() {
        let sizer = RiskSizer::new(dec!(1), 1);
        // 0.001 of budget at price 1.0 floors below one step
        assert!(sizer.size(dec!(0.001), dec!(0.001), price(dec!(1))).is_none());
    }
}
