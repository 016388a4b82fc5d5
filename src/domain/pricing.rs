//! Pricing engine: subtotal in, tax/shipping/total out.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tax and shipping computed from a cart subtotal.
///
/// `total` is derived from the already-rounded `tax` and `shipping`, so the
/// three fields always reconcile with the subtotal to the cent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

fn tax_rate() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn free_shipping_threshold() -> Decimal {
    Decimal::from(100)
}

fn flat_shipping() -> Decimal {
    Decimal::new(1000, 2) // 10.00
}

/// Prices a non-negative subtotal: 10% tax rounded half-away-from-zero to two
/// decimal places, flat 10.00 shipping waived above 100.00.
///
/// A negative subtotal is a programmer error; subtotals are derived from
/// non-negative unit prices and positive quantities.
pub fn price(subtotal: Decimal) -> Quote {
    assert!(
        !subtotal.is_sign_negative(),
        "pricing a negative subtotal: {subtotal}"
    );
    let tax = (subtotal * tax_rate())
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let shipping = if subtotal > free_shipping_threshold() {
        Decimal::new(0, 2) // 0.00, scale kept so money fields render uniformly
    } else {
        flat_shipping()
    };
    Quote {
        tax,
        shipping,
        total: subtotal + tax + shipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(units: i64, scale: u32) -> Decimal {
        Decimal::new(units, scale)
    }

    #[test]
    fn test_tax_is_ten_percent_rounded() {
        assert_eq!(price(dec(4000, 2)).tax, dec(400, 2)); // 40.00 -> 4.00
        assert_eq!(price(dec(11000, 2)).tax, dec(1100, 2)); // 110.00 -> 11.00
        // 0.05 * 0.1 = 0.005 rounds away from zero to 0.01
        assert_eq!(price(dec(5, 2)).tax, dec(1, 2));
        // 0.04 * 0.1 = 0.004 rounds down to 0.00
        assert_eq!(price(dec(4, 2)).tax, Decimal::ZERO);
    }

    #[test]
    fn test_flat_shipping_below_threshold() {
        assert_eq!(price(Decimal::ZERO).shipping, dec(1000, 2));
        assert_eq!(price(dec(4000, 2)).shipping, dec(1000, 2));
        // exactly 100.00 still pays shipping; the rule is strictly greater
        assert_eq!(price(dec(10000, 2)).shipping, dec(1000, 2));
        assert_eq!(price(dec(10001, 2)).shipping, Decimal::ZERO);
    }

    #[test]
    fn test_worked_examples() {
        // {A: 30 x 2, B: 50 x 1} -> subtotal 110.00
        let q = price(dec(11000, 2));
        assert_eq!(q.tax, dec(1100, 2));
        assert_eq!(q.shipping, Decimal::ZERO);
        assert_eq!(q.total, dec(12100, 2));

        let q = price(dec(4000, 2));
        assert_eq!(q.tax, dec(400, 2));
        assert_eq!(q.shipping, dec(1000, 2));
        assert_eq!(q.total, dec(5400, 2));
    }

    #[test]
    fn test_total_reconciles() {
        for cents in [0i64, 1, 999, 4000, 9999, 10000, 10001, 123456] {
            let subtotal = dec(cents, 2);
            let q = price(subtotal);
            assert_eq!(q.total, subtotal + q.tax + q.shipping);
        }
    }

    #[test]
    #[should_panic(expected = "negative subtotal")]
    fn test_negative_subtotal_panics() {
        price(dec(-1, 2));
    }
}
