use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Source of a points accrual
///
/// Either an explicit point amount or an order total converted at one
/// point per currency unit, rounded down.
#[derive(Debug, Clone, Copy)]
pub enum Accrual {
    Points(i32),
    FromTotal(Decimal),
}

impl Accrual {
    /// The number of points this accrual is worth
    pub fn effective_points(&self) -> i32 {
        match self {
            Accrual::Points(points) => *points,
            Accrual::FromTotal(total) => total.floor().to_i32().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_explicit_points_pass_through() {
        assert_eq!(Accrual::Points(42).effective_points(), 42);
        assert_eq!(Accrual::Points(0).effective_points(), 0);
        assert_eq!(Accrual::Points(-5).effective_points(), -5);
    }

    #[test]
    fn test_one_point_per_currency_unit_rounded_down() {
        assert_eq!(Accrual::FromTotal(dec!(38.30)).effective_points(), 38);
        assert_eq!(Accrual::FromTotal(dec!(99.99)).effective_points(), 99);
        assert_eq!(Accrual::FromTotal(dec!(100.00)).effective_points(), 100);
        assert_eq!(Accrual::FromTotal(dec!(0.99)).effective_points(), 0);
    }

    #[test]
    fn test_zero_and_negative_totals_earn_nothing() {
        assert_eq!(Accrual::FromTotal(Decimal::ZERO).effective_points(), 0);
        assert!(Accrual::FromTotal(dec!(-10.00)).effective_points() <= 0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Points from a total never exceed the total and differ by less
    /// than one whole unit
    #[test]
    fn prop_floor_conversion() {
        proptest!(|(total_cents in 0u32..=10_000_000)| {
            let total = Decimal::from(total_cents) / Decimal::from(100);
            let points = Accrual::FromTotal(total).effective_points();

            prop_assert!(Decimal::from(points) <= total);
            prop_assert!(total - Decimal::from(points) < Decimal::ONE);
        });
    }
}
