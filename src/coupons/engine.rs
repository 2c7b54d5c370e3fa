use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::coupons::error::CouponError;
use crate::coupons::models::{Coupon, DiscountType};

/// Evaluate a coupon against an order total
///
/// Checks run in a fixed order and the first failure wins:
/// temporal validity, global usage limit, minimum order value, per-user
/// usage limit. `prior_user_uses` is None for anonymous carts, which
/// skips the per-user check.
///
/// The returned discount is clamped to the order total so applying it
/// can never produce a negative total.
pub fn evaluate(
    coupon: &Coupon,
    order_total: Decimal,
    prior_user_uses: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Decimal, CouponError> {
    if now < coupon.valid_from {
        return Err(CouponError::NotYetValid);
    }

    if let Some(valid_until) = coupon.valid_until {
        if now > valid_until {
            return Err(CouponError::Expired);
        }
    }

    if let Some(max_uses) = coupon.max_uses {
        if coupon.uses_count >= max_uses {
            return Err(CouponError::UsageLimitReached);
        }
    }

    if order_total < coupon.min_order_value {
        return Err(CouponError::BelowMinimum {
            minimum: coupon.min_order_value,
        });
    }

    if let (Some(uses), Some(cap)) = (prior_user_uses, coupon.max_uses_per_user) {
        if uses >= cap as i64 {
            return Err(CouponError::PerUserLimitReached);
        }
    }

    let discount = match coupon.discount_type {
        DiscountType::Percentage => order_total * coupon.discount_value / Decimal::from(100),
        DiscountType::Fixed => coupon.discount_value,
    };

    Ok(discount.min(order_total))
}

/// Normalize a coupon code for storage and lookup
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(discount_type: DiscountType, discount_value: Decimal) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: 1,
            code: "PIZZA10".to_string(),
            description: None,
            discount_type,
            discount_value,
            min_order_value: Decimal::ZERO,
            max_uses: None,
            uses_count: 0,
            max_uses_per_user: None,
            valid_from: now - Duration::days(1),
            valid_until: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = coupon(DiscountType::Percentage, dec!(50));
        let discount = evaluate(&coupon, dec!(10.00), None, Utc::now()).unwrap();

        assert_eq!(discount, dec!(5.00));
    }

    #[test]
    fn test_fixed_discount_clamped_to_order_total() {
        let coupon = coupon(DiscountType::Fixed, dec!(100.00));
        let discount = evaluate(&coupon, dec!(10.00), None, Utc::now()).unwrap();

        assert_eq!(discount, dec!(10.00));
    }

    #[test]
    fn test_ten_percent_example() {
        let coupon = coupon(DiscountType::Percentage, dec!(10));
        let discount = evaluate(&coupon, dec!(37.00), None, Utc::now()).unwrap();

        assert_eq!(discount, dec!(3.70));
    }

    #[test]
    fn test_not_yet_valid() {
        let mut c = coupon(DiscountType::Fixed, dec!(5.00));
        c.valid_from = Utc::now() + Duration::days(1);

        let result = evaluate(&c, dec!(50.00), None, Utc::now());
        assert!(matches!(result, Err(CouponError::NotYetValid)));
    }

    #[test]
    fn test_expired_wins_regardless_of_other_fields() {
        let mut c = coupon(DiscountType::Percentage, dec!(10));
        c.valid_until = Some(Utc::now() - Duration::hours(1));
        c.max_uses = Some(100);
        c.min_order_value = dec!(1000.00);

        let result = evaluate(&c, dec!(5.00), None, Utc::now());
        assert!(matches!(result, Err(CouponError::Expired)));
    }

    #[test]
    fn test_usage_limit_reached() {
        let mut c = coupon(DiscountType::Fixed, dec!(5.00));
        c.max_uses = Some(3);
        c.uses_count = 3;

        let result = evaluate(&c, dec!(50.00), None, Utc::now());
        assert!(matches!(result, Err(CouponError::UsageLimitReached)));
    }

    #[test]
    fn test_below_minimum_carries_the_minimum() {
        let mut c = coupon(DiscountType::Fixed, dec!(5.00));
        c.min_order_value = dec!(20.00);

        let result = evaluate(&c, dec!(19.99), None, Utc::now());
        match result {
            Err(CouponError::BelowMinimum { minimum }) => assert_eq!(minimum, dec!(20.00)),
            other => panic!("Expected BelowMinimum, got {:?}", other),
        }
    }

    #[test]
    fn test_per_user_limit() {
        let mut c = coupon(DiscountType::Fixed, dec!(5.00));
        c.max_uses_per_user = Some(2);

        // Two prior uses exhaust the cap
        let result = evaluate(&c, dec!(50.00), Some(2), Utc::now());
        assert!(matches!(result, Err(CouponError::PerUserLimitReached)));

        // One prior use still passes
        assert!(evaluate(&c, dec!(50.00), Some(1), Utc::now()).is_ok());

        // Anonymous carts skip the per-user check
        assert!(evaluate(&c, dec!(50.00), None, Utc::now()).is_ok());
    }

    #[test]
    fn test_check_order_minimum_before_per_user() {
        let mut c = coupon(DiscountType::Fixed, dec!(5.00));
        c.min_order_value = dec!(30.00);
        c.max_uses_per_user = Some(1);

        // Both would fail; the minimum-order check comes first
        let result = evaluate(&c, dec!(10.00), Some(5), Utc::now());
        assert!(matches!(result, Err(CouponError::BelowMinimum { .. })));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  pizza10 "), "PIZZA10");
        assert_eq!(normalize_code("Pizza10"), "PIZZA10");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn base_coupon(discount_type: DiscountType, discount_value: Decimal) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: 1,
            code: "PROP".to_string(),
            description: None,
            discount_type,
            discount_value,
            min_order_value: Decimal::ZERO,
            max_uses: None,
            uses_count: 0,
            max_uses_per_user: None,
            valid_from: now - Duration::days(1),
            valid_until: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The discount never exceeds the order total, for either type
    #[test]
    fn prop_discount_never_exceeds_total() {
        proptest!(|(
            total_cents in 0u32..=100_000,
            value_cents in 0u32..=50_000,
            percentage in prop::bool::ANY
        )| {
            let total = Decimal::from(total_cents) / Decimal::from(100);
            let (dtype, value) = if percentage {
                (DiscountType::Percentage, Decimal::from(value_cents % 101))
            } else {
                (DiscountType::Fixed, Decimal::from(value_cents) / Decimal::from(100))
            };

            let coupon = base_coupon(dtype, value);
            let discount = evaluate(&coupon, total, None, Utc::now()).unwrap();

            prop_assert!(discount <= total);
            prop_assert!(total - discount >= Decimal::ZERO);
        });
    }

    /// A coupon whose valid_until lies in the past always fails with
    /// Expired, whatever the rest of its fields say
    #[test]
    fn prop_past_valid_until_always_expired() {
        proptest!(|(
            total_cents in 0u32..=100_000,
            hours_ago in 1i64..=10_000
        )| {
            let mut coupon = base_coupon(DiscountType::Percentage, Decimal::from(10));
            coupon.valid_from = Utc::now() - Duration::days(3650);
            coupon.valid_until = Some(Utc::now() - Duration::hours(hours_ago));

            let total = Decimal::from(total_cents) / Decimal::from(100);
            let result = evaluate(&coupon, total, None, Utc::now());

            prop_assert!(matches!(result, Err(CouponError::Expired)));
        });
    }
}
