use rust_decimal::Decimal;

use crate::delivery::models::DeliveryZone;
use crate::orders::models::OrderType;
use crate::settings::CheckoutConfig;

/// Totals of a checkout, assembled in order:
/// subtotal → minus clamped discount → plus delivery fee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Subtotal for one order line
pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Cart subtotal as the sum of line totals
pub fn subtotal(line_totals: &[Decimal]) -> Decimal {
    line_totals.iter().sum()
}

/// Delivery fee for an order
///
/// Pickup and dine-in orders are always free. A delivery order with a
/// resolved zone pays that zone's flat fee. A zone-less delivery order
/// falls back to the configured policy: free at or above the
/// free-delivery threshold (compared against the pre-discount
/// subtotal), the flat fee otherwise.
pub fn delivery_fee(
    order_type: OrderType,
    zone: Option<&DeliveryZone>,
    subtotal: Decimal,
    config: &CheckoutConfig,
) -> Decimal {
    match order_type {
        OrderType::Pickup | OrderType::DineIn => Decimal::ZERO,
        OrderType::Delivery => match zone {
            Some(zone) => zone.delivery_fee,
            None => match config.free_delivery_threshold {
                Some(threshold) if subtotal >= threshold => Decimal::ZERO,
                _ => config.flat_delivery_fee,
            },
        },
    }
}

/// Compose the final totals for a checkout
///
/// The discount is clamped to the subtotal, so the total can never go
/// negative however the coupon was configured.
pub fn summarize(
    subtotal: Decimal,
    discount: Decimal,
    order_type: OrderType,
    zone: Option<&DeliveryZone>,
    config: &CheckoutConfig,
) -> CheckoutSummary {
    let discount = discount.min(subtotal).max(Decimal::ZERO);
    let delivery_fee = delivery_fee(order_type, zone, subtotal, config);
    let total = subtotal - discount + delivery_fee;

    CheckoutSummary {
        subtotal,
        discount,
        delivery_fee,
        total,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// The final total is never negative, whatever the discount
    #[test]
    fn prop_total_never_negative() {
        proptest!(|(
            subtotal_cents in 0u32..=100_000,
            discount_cents in 0u32..=200_000,
            fee_cents in 0u32..=5_000
        )| {
            let config = CheckoutConfig {
                free_delivery_threshold: None,
                flat_delivery_fee: Decimal::from(fee_cents) / Decimal::from(100),
            };

            let summary = summarize(
                Decimal::from(subtotal_cents) / Decimal::from(100),
                Decimal::from(discount_cents) / Decimal::from(100),
                OrderType::Delivery,
                None,
                &config,
            );

            prop_assert!(summary.total >= Decimal::ZERO);
            prop_assert!(summary.discount <= summary.subtotal);
        });
    }

    /// Total decomposes exactly into subtotal - discount + fee
    #[test]
    fn prop_total_decomposition() {
        proptest!(|(
            subtotal_cents in 0u32..=100_000,
            discount_cents in 0u32..=100_000,
            fee_cents in 0u32..=5_000
        )| {
            let config = CheckoutConfig {
                free_delivery_threshold: None,
                flat_delivery_fee: Decimal::from(fee_cents) / Decimal::from(100),
            };

            let summary = summarize(
                Decimal::from(subtotal_cents) / Decimal::from(100),
                Decimal::from(discount_cents) / Decimal::from(100),
                OrderType::Delivery,
                None,
                &config,
            );

            prop_assert_eq!(
                summary.total,
                summary.subtotal - summary.discount + summary.delivery_fee
            );
        });
    }
}
