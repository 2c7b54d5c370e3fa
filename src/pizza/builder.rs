use rust_decimal::Decimal;

use crate::models::Product;
use crate::pizza::error::PizzaError;
use crate::pizza::models::{PizzaBorder, PizzaSize, ProductPrice};

/// One flavor on a pizza-in-progress with its proportional share
///
/// Fractions are always an equal split: every flavor on an N-flavor pizza
/// holds exactly 1/N.
#[derive(Debug, Clone)]
pub struct FlavorPortion {
    pub product: Product,
    pub fraction: f64,
}

/// A pizza being composed: size, optional border and a set of flavors
///
/// Purely in-memory; nothing is persisted until the selection is turned
/// into an order line.
#[derive(Debug, Clone, Default)]
pub struct PizzaSelection {
    size: Option<PizzaSize>,
    border: Option<PizzaBorder>,
    flavors: Vec<FlavorPortion>,
}

impl PizzaSelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> Option<&PizzaSize> {
        self.size.as_ref()
    }

    pub fn border(&self) -> Option<&PizzaBorder> {
        self.border.as_ref()
    }

    pub fn flavors(&self) -> &[FlavorPortion] {
        &self.flavors
    }

    /// Maximum number of flavors the current size allows (1 with no size)
    pub fn max_flavors(&self) -> i32 {
        self.size.as_ref().map(|s| s.max_flavors).unwrap_or(1)
    }

    /// Select or change the pizza size
    ///
    /// When the new size allows fewer flavors than are already selected,
    /// the earliest-added flavors are kept and the rest are dropped.
    pub fn select_size(&mut self, size: PizzaSize) {
        let cap = size.max_flavors.max(1) as usize;
        if self.flavors.len() > cap {
            self.flavors.truncate(cap);
        }
        self.size = Some(size);
        self.rebalance();
    }

    /// Select or clear the border
    pub fn select_border(&mut self, border: Option<PizzaBorder>) {
        self.border = border;
    }

    /// Add a flavor to the selection
    ///
    /// Fails without changing the selection when the size's flavor cap is
    /// already reached. Every flavor's fraction is recomputed to 1/N.
    pub fn add_flavor(&mut self, product: Product) -> Result<(), PizzaError> {
        let max = self.max_flavors();
        if self.flavors.len() >= max as usize {
            return Err(PizzaError::MaxFlavorsExceeded { max });
        }

        self.flavors.push(FlavorPortion {
            product,
            fraction: 1.0,
        });
        self.rebalance();
        Ok(())
    }

    /// Remove a flavor by product id and rebalance the remaining fractions
    pub fn remove_flavor(&mut self, product_id: i32) {
        self.flavors.retain(|f| f.product.id != product_id);
        self.rebalance();
    }

    /// Whether the selection can be added to a cart
    pub fn is_purchasable(&self) -> bool {
        self.size.is_some() && !self.flavors.is_empty()
    }

    /// Compute the price of the composed pizza
    ///
    /// A split pizza is priced by its single most expensive flavor (using
    /// the size-specific price when one exists, the base price otherwise),
    /// scaled by the size multiplier, plus the border add-on. This is the
    /// authoritative pricing rule, not an approximation of per-fraction
    /// billing. Returns zero until a size and at least one flavor are
    /// selected.
    pub fn total_price(&self, overrides: &[ProductPrice]) -> Decimal {
        let size = match &self.size {
            Some(size) => size,
            None => return Decimal::ZERO,
        };
        if self.flavors.is_empty() {
            return Decimal::ZERO;
        }

        let max_flavor_price = self
            .flavors
            .iter()
            .map(|f| size_price(&f.product, size.id, overrides))
            .max()
            .unwrap_or(Decimal::ZERO);

        let border_price = self
            .border
            .as_ref()
            .map(|b| b.additional_price)
            .unwrap_or(Decimal::ZERO);

        max_flavor_price * size.price_multiplier + border_price
    }

    /// Recompute every fraction as an equal split of the whole pizza
    fn rebalance(&mut self) {
        let count = self.flavors.len();
        if count == 0 {
            return;
        }

        let fraction = 1.0 / count as f64;
        for flavor in &mut self.flavors {
            flavor.fraction = fraction;
        }
    }
}

/// Price of a product for a given size: the per-size override when one
/// exists, the product's base price otherwise
pub fn size_price(product: &Product, size_id: i32, overrides: &[ProductPrice]) -> Decimal {
    overrides
        .iter()
        .find(|p| p.product_id == product.id && p.size_id == size_id)
        .map(|p| p.price)
        .unwrap_or(product.price)
}

/// Compose a selection from already-fetched parts and price it
///
/// Used by the quote endpoint and by checkout so both derive pizza
/// prices from the same engine. Flavors are added in the given order,
/// which also decides which ones survive a too-small size.
pub fn price_composition(
    size: PizzaSize,
    border: Option<PizzaBorder>,
    flavors: Vec<Product>,
    overrides: &[ProductPrice],
) -> Result<(PizzaSelection, Decimal), PizzaError> {
    let mut selection = PizzaSelection::new();
    selection.select_size(size);
    selection.select_border(border);

    for product in flavors {
        selection.add_flavor(product)?;
    }

    if !selection.is_purchasable() {
        return Err(PizzaError::NoFlavorsSelected);
    }

    let total = selection.total_price(overrides);
    Ok((selection, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(id: i32, name: &str, price: Decimal) -> Product {
        Product {
            id,
            category_id: None,
            name: name.to_string(),
            description: None,
            price,
            image_url: None,
            is_vegetarian: false,
            is_featured: false,
            is_active: true,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn size(id: i32, multiplier: Decimal, max_flavors: i32) -> PizzaSize {
        PizzaSize {
            id,
            code: "M".to_string(),
            name: "Média".to_string(),
            description: None,
            price_multiplier: multiplier,
            max_flavors,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn border(additional_price: Decimal) -> PizzaBorder {
        PizzaBorder {
            id: 1,
            name: "Catupiry".to_string(),
            description: None,
            additional_price,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fractions_are_equal_split() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(1.0), 4));

        selection.add_flavor(product(1, "Calabresa", dec!(30.00))).unwrap();
        assert_eq!(selection.flavors()[0].fraction, 1.0);

        selection.add_flavor(product(2, "Mussarela", dec!(28.00))).unwrap();
        assert_eq!(selection.flavors()[0].fraction, 0.5);
        assert_eq!(selection.flavors()[1].fraction, 0.5);

        selection.add_flavor(product(3, "Portuguesa", dec!(33.00))).unwrap();
        let sum: f64 = selection.flavors().iter().map(|f| f.fraction).sum();
        for flavor in selection.flavors() {
            assert!((flavor.fraction - 1.0 / 3.0).abs() < 1e-9);
        }
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_flavor_respects_max_flavors() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(1.0), 2));

        selection.add_flavor(product(1, "Calabresa", dec!(30.00))).unwrap();
        selection.add_flavor(product(2, "Mussarela", dec!(28.00))).unwrap();

        let result = selection.add_flavor(product(3, "Portuguesa", dec!(33.00)));
        assert!(matches!(result, Err(PizzaError::MaxFlavorsExceeded { max: 2 })));

        // The rejected add leaves the selection unchanged
        assert_eq!(selection.flavors().len(), 2);
        assert_eq!(selection.flavors()[0].fraction, 0.5);
    }

    #[test]
    fn test_flavor_cap_is_one_without_size() {
        let mut selection = PizzaSelection::new();

        selection.add_flavor(product(1, "Calabresa", dec!(30.00))).unwrap();
        let result = selection.add_flavor(product(2, "Mussarela", dec!(28.00)));

        assert!(matches!(result, Err(PizzaError::MaxFlavorsExceeded { max: 1 })));
    }

    #[test]
    fn test_remove_flavor_rebalances() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(1.0), 3));

        selection.add_flavor(product(1, "Calabresa", dec!(30.00))).unwrap();
        selection.add_flavor(product(2, "Mussarela", dec!(28.00))).unwrap();
        selection.add_flavor(product(3, "Portuguesa", dec!(33.00))).unwrap();

        selection.remove_flavor(2);

        assert_eq!(selection.flavors().len(), 2);
        assert_eq!(selection.flavors()[0].fraction, 0.5);
        assert_eq!(selection.flavors()[1].fraction, 0.5);
    }

    #[test]
    fn test_remove_last_flavor_leaves_empty_selection() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(1.0), 2));
        selection.add_flavor(product(1, "Calabresa", dec!(30.00))).unwrap();

        selection.remove_flavor(1);

        assert!(selection.flavors().is_empty());
        assert!(!selection.is_purchasable());
    }

    #[test]
    fn test_shrinking_size_keeps_earliest_flavors() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(1.5), 4));

        selection.add_flavor(product(1, "Calabresa", dec!(30.00))).unwrap();
        selection.add_flavor(product(2, "Mussarela", dec!(28.00))).unwrap();
        selection.add_flavor(product(3, "Portuguesa", dec!(33.00))).unwrap();

        selection.select_size(size(2, dec!(1.0), 2));

        assert_eq!(selection.flavors().len(), 2);
        assert_eq!(selection.flavors()[0].product.id, 1);
        assert_eq!(selection.flavors()[1].product.id, 2);
        assert_eq!(selection.flavors()[0].fraction, 0.5);
    }

    #[test]
    fn test_total_price_guarded_without_size_or_flavors() {
        let mut selection = PizzaSelection::new();
        assert_eq!(selection.total_price(&[]), Decimal::ZERO);

        selection.select_size(size(1, dec!(1.5), 2));
        assert_eq!(selection.total_price(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_total_price_uses_most_expensive_flavor() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(1.5), 2));
        selection.select_border(Some(border(dec!(3.00))));

        selection.add_flavor(product(1, "Calabresa", dec!(20.00))).unwrap();
        selection.add_flavor(product(2, "Portuguesa", dec!(25.00))).unwrap();

        // 25.00 * 1.5 + 3.00
        assert_eq!(selection.total_price(&[]), dec!(40.50));
    }

    #[test]
    fn test_total_price_without_border() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(1, dec!(2.0), 2));
        selection.add_flavor(product(1, "Calabresa", dec!(20.00))).unwrap();

        assert_eq!(selection.total_price(&[]), dec!(40.00));
    }

    #[test]
    fn test_total_price_prefers_size_specific_price() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(7, dec!(1.0), 2));
        selection.add_flavor(product(1, "Calabresa", dec!(20.00))).unwrap();

        let overrides = vec![ProductPrice {
            id: 1,
            product_id: 1,
            size_id: 7,
            price: dec!(35.00),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];

        assert_eq!(selection.total_price(&overrides), dec!(35.00));
    }

    #[test]
    fn test_override_for_other_size_is_ignored() {
        let mut selection = PizzaSelection::new();
        selection.select_size(size(7, dec!(1.0), 2));
        selection.add_flavor(product(1, "Calabresa", dec!(20.00))).unwrap();

        let overrides = vec![ProductPrice {
            id: 1,
            product_id: 1,
            size_id: 8,
            price: dec!(35.00),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];

        assert_eq!(selection.total_price(&overrides), dec!(20.00));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn product(id: i32, price_cents: u32) -> Product {
        Product {
            id,
            category_id: None,
            name: format!("Sabor {}", id),
            description: None,
            price: Decimal::from(price_cents) / Decimal::from(100),
            image_url: None,
            is_vegetarian: false,
            is_featured: false,
            is_active: true,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn size_with_multiplier(multiplier_thousandths: u32, max_flavors: i32) -> PizzaSize {
        PizzaSize {
            id: 1,
            code: "G".to_string(),
            name: "Grande".to_string(),
            description: None,
            price_multiplier: Decimal::from(multiplier_thousandths) / Decimal::from(1000),
            max_flavors,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Every flavor on an N-flavor pizza holds exactly 1/N and the
    /// fractions sum to one
    #[test]
    fn prop_fraction_invariant() {
        proptest!(|(count in 1usize..=8)| {
            let mut selection = PizzaSelection::new();
            selection.select_size(size_with_multiplier(1000, 8));

            for id in 0..count {
                selection.add_flavor(product(id as i32, 2000)).unwrap();
            }

            let expected = 1.0 / count as f64;
            for flavor in selection.flavors() {
                prop_assert!((flavor.fraction - expected).abs() < 1e-9);
            }

            let sum: f64 = selection.flavors().iter().map(|f| f.fraction).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        });
    }

    /// add_flavor never grows the set past the size cap
    #[test]
    fn prop_max_flavors_invariant() {
        proptest!(|(max_flavors in 1i32..=4, attempts in 1usize..=10)| {
            let mut selection = PizzaSelection::new();
            selection.select_size(size_with_multiplier(1000, max_flavors));

            for id in 0..attempts {
                let _ = selection.add_flavor(product(id as i32, 2500));
                prop_assert!(selection.flavors().len() <= max_flavors as usize);
            }
        });
    }

    /// Raising the size multiplier never lowers the computed price
    #[test]
    fn prop_price_monotonic_in_multiplier() {
        proptest!(|(
            m1 in 500u32..=3000,
            m2 in 500u32..=3000,
            prices in prop::collection::vec(500u32..=6000, 1..=4)
        )| {
            let (low, high) = if m1 <= m2 { (m1, m2) } else { (m2, m1) };

            let build = |multiplier: u32| {
                let mut selection = PizzaSelection::new();
                selection.select_size(size_with_multiplier(multiplier, 4));
                selection.select_border(Some(PizzaBorder {
                    id: 1,
                    name: "Cheddar".to_string(),
                    description: None,
                    additional_price: dec!(3.00),
                    display_order: 0,
                    is_active: true,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }));
                for (id, cents) in prices.iter().enumerate() {
                    selection.add_flavor(product(id as i32, *cents)).unwrap();
                }
                selection.total_price(&[])
            };

            prop_assert!(build(low) <= build(high));
        });
    }

    /// The price never drops below the border add-on plus the cheapest
    /// flavor contribution, and pricing ignores the fraction split
    #[test]
    fn prop_price_tracks_most_expensive_flavor() {
        proptest!(|(prices in prop::collection::vec(500u32..=6000, 1..=4))| {
            let mut selection = PizzaSelection::new();
            selection.select_size(size_with_multiplier(1000, 4));
            for (id, cents) in prices.iter().enumerate() {
                selection.add_flavor(product(id as i32, *cents)).unwrap();
            }

            let max_cents = *prices.iter().max().unwrap();
            let expected = Decimal::from(max_cents) / Decimal::from(100);
            prop_assert_eq!(selection.total_price(&[]), expected);
        });
    }
}
