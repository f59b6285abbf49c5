//! Order total computation.
//!
//! Everything here is a pure function of a subtotal and a [`PricingConfig`].
//! Amounts stay unrounded until [`OrderTotals::amount_due`] or display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::price::round_cents;

/// Fixed rate table applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Shipping charged when the order does not qualify for free shipping.
    pub shipping_flat_rate: Decimal,
    /// Tax as a fraction of the subtotal (0.08 = 8%).
    pub tax_rate: Decimal,
    /// Subtotal at or above which shipping is free. `None` always charges
    /// the flat rate.
    pub free_shipping_threshold: Option<Decimal>,
}

impl PricingConfig {
    /// Storefront defaults: $9.99 shipping, 8% tax, free shipping from $100.
    pub const DEFAULT: Self = Self {
        shipping_flat_rate: Decimal::from_parts(999, 0, 0, false, 2),
        tax_rate: Decimal::from_parts(8, 0, 0, false, 2),
        free_shipping_threshold: Some(Decimal::from_parts(100, 0, 0, false, 0)),
    };
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Shipping for a given subtotal.
#[must_use]
pub fn compute_shipping(subtotal: Decimal, rates: &PricingConfig) -> Decimal {
    match rates.free_shipping_threshold {
        Some(threshold) if subtotal >= threshold => Decimal::ZERO,
        _ => rates.shipping_flat_rate,
    }
}

/// Tax on a subtotal, unrounded.
#[must_use]
pub fn compute_tax(subtotal: Decimal, tax_rate: Decimal) -> Decimal {
    subtotal * tax_rate
}

#[must_use]
pub fn compute_total(subtotal: Decimal, shipping: Decimal, tax: Decimal) -> Decimal {
    subtotal + shipping + tax
}

/// All derived amounts for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Derive shipping, tax and total from a subtotal.
    #[must_use]
    pub fn compute(subtotal: Decimal, rates: &PricingConfig) -> Self {
        let shipping = compute_shipping(subtotal, rates);
        let tax = compute_tax(subtotal, rates.tax_rate);
        Self {
            subtotal,
            shipping,
            tax,
            total: compute_total(subtotal, shipping, tax),
        }
    }

    /// Totals for the current contents of a cart.
    #[must_use]
    pub fn for_cart(cart: &Cart, rates: &PricingConfig) -> Self {
        Self::compute(cart.total_price(), rates)
    }

    /// The grand total rounded once to cents. This is what gets charged.
    #[must_use]
    pub fn amount_due(&self) -> Decimal {
        round_cents(self.total)
    }

    /// Whether the free shipping threshold was met.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_defaults() {
        let rates = PricingConfig::default();
        assert_eq!(rates.shipping_flat_rate, dollars(999));
        assert_eq!(rates.tax_rate, Decimal::new(8, 2));
        assert_eq!(rates.free_shipping_threshold, Some(dollars(10_000)));
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let rates = PricingConfig::default();
        let totals = OrderTotals::compute(dollars(11_000), &rates);

        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, dollars(880));
        assert_eq!(totals.total, dollars(11_880));
        assert!(totals.ships_free());
    }

    #[test]
    fn test_flat_rate_below_threshold() {
        let rates = PricingConfig::default();
        let totals = OrderTotals::compute(dollars(5000), &rates);

        assert_eq!(totals.shipping, dollars(999));
        assert_eq!(totals.tax, dollars(400));
        assert_eq!(totals.total, dollars(6399));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let rates = PricingConfig::default();
        assert_eq!(compute_shipping(dollars(10_000), &rates), Decimal::ZERO);
        assert_eq!(compute_shipping(dollars(9_999), &rates), dollars(999));
    }

    #[test]
    fn test_disabled_threshold_always_charges() {
        let rates = PricingConfig {
            free_shipping_threshold: None,
            ..PricingConfig::default()
        };
        assert_eq!(compute_shipping(dollars(500_000), &rates), dollars(999));
    }

    #[test]
    fn test_tax_is_unrounded_until_amount_due() {
        let rates = PricingConfig::default();
        let totals = OrderTotals::compute(dollars(29_999), &rates);

        assert_eq!(totals.tax, Decimal::new(239_992, 4));
        assert_eq!(totals.total, Decimal::new(3_239_892, 4));
        assert_eq!(totals.amount_due(), dollars(32_399));
    }

    #[test]
    fn test_pure_functions_are_repeatable() {
        let rates = PricingConfig::default();
        let first = OrderTotals::compute(dollars(12_345), &rates);
        let second = OrderTotals::compute(dollars(12_345), &rates);
        assert_eq!(first, second);
        assert_eq!(
            compute_total(dollars(100), dollars(200), dollars(300)),
            dollars(600)
        );
    }
}
