//! Displayed-price resolution.
//!
//! A product either has its own cash price or is sold through variations
//! (caliber / barrel length), each with its own price. Every listing and
//! detail view goes through [`resolve_price`] so they all agree.

use serde::{Deserialize, Serialize};

use psl_core::{Money, ValueObject};

/// The price figure to show for a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum PriceResolution {
    /// No variations and no base price.
    NoPrice,
    /// Simple product: the base price, shown as is.
    Fixed(Money),
    /// Variable product: the cheapest variation, shown as "A partir de".
    StartingFrom(Money),
}

impl ValueObject for PriceResolution {}

impl PriceResolution {
    pub fn amount(&self) -> Option<Money> {
        match self {
            PriceResolution::NoPrice => None,
            PriceResolution::Fixed(amount) | PriceResolution::StartingFrom(amount) => Some(*amount),
        }
    }

    pub fn is_starting_from(&self) -> bool {
        matches!(self, PriceResolution::StartingFrom(_))
    }

    /// Storefront label: `N/A`, `R$ 1.234,56` or `A partir de R$ 999,00`.
    pub fn label(&self) -> String {
        match self {
            PriceResolution::NoPrice => "N/A".to_string(),
            PriceResolution::Fixed(amount) => amount.to_string(),
            PriceResolution::StartingFrom(amount) => format!("A partir de {amount}"),
        }
    }
}

/// Resolve the price to display for a product.
///
/// Variations take precedence over the base price: when at least one is
/// present the cheapest one wins, whatever the base price says.
pub fn resolve_price<I>(base_price: Option<Money>, variation_prices: I) -> PriceResolution
where
    I: IntoIterator<Item = Money>,
{
    match variation_prices.into_iter().min() {
        Some(lowest) => PriceResolution::StartingFrom(lowest),
        None => match base_price {
            Some(price) => PriceResolution::Fixed(price),
            None => PriceResolution::NoPrice,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reais(cents: u64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn no_base_price_and_no_variations_is_no_price() {
        assert_eq!(resolve_price(None, Vec::new()), PriceResolution::NoPrice);
    }

    #[test]
    fn simple_product_uses_base_price() {
        let resolved = resolve_price(Some(reais(450_000)), Vec::new());
        assert_eq!(resolved, PriceResolution::Fixed(reais(450_000)));
        assert!(!resolved.is_starting_from());
    }

    #[test]
    fn zero_base_price_is_still_a_price() {
        assert_eq!(
            resolve_price(Some(Money::ZERO), Vec::new()),
            PriceResolution::Fixed(Money::ZERO)
        );
    }

    #[test]
    fn cheapest_variation_wins_over_base_price() {
        let resolved = resolve_price(
            Some(reais(200_000)),
            vec![reais(120_000), reais(145_000), reais(99_900)],
        );
        assert_eq!(resolved, PriceResolution::StartingFrom(reais(99_900)));
    }

    #[test]
    fn variations_apply_without_base_price() {
        let resolved = resolve_price(None, vec![reais(320_000)]);
        assert_eq!(resolved, PriceResolution::StartingFrom(reais(320_000)));
    }

    #[test]
    fn variations_win_even_when_base_price_is_lower() {
        let resolved = resolve_price(Some(reais(100)), vec![reais(500_000), reais(400_000)]);
        assert_eq!(resolved, PriceResolution::StartingFrom(reais(400_000)));
    }

    #[test]
    fn ties_resolve_to_the_shared_amount() {
        let resolved = resolve_price(None, vec![reais(99_900), reais(99_900), reais(150_000)]);
        assert_eq!(resolved.amount(), Some(reais(99_900)));
    }

    #[test]
    fn minimum_compares_decimals_exactly() {
        // 0.1 + 0.2 style drift would make these compare wrongly as f64.
        let a = Money::parse_brl("0,30").unwrap().unwrap();
        let b = Money::new(rust_decimal::Decimal::new(1, 1) + rust_decimal::Decimal::new(2, 1))
            .unwrap();
        let resolved = resolve_price(None, vec![a, b]);
        assert_eq!(resolved.amount(), Some(a));
        assert_eq!(a, b);
    }

    #[test]
    fn labels_follow_storefront_wording() {
        assert_eq!(PriceResolution::NoPrice.label(), "N/A");
        assert_eq!(PriceResolution::Fixed(reais(123_456)).label(), "R$ 1.234,56");
        assert_eq!(
            PriceResolution::StartingFrom(reais(99_900)).label(),
            "A partir de R$ 999,00"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(PriceResolution::StartingFrom(reais(99_900))).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "starting_from", "amount": "999.00" }));

        let json = serde_json::to_value(PriceResolution::NoPrice).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "no_price" }));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn money() -> impl Strategy<Value = Money> {
            (0u64..100_000_000).prop_map(Money::from_cents)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: without variations the base price is shown verbatim.
            #[test]
            fn base_price_passes_through(base in money()) {
                prop_assert_eq!(
                    resolve_price(Some(base), Vec::new()),
                    PriceResolution::Fixed(base)
                );
            }

            /// Property: with variations the minimum is shown, base price ignored.
            #[test]
            fn minimum_variation_is_shown(
                base in proptest::option::of(money()),
                prices in proptest::collection::vec(money(), 1..20)
            ) {
                let expected = *prices.iter().min().unwrap();
                let resolved = resolve_price(base, prices.clone());
                prop_assert_eq!(resolved, PriceResolution::StartingFrom(expected));
                prop_assert!(prices.iter().all(|p| *p >= expected));
            }

            /// Property: resolution is deterministic.
            #[test]
            fn resolution_is_deterministic(
                base in proptest::option::of(money()),
                prices in proptest::collection::vec(money(), 0..20)
            ) {
                let first = resolve_price(base, prices.clone());
                let second = resolve_price(base, prices);
                prop_assert_eq!(first, second);
            }
        }
    }
}
