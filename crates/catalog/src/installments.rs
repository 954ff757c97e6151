//! Installment ladder ("parcelamento").
//!
//! The storefront always offers 1x through 10x. Up to 4x the cash price is
//! split without interest; from 5x on an 8% surcharge is applied once to the
//! cash price and the surcharged total is split.

use core::iter::FusedIterator;
use core::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use psl_core::{Money, ValueObject};

/// Highest installment count offered.
pub const MAX_INSTALLMENTS: u32 = 10;

/// Highest installment count without surcharge.
pub const INTEREST_FREE_INSTALLMENTS: u32 = 4;

/// Surcharge factor for counts above [`INTEREST_FREE_INSTALLMENTS`] (8%).
pub const SURCHARGE_FACTOR: Decimal = Decimal::from_parts(108, 0, 0, false, 2);

/// One row of the installment ladder.
///
/// Amounts are kept at full precision; round only when rendering.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallmentOption {
    pub count: u32,
    pub per_installment: Money,
    pub total_payable: Money,
    pub carries_surcharge: bool,
}

impl ValueObject for InstallmentOption {}

impl InstallmentOption {
    fn for_count(cash_price: Money, count: NonZeroU32) -> Self {
        let carries_surcharge = count.get() > INTEREST_FREE_INSTALLMENTS;
        let total_payable = if carries_surcharge {
            cash_price.scale_by(SURCHARGE_FACTOR)
        } else {
            cash_price
        };

        Self {
            count: count.get(),
            per_installment: total_payable.divided_into(count),
            total_payable,
            carries_surcharge,
        }
    }

    /// `"5x de R$ 216,00"`.
    pub fn label(&self) -> String {
        format!("{}x de {}", self.count, self.per_installment)
    }

    /// `"Total: R$ 1.080,00 (com juros de 8%)"` or `"sem juros"`.
    pub fn total_label(&self) -> String {
        if self.carries_surcharge {
            format!("Total: {} (com juros de 8%)", self.total_payable)
        } else {
            "sem juros".to_string()
        }
    }
}

/// Lazy iterator over the installment ladder.
///
/// Clone it before consuming to walk the ladder again.
#[derive(Debug, Clone)]
pub struct Installments {
    cash_price: Option<Money>,
    next_count: u32,
}

impl Iterator for Installments {
    type Item = InstallmentOption;

    fn next(&mut self) -> Option<Self::Item> {
        let cash_price = self.cash_price?;
        if self.next_count > MAX_INSTALLMENTS {
            return None;
        }
        let count = NonZeroU32::new(self.next_count)?;
        self.next_count += 1;
        Some(InstallmentOption::for_count(cash_price, count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.cash_price {
            Some(_) => (MAX_INSTALLMENTS + 1).saturating_sub(self.next_count) as usize,
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Installments {}

impl FusedIterator for Installments {}

/// Build the installment ladder for a cash price.
///
/// An absent price yields an empty ladder; callers hide the installment UI.
pub fn compute_installments(cash_price: Option<Money>) -> Installments {
    Installments {
        cash_price,
        next_count: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reais(cents: u64) -> Money {
        Money::from_cents(cents)
    }

    fn option(ladder: &[InstallmentOption], count: u32) -> InstallmentOption {
        *ladder.iter().find(|o| o.count == count).unwrap()
    }

    #[test]
    fn absent_price_yields_no_options() {
        let mut ladder = compute_installments(None);
        assert_eq!(ladder.len(), 0);
        assert!(ladder.next().is_none());
    }

    #[test]
    fn thousand_reais_ladder_matches_storefront() {
        let ladder: Vec<_> = compute_installments(Some(reais(100_000))).collect();
        assert_eq!(ladder.len(), 10);

        let one = option(&ladder, 1);
        assert_eq!(one.per_installment, reais(100_000));
        assert_eq!(one.total_payable, reais(100_000));
        assert!(!one.carries_surcharge);

        assert_eq!(option(&ladder, 4).per_installment, reais(25_000));

        let five = option(&ladder, 5);
        assert_eq!(five.total_payable, reais(108_000));
        assert_eq!(five.per_installment, reais(21_600));
        assert!(five.carries_surcharge);

        let ten = option(&ladder, 10);
        assert_eq!(ten.total_payable, reais(108_000));
        assert_eq!(ten.per_installment, reais(10_800));
        assert!(ten.carries_surcharge);
    }

    #[test]
    fn surcharge_is_applied_once_not_compounded() {
        let ladder: Vec<_> = compute_installments(Some(reais(100_000))).collect();
        let totals: Vec<_> = ladder[4..].iter().map(|o| o.total_payable).collect();
        assert!(totals.iter().all(|t| *t == reais(108_000)));
    }

    #[test]
    fn amounts_are_not_rounded_before_display() {
        let ladder: Vec<_> = compute_installments(Some(reais(100_000))).collect();
        let three = option(&ladder, 3);
        assert_ne!(three.per_installment, three.per_installment.round_for_display());
        assert_eq!(three.label(), "3x de R$ 333,33");
    }

    #[test]
    fn labels_follow_storefront_wording() {
        let ladder: Vec<_> = compute_installments(Some(reais(100_000))).collect();
        assert_eq!(option(&ladder, 5).label(), "5x de R$ 216,00");
        assert_eq!(
            option(&ladder, 5).total_label(),
            "Total: R$ 1.080,00 (com juros de 8%)"
        );
        assert_eq!(option(&ladder, 2).total_label(), "sem juros");
    }

    #[test]
    fn ladder_can_be_restarted_by_cloning() {
        let ladder = compute_installments(Some(reais(59_990)));
        let first: Vec<_> = ladder.clone().collect();
        let second: Vec<_> = ladder.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn size_hint_tracks_consumption() {
        let mut ladder = compute_installments(Some(reais(1)));
        assert_eq!(ladder.len(), 10);
        ladder.next();
        ladder.next();
        assert_eq!(ladder.len(), 8);
        assert_eq!(ladder.by_ref().count(), 8);
        assert!(ladder.next().is_none());
    }

    #[test]
    fn zero_price_yields_zero_amounts() {
        let ladder: Vec<_> = compute_installments(Some(Money::ZERO)).collect();
        assert_eq!(ladder.len(), 10);
        assert!(ladder.iter().all(|o| o.per_installment.is_zero() && o.total_payable.is_zero()));
    }

    #[test]
    fn ladder_at_price_ceiling_stays_in_range() {
        let ladder: Vec<_> = compute_installments(Some(Money::MAX)).collect();
        assert_eq!(ladder.len(), 10);
        assert_eq!(option(&ladder, 1).total_payable, Money::MAX);

        let ten = option(&ladder, 10);
        assert_eq!(ten.total_payable, Money::MAX.scale_by(SURCHARGE_FACTOR));
        assert_eq!(
            ten.total_label(),
            "Total: R$ 199.224.835.996.063.157,44 (com juros de 8%)"
        );
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: ten options, counts 1..=10, totals constant per band.
            #[test]
            fn ladder_shape_is_fixed(cents in 1u64..1_000_000_000) {
                let cash = Money::from_cents(cents);
                let ladder: Vec<_> = compute_installments(Some(cash)).collect();

                prop_assert_eq!(ladder.len(), 10);
                for (i, option) in ladder.iter().enumerate() {
                    prop_assert_eq!(option.count, i as u32 + 1);
                    if option.count <= INTEREST_FREE_INSTALLMENTS {
                        prop_assert_eq!(option.total_payable, cash);
                        prop_assert!(!option.carries_surcharge);
                    } else {
                        prop_assert_eq!(option.total_payable, cash.scale_by(SURCHARGE_FACTOR));
                        prop_assert!(option.carries_surcharge);
                    }
                }
            }

            /// Property: per-installment * count is within a centavo of the total.
            #[test]
            fn installments_add_up_to_total(cents in 0u64..1_000_000_000) {
                let cash = Money::from_cents(cents);
                let tolerance = Decimal::new(1, 2);
                for option in compute_installments(Some(cash)) {
                    let recomposed = option.per_installment.amount() * Decimal::from(option.count);
                    let drift = (recomposed - option.total_payable.amount()).abs();
                    prop_assert!(drift <= tolerance, "drift {} for {}x", drift, option.count);
                }
            }

            /// Property: the ladder is deterministic.
            #[test]
            fn ladder_is_deterministic(cents in 0u64..1_000_000_000) {
                let cash = Some(Money::from_cents(cents));
                let first: Vec<_> = compute_installments(cash).collect();
                let second: Vec<_> = compute_installments(cash).collect();
                prop_assert_eq!(first, second);
            }
        }
    }
}
