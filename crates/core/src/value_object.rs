//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. In the catalog
/// these are amounts (`Money`), resolved prices and installment options:
/// two of them with the same fields are interchangeable, and none of them is
/// persisted on its own.
///
/// ```ignore
/// let a = Money::from_cents(99_900);
/// let b = Money::parse_brl("999,00")?.unwrap();
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
