//! `psl-core` — domain foundation for the Pesca Sem Limites catalog.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, typed identifiers and the `Money` value object.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ActionId, BrandId, CaliberId, CategoryId, PhotoId, ProductId, VariationId};
pub use money::{format_brl, Money};
pub use value_object::ValueObject;
