//! Catalog domain for the Pesca Sem Limites storefront.
//!
//! Pricing rules (displayed price, installment ladder) are pure functions with
//! no IO. The product model, the data-store seam and the catalog service that
//! builds listing/detail views sit on top of them.

pub mod installments;
pub mod pricing;
pub mod product;
pub mod service;
pub mod store;

pub use installments::{compute_installments, InstallmentOption, Installments};
pub use pricing::{resolve_price, PriceResolution};
pub use product::{
    Action, Brand, Caliber, Category, NewPhoto, NewProduct, NewVariation, Photo, Product,
    ProductChanges, ProductSpecs, Reference, Variation,
};
pub use service::{
    CatalogService, CategorySummary, ProductCard, ProductDetail, VariationView, FEATURED_LIMIT,
};
pub use store::{CatalogStore, InMemoryCatalogStore};
