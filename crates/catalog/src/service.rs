//! Catalog service: back-office edits and the storefront views built on them.
//!
//! The service owns no state besides its store; callers build one per
//! application (or per request in tests) and pass it around explicitly.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use psl_core::{CategoryId, DomainError, DomainResult, PhotoId, ProductId, VariationId};

use crate::installments::{compute_installments, InstallmentOption};
use crate::pricing::PriceResolution;
use crate::product::{
    Category, NewPhoto, NewProduct, NewVariation, Photo, Product, ProductChanges, Variation,
};
use crate::store::CatalogStore;

/// How many products the home page showcase holds.
pub const FEATURED_LIMIT: usize = 8;

/// A product tile on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCard {
    pub product_id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub caliber: Option<String>,
    /// Primary photo, see [`Product::primary_photo`].
    pub photo_url: Option<String>,
    pub price: PriceResolution,
}

/// A variation row on the detail page, with its caliber joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationView {
    pub variation: Variation,
    pub caliber: Option<String>,
}

/// Everything the product detail page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub brand: Option<String>,
    pub caliber: Option<String>,
    pub action: Option<String>,
    pub category: Option<String>,
    /// Primary photo, see [`Product::primary_photo`].
    pub photo_url: Option<String>,
    /// Gallery ordered by position.
    pub photos: Vec<Photo>,
    /// Sorted by ascending price.
    pub variations: Vec<VariationView>,
    pub price: PriceResolution,
    /// Installment ladder for the displayed amount; empty without a price.
    pub installments: Vec<InstallmentOption>,
}

/// A category on the category overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub product_count: usize,
}

#[derive(Debug)]
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new product. Referenced category/brand/caliber/action must exist.
    pub fn create_product(&self, input: NewProduct) -> DomainResult<Product> {
        let product = input.into_product(ProductId::new(), Utc::now())?;
        self.ensure_references(&product)?;

        tracing::info!(
            product_id = %product.id,
            name = %product.name,
            "product created"
        );
        self.store.upsert_product(product.clone());
        Ok(product)
    }

    pub fn update_product(&self, id: ProductId, changes: ProductChanges) -> DomainResult<Product> {
        let mut product = self.require_product(id)?;
        product.apply(changes)?;
        self.ensure_references(&product)?;

        tracing::info!(product_id = %id, "product updated");
        self.store.upsert_product(product.clone());
        Ok(product)
    }

    /// Delete a product together with its variations.
    pub fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        if !self.store.delete_product(id) {
            return Err(DomainError::not_found(format!("product {id}")));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub fn add_variation(
        &self,
        product_id: ProductId,
        input: NewVariation,
    ) -> DomainResult<Variation> {
        self.require_product(product_id)?;
        if self.store.caliber(input.caliber_id).is_none() {
            return Err(DomainError::not_found(format!("caliber {}", input.caliber_id)));
        }

        let variation = input.into_variation(VariationId::new(), product_id);
        // The product may have been deleted since the lookup above.
        if !self.store.upsert_variation(variation.clone()) {
            return Err(DomainError::not_found(format!("product {product_id}")));
        }
        tracing::info!(
            product_id = %product_id,
            variation_id = %variation.id,
            price = %variation.price,
            "variation added"
        );
        Ok(variation)
    }

    pub fn remove_variation(&self, id: VariationId) -> DomainResult<()> {
        if !self.store.delete_variation(id) {
            return Err(DomainError::not_found(format!("variation {id}")));
        }
        tracing::info!(variation_id = %id, "variation removed");
        Ok(())
    }

    /// Add a photo to a product's gallery, last unless a position is given.
    pub fn add_photo(&self, product_id: ProductId, input: NewPhoto) -> DomainResult<Photo> {
        self.require_product(product_id)?;
        let next_position = self
            .store
            .photos_of(product_id)
            .last()
            .map_or(0, |p| p.position.saturating_add(1));

        let photo = input.into_photo(PhotoId::new(), product_id, next_position)?;
        if !self.store.upsert_photo(photo.clone()) {
            return Err(DomainError::not_found(format!("product {product_id}")));
        }
        tracing::info!(
            product_id = %product_id,
            photo_id = %photo.id,
            position = photo.position,
            "photo added"
        );
        Ok(photo)
    }

    pub fn remove_photo(&self, id: PhotoId) -> DomainResult<()> {
        if !self.store.delete_photo(id) {
            return Err(DomainError::not_found(format!("photo {id}")));
        }
        tracing::info!(photo_id = %id, "photo removed");
        Ok(())
    }

    /// Renumber a product's gallery 0, 1, 2, ... in the given order.
    ///
    /// `order` must name every photo of the product exactly once.
    pub fn reorder_photos(
        &self,
        product_id: ProductId,
        order: &[PhotoId],
    ) -> DomainResult<Vec<Photo>> {
        self.require_product(product_id)?;
        let mut current = self.store.photos_of(product_id);

        let mut requested = order.to_vec();
        requested.sort();
        requested.dedup();
        let mut existing: Vec<_> = current.iter().map(|p| p.id).collect();
        existing.sort();
        if requested.len() != order.len() || requested != existing {
            return Err(DomainError::validation(format!(
                "photo order must list each of the {} photos of product {product_id} once",
                existing.len()
            )));
        }

        current.sort_by_key(|p| order.iter().position(|id| *id == p.id));
        for (position, photo) in (0u32..).zip(current.iter_mut()) {
            photo.position = position;
            if !self.store.upsert_photo(photo.clone()) {
                return Err(DomainError::not_found(format!("product {product_id}")));
            }
        }

        tracing::info!(product_id = %product_id, photos = current.len(), "photos reordered");
        Ok(current)
    }

    /// Displayed price for a single product.
    pub fn price_of(&self, id: ProductId) -> DomainResult<PriceResolution> {
        let product = self.require_product(id)?;
        Ok(product.resolve_price(&self.store.variations_of(id)))
    }

    /// Product cards for the listing page, optionally restricted to a category.
    ///
    /// Cards are sorted by name so repeated renders are stable.
    pub fn listing(&self, category_id: Option<CategoryId>) -> DomainResult<Vec<ProductCard>> {
        let products = match category_id {
            Some(category_id) => {
                if self.store.category(category_id).is_none() {
                    return Err(DomainError::not_found(format!("category {category_id}")));
                }
                self.store.list_by_category(category_id)
            }
            None => self.store.list_products(),
        };

        let mut cards: Vec<ProductCard> = products.into_iter().map(|p| self.card(p)).collect();
        sort_cards(&mut cards);

        tracing::debug!(count = cards.len(), category = ?category_id, "listing built");
        Ok(cards)
    }

    /// Home page showcase: featured products, at most `limit` of them.
    pub fn featured(&self, limit: usize) -> Vec<ProductCard> {
        let mut products: Vec<Product> = self
            .store
            .list_products()
            .into_iter()
            .filter(|p| p.featured)
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        products.truncate(limit);

        let cards: Vec<ProductCard> = products.into_iter().map(|p| self.card(p)).collect();

        tracing::debug!(count = cards.len(), limit, "featured showcase built");
        cards
    }

    /// The product detail page, including its installment ladder.
    pub fn detail(&self, id: ProductId) -> DomainResult<ProductDetail> {
        let product = self.require_product(id)?;

        let mut variations = self.store.variations_of(id);
        variations.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));

        let price = product.resolve_price(&variations);
        let installments = compute_installments(price.amount()).collect();
        let photos = self.store.photos_of(id);
        let photo_url = product.primary_photo(&photos).map(str::to_string);

        let variations = variations
            .into_iter()
            .map(|variation| VariationView {
                caliber: self.store.caliber(variation.caliber_id).map(|c| c.name),
                variation,
            })
            .collect();

        Ok(ProductDetail {
            brand: product.brand_id.and_then(|id| self.store.brand(id)).map(|r| r.name),
            caliber: product.caliber_id.and_then(|id| self.store.caliber(id)).map(|r| r.name),
            action: product.action_id.and_then(|id| self.store.action(id)).map(|r| r.name),
            category: product
                .category_id
                .and_then(|id| self.store.category(id))
                .map(|r| r.name),
            photo_url,
            photos,
            variations,
            price,
            installments,
            product,
        })
    }

    /// Categories with how many products each one holds.
    pub fn categories_with_counts(&self) -> Vec<CategorySummary> {
        self.store
            .list_categories()
            .into_iter()
            .map(|category| CategorySummary {
                product_count: self.store.list_by_category(category.id).len(),
                category,
            })
            .collect()
    }

    fn card(&self, product: Product) -> ProductCard {
        let variations = self.store.variations_of(product.id);
        let photos = self.store.photos_of(product.id);
        ProductCard {
            product_id: product.id,
            brand: product.brand_id.and_then(|id| self.store.brand(id)).map(|b| b.name),
            caliber: product.caliber_id.and_then(|id| self.store.caliber(id)).map(|c| c.name),
            photo_url: product.primary_photo(&photos).map(str::to_string),
            price: product.resolve_price(&variations),
            name: product.name,
        }
    }

    fn require_product(&self, id: ProductId) -> DomainResult<Product> {
        self.store.get_product(id).ok_or_else(|| {
            tracing::debug!(product_id = %id, "product lookup missed");
            DomainError::not_found(format!("product {id}"))
        })
    }

    fn ensure_references(&self, product: &Product) -> DomainResult<()> {
        if let Some(id) = product.category_id {
            if self.store.category(id).is_none() {
                return Err(DomainError::not_found(format!("category {id}")));
            }
        }
        if let Some(id) = product.brand_id {
            if self.store.brand(id).is_none() {
                return Err(DomainError::not_found(format!("brand {id}")));
            }
        }
        if let Some(id) = product.caliber_id {
            if self.store.caliber(id).is_none() {
                return Err(DomainError::not_found(format!("caliber {id}")));
            }
        }
        if let Some(id) = product.action_id {
            if self.store.action(id).is_none() {
                return Err(DomainError::not_found(format!("action {id}")));
            }
        }
        Ok(())
    }
}

/// By name, then id, so repeated renders are stable.
fn sort_cards(cards: &mut [ProductCard]) {
    cards.sort_by(|a, b| a.name.cmp(&b.name).then(a.product_id.cmp(&b.product_id)));
}
