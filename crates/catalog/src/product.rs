use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use psl_core::{
    ActionId, BrandId, CaliberId, CategoryId, DomainError, DomainResult, Entity, Money, PhotoId,
    ProductId, VariationId,
};

use crate::pricing::{resolve_price, PriceResolution};

/// A named reference record (brand, caliber, category, action type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference<Id> {
    pub id: Id,
    pub name: String,
}

pub type Brand = Reference<BrandId>;
pub type Caliber = Reference<CaliberId>;
pub type Category = Reference<CategoryId>;
pub type Action = Reference<ActionId>;

impl<Id> Reference<Id> {
    /// Create a reference record, trimming and rejecting blank names.
    pub fn new(id: Id, name: impl Into<String>) -> DomainResult<Self> {
        let name = non_blank("name", name.into())?;
        Ok(Self { id, name })
    }
}

impl<Id> Entity for Reference<Id>
where
    Id: Clone + Eq + core::hash::Hash + core::fmt::Debug,
{
    type Id = Id;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Free-text technical fields shown on the product sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecs {
    pub shot_capacity: Option<String>,
    pub magazines: Option<String>,
    pub barrel_length: Option<String>,
    pub finish: Option<String>,
}

impl ProductSpecs {
    /// Blank fields become `None`, the rest are trimmed.
    fn normalized(self) -> Self {
        Self {
            shot_capacity: optional_text(self.shot_capacity),
            magazines: optional_text(self.magazines),
            barrel_length: optional_text(self.barrel_length),
            finish: optional_text(self.finish),
        }
    }
}

/// A catalog product (a weapon record).
///
/// `base_price` is the cash price of a simple product. Products sold through
/// variations conventionally leave it unset; it is ignored once any
/// variation exists.
///
/// `photo_url` is the legacy single photo; gallery [`Photo`]s take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub base_price: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub caliber_id: Option<CaliberId>,
    pub action_id: Option<ActionId>,
    pub photo_url: Option<String>,
    /// Shown in the home page showcase.
    #[serde(default)]
    pub featured: bool,
    pub specs: ProductSpecs,
    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    /// Displayed price for this product given its variations.
    pub fn resolve_price<'a, I>(&self, variations: I) -> PriceResolution
    where
        I: IntoIterator<Item = &'a Variation>,
    {
        resolve_price(self.base_price, variations.into_iter().map(|v| v.price))
    }

    /// Photo shown on cards: the gallery photo with the lowest position,
    /// else the product's own `photo_url`.
    pub fn primary_photo<'a, I>(&'a self, photos: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a Photo>,
    {
        photos
            .into_iter()
            .filter(|p| p.product_id == self.id)
            .min_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)))
            .map(|p| p.url.as_str())
            .or(self.photo_url.as_deref())
    }

    /// Apply an edit, validating the resulting record.
    pub fn apply(&mut self, changes: ProductChanges) -> DomainResult<()> {
        if let Some(name) = changes.name {
            self.name = non_blank("product name", name)?;
        }
        if let Some(base_price) = changes.base_price {
            self.base_price = base_price;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
        if let Some(brand_id) = changes.brand_id {
            self.brand_id = brand_id;
        }
        if let Some(caliber_id) = changes.caliber_id {
            self.caliber_id = caliber_id;
        }
        if let Some(action_id) = changes.action_id {
            self.action_id = action_id;
        }
        if let Some(photo_url) = changes.photo_url {
            self.photo_url = optional_text(photo_url);
        }
        if let Some(featured) = changes.featured {
            self.featured = featured;
        }
        if let Some(specs) = changes.specs {
            self.specs = specs.normalized();
        }
        Ok(())
    }
}

/// Input for registering a product from the back office.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub base_price: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub caliber_id: Option<CaliberId>,
    pub action_id: Option<ActionId>,
    pub photo_url: Option<String>,
    pub featured: bool,
    pub specs: ProductSpecs,
}

impl NewProduct {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.base_price = Some(price);
        self
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Validate and turn into a product record.
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> DomainResult<Product> {
        Ok(Product {
            id,
            name: non_blank("product name", self.name)?,
            base_price: self.base_price,
            category_id: self.category_id,
            brand_id: self.brand_id,
            caliber_id: self.caliber_id,
            action_id: self.action_id,
            photo_url: optional_text(self.photo_url),
            featured: self.featured,
            specs: self.specs.normalized(),
            created_at,
        })
    }
}

/// Partial edit of a product. Outer `None` leaves a field untouched; for
/// optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub base_price: Option<Option<Money>>,
    pub category_id: Option<Option<CategoryId>>,
    pub brand_id: Option<Option<BrandId>>,
    pub caliber_id: Option<Option<CaliberId>>,
    pub action_id: Option<Option<ActionId>>,
    pub photo_url: Option<Option<String>>,
    pub featured: Option<bool>,
    pub specs: Option<ProductSpecs>,
}

/// A priced variation of a product (caliber + barrel length).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: VariationId,
    pub product_id: ProductId,
    pub price: Money,
    pub caliber_id: CaliberId,
    pub barrel_length: String,
}

impl Entity for Variation {
    type Id = VariationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for adding a variation to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariation {
    pub price: Money,
    pub caliber_id: CaliberId,
    pub barrel_length: String,
}

impl NewVariation {
    pub fn into_variation(self, id: VariationId, product_id: ProductId) -> Variation {
        Variation {
            id,
            product_id,
            price: self.price,
            caliber_id: self.caliber_id,
            barrel_length: self.barrel_length.trim().to_string(),
        }
    }
}

/// A gallery photo. Lower `position` is shown first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub product_id: ProductId,
    pub url: String,
    pub position: u32,
}

impl Entity for Photo {
    type Id = PhotoId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for adding a photo. Without a position the photo goes last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhoto {
    pub url: String,
    pub position: Option<u32>,
}

impl NewPhoto {
    pub fn at_end(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            position: None,
        }
    }

    /// `next_position` is used when no position was requested.
    pub fn into_photo(
        self,
        id: PhotoId,
        product_id: ProductId,
        next_position: u32,
    ) -> DomainResult<Photo> {
        Ok(Photo {
            id,
            product_id,
            url: non_blank("photo url", self.url)?,
            position: self.position.unwrap_or(next_position),
        })
    }
}

fn non_blank(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
