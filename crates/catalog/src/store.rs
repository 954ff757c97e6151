//! Catalog data store abstraction.
//!
//! The storefront's records live in a hosted backend; this trait is the seam
//! the catalog service talks to. Joins between products and their reference
//! tables happen in the service, not in the store.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use psl_core::{
    ActionId, BrandId, CaliberId, CategoryId, Entity, PhotoId, ProductId, VariationId,
};

use crate::product::{Action, Brand, Caliber, Category, Photo, Product, Variation};

/// Typed read/write access to catalog records.
pub trait CatalogStore: Send + Sync {
    fn get_product(&self, id: ProductId) -> Option<Product>;
    fn list_products(&self) -> Vec<Product>;
    fn list_by_category(&self, category_id: CategoryId) -> Vec<Product>;
    fn upsert_product(&self, product: Product);
    /// Remove a product with its variations and photos. Returns whether it existed.
    fn delete_product(&self, id: ProductId) -> bool;

    fn get_variation(&self, id: VariationId) -> Option<Variation>;
    fn variations_of(&self, product_id: ProductId) -> Vec<Variation>;
    /// Stores nothing and returns `false` when the owning product is gone.
    /// The check and the write are atomic with respect to `delete_product`.
    fn upsert_variation(&self, variation: Variation) -> bool;
    fn delete_variation(&self, id: VariationId) -> bool;

    fn get_photo(&self, id: PhotoId) -> Option<Photo>;
    /// Gallery of a product, ordered by position.
    fn photos_of(&self, product_id: ProductId) -> Vec<Photo>;
    /// Same ownership rule as [`CatalogStore::upsert_variation`].
    fn upsert_photo(&self, photo: Photo) -> bool;
    fn delete_photo(&self, id: PhotoId) -> bool;

    fn category(&self, id: CategoryId) -> Option<Category>;
    fn list_categories(&self) -> Vec<Category>;
    fn upsert_category(&self, category: Category);

    fn brand(&self, id: BrandId) -> Option<Brand>;
    fn upsert_brand(&self, brand: Brand);

    fn caliber(&self, id: CaliberId) -> Option<Caliber>;
    fn upsert_caliber(&self, caliber: Caliber);

    fn action(&self, id: ActionId) -> Option<Action>;
    fn upsert_action(&self, action: Action);
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn get_product(&self, id: ProductId) -> Option<Product> {
        (**self).get_product(id)
    }

    fn list_products(&self) -> Vec<Product> {
        (**self).list_products()
    }

    fn list_by_category(&self, category_id: CategoryId) -> Vec<Product> {
        (**self).list_by_category(category_id)
    }

    fn upsert_product(&self, product: Product) {
        (**self).upsert_product(product)
    }

    fn delete_product(&self, id: ProductId) -> bool {
        (**self).delete_product(id)
    }

    fn get_variation(&self, id: VariationId) -> Option<Variation> {
        (**self).get_variation(id)
    }

    fn variations_of(&self, product_id: ProductId) -> Vec<Variation> {
        (**self).variations_of(product_id)
    }

    fn upsert_variation(&self, variation: Variation) -> bool {
        (**self).upsert_variation(variation)
    }

    fn delete_variation(&self, id: VariationId) -> bool {
        (**self).delete_variation(id)
    }

    fn get_photo(&self, id: PhotoId) -> Option<Photo> {
        (**self).get_photo(id)
    }

    fn photos_of(&self, product_id: ProductId) -> Vec<Photo> {
        (**self).photos_of(product_id)
    }

    fn upsert_photo(&self, photo: Photo) -> bool {
        (**self).upsert_photo(photo)
    }

    fn delete_photo(&self, id: PhotoId) -> bool {
        (**self).delete_photo(id)
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        (**self).category(id)
    }

    fn list_categories(&self) -> Vec<Category> {
        (**self).list_categories()
    }

    fn upsert_category(&self, category: Category) {
        (**self).upsert_category(category)
    }

    fn brand(&self, id: BrandId) -> Option<Brand> {
        (**self).brand(id)
    }

    fn upsert_brand(&self, brand: Brand) {
        (**self).upsert_brand(brand)
    }

    fn caliber(&self, id: CaliberId) -> Option<Caliber> {
        (**self).caliber(id)
    }

    fn upsert_caliber(&self, caliber: Caliber) {
        (**self).upsert_caliber(caliber)
    }

    fn action(&self, id: ActionId) -> Option<Action> {
        (**self).action(id)
    }

    fn upsert_action(&self, action: Action) {
        (**self).upsert_action(action)
    }
}

/// In-memory catalog store for tests/dev.
///
/// Lock order is `products` before `variations`/`photos`.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<HashMap<ProductId, Product>>,
    variations: RwLock<HashMap<VariationId, Variation>>,
    photos: RwLock<HashMap<PhotoId, Photo>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
    brands: RwLock<HashMap<BrandId, Brand>>,
    calibers: RwLock<HashMap<CaliberId, Caliber>>,
    actions: RwLock<HashMap<ActionId, Action>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_one<K: Eq + Hash, V: Clone>(table: &RwLock<HashMap<K, V>>, key: &K) -> Option<V> {
    let map = table.read().ok()?;
    map.get(key).cloned()
}

fn read_where<K, V: Clone>(table: &RwLock<HashMap<K, V>>, keep: impl Fn(&V) -> bool) -> Vec<V> {
    let map = match table.read() {
        Ok(m) => m,
        Err(_) => return vec![],
    };
    map.values().filter(|v| keep(v)).cloned().collect()
}

fn write_one<V: Entity>(table: &RwLock<HashMap<V::Id, V>>, value: V) {
    if let Ok(mut map) = table.write() {
        map.insert(value.id().clone(), value);
    }
}

/// Write a child record only while its product is present.
fn write_owned<V: Entity>(
    products: &RwLock<HashMap<ProductId, Product>>,
    table: &RwLock<HashMap<V::Id, V>>,
    product_id: ProductId,
    value: V,
) -> bool {
    let Ok(products) = products.read() else {
        return false;
    };
    if !products.contains_key(&product_id) {
        return false;
    }
    match table.write() {
        Ok(mut map) => {
            map.insert(value.id().clone(), value);
            true
        }
        Err(_) => false,
    }
}

fn remove_one<K: Eq + Hash, V>(table: &RwLock<HashMap<K, V>>, key: &K) -> bool {
    match table.write() {
        Ok(mut map) => map.remove(key).is_some(),
        Err(_) => false,
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn get_product(&self, id: ProductId) -> Option<Product> {
        read_one(&self.products, &id)
    }

    fn list_products(&self) -> Vec<Product> {
        read_where(&self.products, |_| true)
    }

    fn list_by_category(&self, category_id: CategoryId) -> Vec<Product> {
        read_where(&self.products, |p| p.category_id == Some(category_id))
    }

    fn upsert_product(&self, product: Product) {
        write_one(&self.products, product);
    }

    fn delete_product(&self, id: ProductId) -> bool {
        let Ok(mut products) = self.products.write() else {
            return false;
        };
        let existed = products.remove(&id).is_some();
        if let Ok(mut map) = self.variations.write() {
            map.retain(|_, v| v.product_id != id);
        }
        if let Ok(mut map) = self.photos.write() {
            map.retain(|_, p| p.product_id != id);
        }
        existed
    }

    fn get_variation(&self, id: VariationId) -> Option<Variation> {
        read_one(&self.variations, &id)
    }

    fn variations_of(&self, product_id: ProductId) -> Vec<Variation> {
        read_where(&self.variations, |v| v.product_id == product_id)
    }

    fn upsert_variation(&self, variation: Variation) -> bool {
        let product_id = variation.product_id;
        write_owned(&self.products, &self.variations, product_id, variation)
    }

    fn delete_variation(&self, id: VariationId) -> bool {
        remove_one(&self.variations, &id)
    }

    fn get_photo(&self, id: PhotoId) -> Option<Photo> {
        read_one(&self.photos, &id)
    }

    fn photos_of(&self, product_id: ProductId) -> Vec<Photo> {
        let mut photos = read_where(&self.photos, |p| p.product_id == product_id);
        photos.sort_by(|a, b| a.position.cmp(&b.position).then(a.id.cmp(&b.id)));
        photos
    }

    fn upsert_photo(&self, photo: Photo) -> bool {
        let product_id = photo.product_id;
        write_owned(&self.products, &self.photos, product_id, photo)
    }

    fn delete_photo(&self, id: PhotoId) -> bool {
        remove_one(&self.photos, &id)
    }

    fn category(&self, id: CategoryId) -> Option<Category> {
        read_one(&self.categories, &id)
    }

    fn list_categories(&self) -> Vec<Category> {
        let mut categories = read_where(&self.categories, |_| true);
        categories.sort_by_key(|c| c.id);
        categories
    }

    fn upsert_category(&self, category: Category) {
        write_one(&self.categories, category);
    }

    fn brand(&self, id: BrandId) -> Option<Brand> {
        read_one(&self.brands, &id)
    }

    fn upsert_brand(&self, brand: Brand) {
        write_one(&self.brands, brand);
    }

    fn caliber(&self, id: CaliberId) -> Option<Caliber> {
        read_one(&self.calibers, &id)
    }

    fn upsert_caliber(&self, caliber: Caliber) {
        write_one(&self.calibers, caliber);
    }

    fn action(&self, id: ActionId) -> Option<Action> {
        read_one(&self.actions, &id)
    }

    fn upsert_action(&self, action: Action) {
        write_one(&self.actions, action);
    }
}
