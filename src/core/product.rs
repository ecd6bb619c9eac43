//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for listing, creating, updating and seeding bakery
//! products. Prices are validated as non-negative [`Money`] and stored in cents.
//! All functions are async and return Result types for proper error handling.

use crate::{
    config::catalog::Catalog,
    core::money::Money,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name, must not be blank
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Unit price, must not be negative
    pub price: Money,
    /// Optional image path or URL
    pub image_url: Option<String>,
}

/// Partial update of a product; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New unit price
    pub price: Option<Money>,
    /// New image path or URL
    pub image_url: Option<String>,
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("name", "Product name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: Money) -> Result<Money> {
    if price.is_negative() {
        return Err(Error::InvalidAmount {
            amount: price.to_string(),
        });
    }
    Ok(price)
}

/// Retrieves all products in catalog order (by id).
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative
/// - The database insert operation fails
#[instrument(skip(db))]
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<product::Model> {
    let name = validate_name(&new.name)?;
    let price = validate_price(new.price)?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(name),
        description: Set(new.description),
        price_cents: Set(price.cents()),
        image_url: Set(new.image_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Applies a partial update to an existing product and refreshes `updated_at`.
///
/// # Errors
/// Returns an error if:
/// - A new name is blank or a new price is negative
/// - The product does not exist
/// - The database update operation fails
#[instrument(skip(db))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    update: ProductUpdate,
) -> Result<product::Model> {
    let name = update.name.as_deref().map(validate_name).transpose()?;
    let price = update.price.map(validate_price).transpose()?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    if let Some(name) = name {
        product.name = Set(name);
    }
    if let Some(price) = price {
        product.price_cents = Set(price.cents());
    }
    if let Some(description) = update.description {
        product.description = Set(Some(description));
    }
    if let Some(image_url) = update.image_url {
        product.image_url = Set(Some(image_url));
    }
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Inserts the seed catalog when no products exist yet.
///
/// Returns the number of products inserted (zero when the table already had rows).
#[instrument(skip(db, catalog))]
pub async fn seed_products(db: &DatabaseConnection, catalog: &Catalog) -> Result<usize> {
    let existing = Product::find().count(db).await?;
    if existing > 0 {
        info!(existing, "Products already present, skipping catalog seed");
        return Ok(0);
    }

    for seed in &catalog.products {
        create_product(
            db,
            NewProduct {
                name: seed.name.clone(),
                description: seed.description.clone(),
                price: seed.price,
                image_url: seed.image_url.clone(),
            },
        )
        .await?;
    }

    info!(count = catalog.products.len(), "Seeded product catalog");
    Ok(catalog.products.len())
}
