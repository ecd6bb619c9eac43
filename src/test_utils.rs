//! Shared test utilities for the order service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating products and order submissions with sensible defaults.

use crate::{
    config::settings::NotificationSettings,
    core::{
        money::{Money, Totals},
        order::{NewOrder, NewOrderItem},
        product::{self, NewProduct},
    },
    entities,
    errors::Result,
};
use chrono::{Days, NaiveDate};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Connects an in-memory `SQLite` database without creating any tables.
/// Every query against it fails, so a passing call proves nothing was queried.
pub async fn setup_empty_db() -> Result<DatabaseConnection> {
    Ok(sea_orm::Database::connect("sqlite::memory:").await?)
}

/// Number of stored orders.
pub async fn count_orders(db: &DatabaseConnection) -> Result<u64> {
    Ok(entities::Order::find().count(db).await?)
}

/// The fixed "today" used by date validation in tests.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap_or_default()
}

/// Notification settings with no API key, so delivery only logs.
pub fn test_notification_settings() -> NotificationSettings {
    NotificationSettings {
        to: "orders@bakery.com".to_string(),
        from: "noreply@bakeryapp.com".to_string(),
        sendgrid_api_key: None,
    }
}

/// Product input with no description or image.
pub fn new_product(name: &str, price_cents: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price: Money::from_cents(price_cents),
        image_url: None,
    }
}

/// Creates a test product with the given price in cents.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price_cents: i64,
) -> Result<entities::product::Model> {
    product::create_product(db, new_product(name, price_cents)).await
}

/// Builds a consistent order submission from `(product_id, unit_cents, quantity)` lines.
///
/// # Defaults
/// * `store_name`: `"Forno Rossi"`
/// * `customer_name`: None
/// * `delivery_date`: the day after [`test_today`]
pub fn new_order_for(lines: &[(i64, i64, u32)]) -> NewOrder {
    let items: Vec<NewOrderItem> = lines
        .iter()
        .map(|&(product_id, unit_cents, quantity)| {
            let unit_price = Money::from_cents(unit_cents);
            NewOrderItem {
                product_id,
                quantity,
                unit_price,
                subtotal: unit_price.times(quantity),
            }
        })
        .collect();
    let totals = Totals::of_lines(items.iter().map(|item| item.subtotal));

    NewOrder {
        store_name: "Forno Rossi".to_string(),
        customer_name: None,
        delivery_date: test_today() + Days::new(1),
        total_amount: totals.total,
        vat_amount: totals.vat,
        items,
    }
}

/// Sets up a database with two products.
/// Returns (db, "Pane Casereccio" at 3.50, "Cornetto Vuoto" at 1.20).
pub async fn setup_with_products() -> Result<(
    DatabaseConnection,
    entities::product::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let pane = create_test_product(&db, "Pane Casereccio", 350).await?;
    let cornetto = create_test_product(&db, "Cornetto Vuoto", 120).await?;
    Ok((db, pane, cornetto))
}
