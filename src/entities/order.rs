//! Order entity - A submitted bakery order header.
//!
//! Holds the customer snapshot (`store_name`, `customer_name`, `delivery_date`), the
//! computed `total_cents` and `vat_cents`, and the lifecycle `status`
//! (`"pending"`, `"confirmed"`, `"completed"` or `"cancelled"`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the store placing the order
    pub store_name: String,
    /// Person who placed the order, if given
    pub customer_name: Option<String>,
    /// Requested delivery day
    pub delivery_date: Date,
    /// Grand total (subtotal + VAT) in cents
    pub total_cents: i64,
    /// VAT portion of the total in cents
    pub vat_cents: i64,
    /// Lifecycle status, see `core::order::OrderStatus`
    pub status: String,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
