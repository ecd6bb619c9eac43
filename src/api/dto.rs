//! Data Transfer Objects for the HTTP API.
//!
//! Field names are camelCase on the wire and money is a decimal number of euros.

use crate::{
    core::{
        cart::ProductRef,
        money::Money,
        order::{OrderDetails, OrderStatus, PlacedOrder},
        product::{NewProduct, ProductUpdate},
        submission::OrderReceipt,
    },
    entities::{order, order_item, product},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Products
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    /// Database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Unit price
    pub price: Money,
    /// Optional image path or URL
    pub image_url: Option<String>,
    /// When the product was created
    pub created_at: DateTime<Utc>,
    /// When the product was last modified
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: Money::from_cents(model.price_cents),
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&ProductResponse> for ProductRef {
    fn from(product: &ProductResponse) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
        }
    }
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Display name, trimmed and non-empty
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price, not negative
    pub price: Money,
    /// Optional image path or URL
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
            image_url: request.image_url,
        }
    }
}

/// Body of `PATCH /api/products/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// New display name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New unit price
    #[serde(default)]
    pub price: Option<Money>,
    /// New image path or URL
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
            image_url: request.image_url,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    /// Database ID
    pub id: i64,
    /// Store the order is for
    pub store_name: String,
    /// Person who placed the order
    pub customer_name: Option<String>,
    /// Requested delivery day
    pub delivery_date: NaiveDate,
    /// Total including VAT
    pub total_amount: Money,
    /// VAT included in the total
    pub vat_amount: Money,
    /// Lifecycle status, e.g. `pending`
    pub status: String,
    /// When the order was placed
    pub created_at: DateTime<Utc>,
    /// When the order was last modified
    pub updated_at: DateTime<Utc>,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            store_name: model.store_name,
            customer_name: model.customer_name,
            delivery_date: model.delivery_date,
            total_amount: Money::from_cents(model.total_cents),
            vat_amount: Money::from_cents(model.vat_cents),
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&OrderResponse> for OrderReceipt {
    fn from(order: &OrderResponse) -> Self {
        Self {
            order_id: order.id,
            total_amount: order.total_amount,
            vat_amount: order.vat_amount,
        }
    }
}

/// One order line, with its product when it was joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    /// Database ID
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Product ordered
    pub product_id: i64,
    /// Units ordered
    pub quantity: i32,
    /// Unit price when the order was placed
    pub unit_price: Money,
    /// `unit_price` × `quantity`
    pub subtotal: Money,
    /// The product, on `GET /api/orders/{id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductResponse>,
}

impl OrderItemResponse {
    fn new(model: order_item::Model, product: Option<product::Model>) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: Money::from_cents(model.unit_price_cents),
            subtotal: Money::from_cents(model.subtotal_cents),
            product: product.map(ProductResponse::from),
        }
    }
}

/// An order header with its lines, as `{order, items}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItemsResponse {
    /// Order header
    pub order: OrderResponse,
    /// Order lines
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderDetails> for OrderWithItemsResponse {
    fn from(details: OrderDetails) -> Self {
        Self {
            order: details.order.into(),
            items: details
                .items
                .into_iter()
                .map(|(item, product)| OrderItemResponse::new(item, Some(product)))
                .collect(),
        }
    }
}

impl From<PlacedOrder> for OrderWithItemsResponse {
    fn from(placed: PlacedOrder) -> Self {
        Self {
            order: placed.order.into(),
            items: placed
                .items
                .into_iter()
                .map(|item| OrderItemResponse::new(item, None))
                .collect(),
        }
    }
}

/// Body of `PATCH /api/orders/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    /// Target status
    pub status: OrderStatus,
}

// =============================================================================
// Health
// =============================================================================

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy`
    pub status: String,
    /// Crate version
    pub version: String,
}
