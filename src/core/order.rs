//! Order business logic - validation, persistence and lifecycle of submitted orders.
//!
//! An incoming [`NewOrder`] is checked completely before anything is written: customer
//! fields, at least one line, positive quantities, line subtotals, and the client's
//! totals against totals recomputed with [`Totals`]. The header row is then inserted,
//! followed by one insert per line. The inserts are independent statements, so a
//! failure part-way leaves the header and earlier lines in place and is reported to
//! the caller, who may resubmit.

use crate::{
    core::{
        customer::{
            deserialize_delivery_date, normalize_customer_name, validate_delivery_date,
            validate_store_name,
        },
        money::{Money, Totals},
    },
    entities::{Order, OrderItem, Product, order, order_item, product},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};
use tracing::{debug, info, instrument};

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Just submitted
    Pending,
    /// Accepted by the bakery
    Confirmed,
    /// Delivered
    Completed,
    /// Withdrawn
    Cancelled,
}

impl OrderStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an order in this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Completed | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::validation(
                "status",
                format!("Unknown order status '{other}'"),
            )),
        }
    }
}

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    /// Ordered product
    pub product_id: i64,
    /// Units, must be positive
    pub quantity: u32,
    /// Unit price snapshot
    pub unit_price: Money,
    /// Must equal `quantity * unit_price`
    pub subtotal: Money,
}

/// An order submission as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Ordering store
    pub store_name: String,
    /// Person placing the order
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Requested delivery day
    #[serde(deserialize_with = "deserialize_delivery_date")]
    pub delivery_date: NaiveDate,
    /// Client-computed grand total
    pub total_amount: Money,
    /// Client-computed VAT
    pub vat_amount: Money,
    /// Order lines
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

/// A freshly persisted order and its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    /// Header row
    pub order: order::Model,
    /// Line rows, in submission order
    pub items: Vec<order_item::Model>,
}

/// A stored order with each line joined to its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    /// Header row
    pub order: order::Model,
    /// Lines with their products
    pub items: Vec<(order_item::Model, product::Model)>,
}

impl OrderDetails {
    /// Subtotal, VAT and total as stored on the header.
    #[must_use]
    pub const fn totals(&self) -> Totals {
        stored_totals(&self.order)
    }
}

/// Totals recorded on an order header.
#[must_use]
pub const fn stored_totals(order: &order::Model) -> Totals {
    let total = Money::from_cents(order.total_cents);
    let vat = Money::from_cents(order.vat_cents);
    Totals {
        subtotal: Money::from_cents(order.total_cents - order.vat_cents),
        vat,
        total,
    }
}

/// Checks a submission without touching the database and returns the recomputed totals.
///
/// # Errors
/// Returns [`Error::EmptyCart`] for an order with no lines, or a validation error naming
/// the first offending field.
pub fn validate_new_order(new: &NewOrder, today: NaiveDate) -> Result<Totals> {
    validate_store_name(&new.store_name)?;
    validate_delivery_date(new.delivery_date, today)?;

    if new.items.is_empty() {
        return Err(Error::EmptyCart);
    }

    let mut seen = HashSet::with_capacity(new.items.len());
    for (index, item) in new.items.iter().enumerate() {
        if !seen.insert(item.product_id) {
            return Err(Error::validation(
                format!("items[{index}].productId"),
                format!("Product {} appears more than once", item.product_id),
            ));
        }
        if item.quantity == 0 || i32::try_from(item.quantity).is_err() {
            return Err(Error::validation(
                format!("items[{index}].quantity"),
                format!("Quantity must be between 1 and {}", i32::MAX),
            ));
        }
        if item.unit_price.is_negative() {
            return Err(Error::InvalidAmount {
                amount: item.unit_price.to_string(),
            });
        }
        let expected = item.unit_price.times(item.quantity);
        if item.subtotal != expected {
            return Err(Error::validation(
                format!("items[{index}].subtotal"),
                format!("Expected {expected}, got {}", item.subtotal),
            ));
        }
    }

    let totals = Totals::of_lines(new.items.iter().map(|item| item.subtotal));
    if new.vat_amount != totals.vat {
        return Err(Error::validation(
            "vatAmount",
            format!("Expected {}, got {}", totals.vat, new.vat_amount),
        ));
    }
    if new.total_amount != totals.total {
        return Err(Error::validation(
            "totalAmount",
            format!("Expected {}, got {}", totals.total, new.total_amount),
        ));
    }

    Ok(totals)
}

async fn ensure_products_exist(db: &DatabaseConnection, items: &[NewOrderItem]) -> Result<()> {
    let ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    let found: HashSet<i64> = Product::find()
        .filter(product::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|product| product.id)
        .collect();

    if let Some(missing) = ids.into_iter().find(|id| !found.contains(id)) {
        return Err(Error::validation(
            "items",
            format!("Product {missing} does not exist"),
        ));
    }
    Ok(())
}

/// Validates and persists an order: header first, then one insert per line.
///
/// # Errors
/// Returns a validation error before any write if the submission is invalid, or a
/// database error if an insert fails.
#[instrument(skip(db, new), fields(store = %new.store_name, lines = new.items.len()))]
pub async fn place_order(
    db: &DatabaseConnection,
    new: &NewOrder,
    today: NaiveDate,
) -> Result<PlacedOrder> {
    let totals = validate_new_order(new, today)?;
    ensure_products_exist(db, &new.items).await?;

    let now = chrono::Utc::now();
    let header = order::ActiveModel {
        store_name: Set(new.store_name.trim().to_string()),
        customer_name: Set(normalize_customer_name(new.customer_name.as_deref())),
        delivery_date: Set(new.delivery_date),
        total_cents: Set(totals.total.cents()),
        vat_cents: Set(totals.vat.cents()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(order_id = header.id, "Order header stored");

    let mut items = Vec::with_capacity(new.items.len());
    for item in &new.items {
        let stored = order_item::ActiveModel {
            order_id: Set(header.id),
            product_id: Set(item.product_id),
            quantity: Set(i32::try_from(item.quantity).unwrap_or(i32::MAX)),
            unit_price_cents: Set(item.unit_price.cents()),
            subtotal_cents: Set(item.subtotal.cents()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        items.push(stored);
    }

    info!(
        order_id = header.id,
        total = %totals.total,
        "Order placed"
    );
    Ok(PlacedOrder {
        order: header,
        items,
    })
}

/// Retrieves an order header by id.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Retrieves all orders, newest first.
pub async fn list_orders(db: &DatabaseConnection) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an order with its lines and each line's product.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if a line references a product that no longer exists.
pub async fn get_order_with_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<OrderDetails>> {
    let Some(order) = get_order(db, order_id).await? else {
        return Ok(None);
    };

    let rows = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    let items = rows
        .into_iter()
        .map(|(item, product)| match product {
            Some(product) => Ok((item, product)),
            None => Err(Error::ProductNotFound {
                id: item.product_id,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(OrderDetails { order, items }))
}

/// Moves an order to a new lifecycle status.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] for an unknown id and
/// [`Error::InvalidStatusTransition`] when the move is not allowed.
#[instrument(skip(db))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    next: OrderStatus,
) -> Result<order::Model> {
    let current = get_order(db, order_id)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let status: OrderStatus = current.status.parse()?;
    if !status.can_transition_to(next) {
        return Err(Error::InvalidStatusTransition {
            from: status.to_string(),
            to: next.to_string(),
        });
    }

    let mut active: order::ActiveModel = current.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(db).await?;
    info!(order_id, from = %status, to = %next, "Order status changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_status_transitions() {
        use OrderStatus::{Cancelled, Completed, Confirmed, Pending};

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_validate_new_order_accepts_consistent_totals() {
        let order = new_order_for(&[(1, 350, 5), (2, 120, 2)]);
        let totals = validate_new_order(&order, test_today()).unwrap();
        assert_eq!(totals.subtotal, Money::from_cents(1990));
        assert_eq!(totals.vat, Money::from_cents(199));
        assert_eq!(totals.total, Money::from_cents(2189));
    }

    #[test]
    fn test_validate_new_order_rejects_empty_items() {
        let order = new_order_for(&[]);
        assert!(matches!(
            validate_new_order(&order, test_today()),
            Err(Error::EmptyCart)
        ));
    }

    #[test]
    fn test_validate_new_order_rejects_wrong_totals() {
        let mut order = new_order_for(&[(1, 350, 2)]);
        order.total_amount = Money::from_cents(700);
        assert!(matches!(
            validate_new_order(&order, test_today()),
            Err(Error::Validation { ref field, .. }) if field == "totalAmount"
        ));

        let mut order = new_order_for(&[(1, 350, 2)]);
        order.vat_amount = Money::from_cents(0);
        assert!(matches!(
            validate_new_order(&order, test_today()),
            Err(Error::Validation { ref field, .. }) if field == "vatAmount"
        ));
    }

    #[test]
    fn test_validate_new_order_rejects_bad_lines() {
        let mut order = new_order_for(&[(1, 350, 2)]);
        order.items[0].subtotal = Money::from_cents(800);
        assert!(validate_new_order(&order, test_today()).is_err());

        let order = new_order_for(&[(1, 350, 0)]);
        assert!(matches!(
            validate_new_order(&order, test_today()),
            Err(Error::Validation { ref field, .. }) if field == "items[0].quantity"
        ));

        let order = new_order_for(&[(1, 350, 1), (1, 350, 1)]);
        assert!(validate_new_order(&order, test_today()).is_err());
    }

    #[test]
    fn test_validate_new_order_rejects_customer_fields() {
        let mut order = new_order_for(&[(1, 350, 1)]);
        order.store_name = "X".to_string();
        assert!(validate_new_order(&order, test_today()).is_err());

        let mut order = new_order_for(&[(1, 350, 1)]);
        order.delivery_date = test_today().pred_opt().unwrap();
        assert!(validate_new_order(&order, test_today()).is_err());
    }

    #[tokio::test]
    async fn test_place_order_validation_happens_before_any_query() -> Result<()> {
        let db = setup_empty_db().await?;

        let result = place_order(&db, &new_order_for(&[]), test_today()).await;
        assert!(matches!(result, Err(Error::EmptyCart)));

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_persists_header_and_items() -> Result<()> {
        let (db, pane, cornetto) = setup_with_products().await?;

        let new = new_order_for(&[
            (pane.id, pane.price_cents, 5),
            (cornetto.id, cornetto.price_cents, 3),
        ]);
        let placed = place_order(&db, &new, test_today()).await?;

        assert_eq!(placed.order.status, "pending");
        assert_eq!(placed.order.total_cents, new.total_amount.cents());
        assert_eq!(placed.order.vat_cents, new.vat_amount.cents());
        assert_eq!(placed.items.len(), 2);
        assert_eq!(placed.items[0].order_id, placed.order.id);
        assert_eq!(placed.items[0].quantity, 5);
        assert_eq!(placed.items[1].subtotal_cents, 360);

        assert_eq!(count_orders(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_normalizes_customer_fields() -> Result<()> {
        let (db, pane, _) = setup_with_products().await?;

        let mut new = new_order_for(&[(pane.id, pane.price_cents, 1)]);
        new.store_name = "  Forno Rossi  ".to_string();
        new.customer_name = Some("   ".to_string());

        let placed = place_order(&db, &new, test_today()).await?;
        assert_eq!(placed.order.store_name, "Forno Rossi");
        assert!(placed.order.customer_name.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_rejects_unknown_product() -> Result<()> {
        let (db, pane, _) = setup_with_products().await?;

        let new = new_order_for(&[(pane.id, pane.price_cents, 1), (999, 100, 1)]);
        let result = place_order(&db, &new, test_today()).await;
        assert!(matches!(result, Err(Error::Validation { ref field, .. }) if field == "items"));

        // Nothing was written
        assert_eq!(count_orders(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_order_with_items_round_trip() -> Result<()> {
        let (db, pane, cornetto) = setup_with_products().await?;

        let new = new_order_for(&[
            (pane.id, pane.price_cents, 2),
            (cornetto.id, cornetto.price_cents, 4),
        ]);
        let placed = place_order(&db, &new, test_today()).await?;

        let details = get_order_with_items(&db, placed.order.id).await?.unwrap();
        assert_eq!(details.order, placed.order);
        assert_eq!(details.totals().total, new.total_amount);
        assert_eq!(details.totals().vat, new.vat_amount);

        let items: Vec<_> = details.items.iter().map(|(item, _)| item.clone()).collect();
        assert_eq!(items, placed.items);
        assert_eq!(details.items[0].1.name, pane.name);
        assert_eq!(details.items[1].1.name, cornetto.name);

        assert!(get_order_with_items(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() -> Result<()> {
        let (db, pane, _) = setup_with_products().await?;

        let first = new_order_for(&[(pane.id, pane.price_cents, 1)]);
        let first = place_order(&db, &first, test_today()).await?;
        let second = new_order_for(&[(pane.id, pane.price_cents, 2)]);
        let second = place_order(&db, &second, test_today()).await?;

        let orders = list_orders(&db).await?;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.order.id);
        assert_eq!(orders[1].id, first.order.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_order_status() -> Result<()> {
        let (db, pane, _) = setup_with_products().await?;
        let new = new_order_for(&[(pane.id, pane.price_cents, 1)]);
        let placed = place_order(&db, &new, test_today()).await?;

        let confirmed = update_order_status(&db, placed.order.id, OrderStatus::Confirmed).await?;
        assert_eq!(confirmed.status, "confirmed");

        let result = update_order_status(&db, placed.order.id, OrderStatus::Pending).await;
        assert!(matches!(result, Err(Error::InvalidStatusTransition { .. })));

        let result = update_order_status(&db, 999, OrderStatus::Cancelled).await;
        assert!(matches!(result, Err(Error::OrderNotFound { id: 999 })));
        Ok(())
    }

    #[test]
    fn test_new_order_deserializes_client_payload() {
        let json = r#"{
            "storeName": "Forno Rossi",
            "customerName": null,
            "deliveryDate": "2026-10-20T00:00:00.000Z",
            "totalAmount": 19.25,
            "vatAmount": 1.75,
            "items": [{"productId": 1, "quantity": 5, "unitPrice": 3.5, "subtotal": 17.5}]
        }"#;

        let order: NewOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.delivery_date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert_eq!(order.total_amount, Money::from_cents(1925));
        assert_eq!(order.items[0].subtotal, Money::from_cents(1750));
        assert!(order.customer_name.is_none());
    }
}
