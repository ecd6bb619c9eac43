//! Order submission - the seam between a draft and whatever stores the order.
//!
//! [`OrderGateway`] is what an [`OrderDraft`](crate::core::draft::OrderDraft) submits
//! through. [`OrderService`] is the in-process implementation used by the HTTP
//! handlers: it persists the order and then sends the notification email, logging and
//! swallowing any delivery failure. The HTTP client in `api::client` implements the
//! same trait against a remote server.

use crate::{
    config::settings::NotificationSettings,
    core::{
        money::Money,
        notification::{Notifier, compose_order_email},
        order::{NewOrder, PlacedOrder, get_order_with_items, place_order},
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{error, info, instrument, warn};

/// What a client learns back from a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Id of the stored order
    pub order_id: i64,
    /// Stored grand total
    pub total_amount: Money,
    /// Stored VAT
    pub vat_amount: Money,
}

impl From<&PlacedOrder> for OrderReceipt {
    fn from(placed: &PlacedOrder) -> Self {
        Self {
            order_id: placed.order.id,
            total_amount: Money::from_cents(placed.order.total_cents),
            vat_amount: Money::from_cents(placed.order.vat_cents),
        }
    }
}

/// Accepts order submissions.
pub trait OrderGateway {
    /// Stores `order`, validating it against `today`.
    fn submit_order(
        &self,
        order: &NewOrder,
        today: NaiveDate,
    ) -> impl Future<Output = Result<OrderReceipt>> + Send;
}

/// Persists orders and notifies the bakery.
#[derive(Debug, Clone)]
pub struct OrderService<N> {
    db: DatabaseConnection,
    notifier: N,
    notification: NotificationSettings,
}

impl<N: Notifier> OrderService<N> {
    /// Creates a service over a database connection and a notifier.
    pub const fn new(
        db: DatabaseConnection,
        notifier: N,
        notification: NotificationSettings,
    ) -> Self {
        Self {
            db,
            notifier,
            notification,
        }
    }

    /// Places the order, then attempts the notification.
    ///
    /// # Errors
    /// Returns validation or database errors from [`place_order`]. Notification
    /// failures are logged and never returned.
    #[instrument(skip_all, fields(store = %order.store_name))]
    pub async fn place(&self, order: &NewOrder, today: NaiveDate) -> Result<PlacedOrder> {
        let placed = place_order(&self.db, order, today)
            .await
            .inspect_err(|e| {
                if e.is_validation() {
                    warn!("Order rejected: {e}");
                } else {
                    error!("Failed to create order: {e}");
                }
            })?;

        self.notify(placed.order.id).await;
        Ok(placed)
    }

    async fn notify(&self, order_id: i64) {
        let details = match get_order_with_items(&self.db, order_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                warn!(order_id, "Order vanished before the confirmation email");
                return;
            }
            Err(e) => {
                error!(order_id, "Failed to load order for confirmation email: {e}");
                return;
            }
        };

        let email = compose_order_email(&details, &self.notification);
        match self.notifier.send(&email).await {
            Ok(()) => info!(order_id, "Order confirmation email handled"),
            Err(e) => error!(order_id, "Failed to send order confirmation email: {e}"),
        }
    }
}

impl<N: Notifier> OrderGateway for OrderService<N> {
    async fn submit_order(&self, order: &NewOrder, today: NaiveDate) -> Result<OrderReceipt> {
        self.place(order, today)
            .await
            .map(|placed| OrderReceipt::from(&placed))
    }
}
