//! Client-side order draft: customer details plus a cart, submitted through an
//! [`OrderGateway`].

use crate::{
    core::{
        cart::Cart,
        customer::CustomerInfo,
        order::{NewOrder, NewOrderItem, validate_new_order},
        submission::{OrderGateway, OrderReceipt},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

/// Where a draft is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// Still being edited
    Draft,
    /// Accepted by the gateway
    Submitted(OrderReceipt),
}

/// An order being put together before submission.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    customer: CustomerInfo,
    cart: Cart,
    state: DraftState,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderDraft {
    /// A blank draft with an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            customer: CustomerInfo {
                store_name: String::new(),
                customer_name: None,
                delivery_date: None,
            },
            cart: Cart::new(),
            state: DraftState::Draft,
        }
    }

    /// Current customer details.
    #[must_use]
    pub const fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Replaces the customer details. Editing a submitted draft starts a new one.
    pub fn set_customer_info(&mut self, customer: CustomerInfo) {
        self.customer = customer;
        self.state = DraftState::Draft;
    }

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable access to the cart. Editing a submitted draft starts a new one.
    pub fn cart_mut(&mut self) -> &mut Cart {
        self.state = DraftState::Draft;
        &mut self.cart
    }

    /// Clears customer details and cart.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DraftState {
        self.state
    }

    /// Whether the last submission succeeded and nothing changed since.
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self.state, DraftState::Submitted(_))
    }

    /// Builds the submission payload, checking it the same way the server will.
    ///
    /// Lines whose quantity was set to zero are left out.
    ///
    /// # Errors
    /// Returns a validation error for bad customer details, or [`Error::EmptyCart`]
    /// when no line has a positive quantity.
    pub fn to_new_order(&self, today: NaiveDate) -> Result<NewOrder> {
        let delivery_date = self.customer.validate(today)?;

        let items: Vec<NewOrderItem> = self
            .cart
            .lines()
            .iter()
            .filter(|line| line.quantity > 0)
            .map(|line| NewOrderItem {
                product_id: line.product_id(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            })
            .collect();
        if items.is_empty() {
            return Err(Error::EmptyCart);
        }

        let totals = self.cart.totals();
        let new = NewOrder {
            store_name: self.customer.store_name.trim().to_string(),
            customer_name: self.customer.customer_name.clone(),
            delivery_date,
            total_amount: totals.total,
            vat_amount: totals.vat,
            items,
        };
        validate_new_order(&new, today)?;
        Ok(new)
    }

    /// Submits the draft.
    ///
    /// Nothing reaches the gateway if local validation fails. On success the cart is
    /// emptied and the receipt recorded; on failure the draft is left as it was.
    ///
    /// # Errors
    /// Returns local validation errors or whatever the gateway reports.
    #[instrument(skip_all, fields(store = %self.customer.store_name))]
    pub async fn submit<G: OrderGateway>(
        &mut self,
        gateway: &G,
        today: NaiveDate,
    ) -> Result<OrderReceipt> {
        let new = self.to_new_order(today)?;

        let receipt = gateway
            .submit_order(&new, today)
            .await
            .inspect_err(|e| warn!("Order submission failed: {e}"))?;

        self.cart.clear();
        self.state = DraftState::Submitted(receipt);
        info!(order_id = receipt.order_id, "Order submitted");
        Ok(receipt)
    }
}
