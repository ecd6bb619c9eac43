//! Cart aggregation - the in-memory product lines of a draft order.
//!
//! A [`Cart`] holds at most one [`CartLine`] per product. Adding a product that is
//! already present merges into the existing line and keeps the unit price captured
//! when the line was first created. Totals are derived on demand through
//! [`Totals`], the same arithmetic the order service uses when it validates a
//! submitted order.

use crate::core::money::{Money, Totals};
use crate::entities::product;
use serde::Serialize;

/// The product facts a cart needs: identity, label and current unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    /// Product id
    pub id: i64,
    /// Display name, used in summaries
    pub name: String,
    /// Current catalog price
    pub unit_price: Money,
}

impl From<&product::Model> for ProductRef {
    fn from(model: &product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            unit_price: Money::from_cents(model.price_cents),
        }
    }
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The product this line is for
    pub product: ProductRef,
    /// Units requested
    pub quantity: u32,
    /// Price snapshot taken when the line was created
    pub unit_price: Money,
    /// `quantity * unit_price`
    pub subtotal: Money,
}

impl CartLine {
    fn new(product: ProductRef, quantity: u32) -> Self {
        let unit_price = product.unit_price;
        Self {
            product,
            quantity,
            unit_price,
            subtotal: unit_price.times(quantity),
        }
    }

    /// Id of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> i64 {
        self.product.id
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.subtotal = self.unit_price.times(quantity);
    }
}

/// Ordered collection of cart lines, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Adds `quantity` units of `product`.
    ///
    /// Merges into the existing line for the product if there is one. A zero
    /// quantity is ignored.
    pub fn add_line(&mut self, product: impl Into<ProductRef>, quantity: u32) {
        if quantity == 0 {
            return;
        }

        let product = product.into();
        if let Some(line) = self.line_mut(product.id) {
            let merged = line.quantity.saturating_add(quantity);
            line.set_quantity(merged);
        } else {
            self.lines.push(CartLine::new(product, quantity));
        }
    }

    /// Replaces the quantity of the line for `product_id`, if present.
    pub fn set_line_quantity(&mut self, product_id: i64, quantity: u32) {
        if let Some(line) = self.line_mut(product_id) {
            line.set_quantity(quantity);
        }
    }

    /// Removes the line for `product_id`, if present.
    pub fn remove_line(&mut self, product_id: i64) {
        self.lines.retain(|line| line.product_id() != product_id);
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The line for `product_id`.
    #[must_use]
    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    fn line_mut(&mut self, product_id: i64) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// VAT on the subtotal.
    #[must_use]
    pub fn tax(&self) -> Money {
        self.totals().vat
    }

    /// Subtotal plus VAT.
    #[must_use]
    pub fn total(&self) -> Money {
        self.totals().total
    }

    /// Subtotal, VAT and total together.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::from_subtotal(self.subtotal())
    }
}
