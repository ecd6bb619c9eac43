//! Core module - framework-agnostic ordering logic.
//! Everything here works on a `DatabaseConnection` or on plain values, so the HTTP layer
//! and the tests drive the same code.

pub mod cart;
pub mod customer;
pub mod draft;
pub mod money;
pub mod notification;
pub mod order;
pub mod product;
pub mod submission;

pub use cart::{Cart, CartLine, ProductRef};
pub use customer::CustomerInfo;
pub use draft::{DraftState, OrderDraft};
pub use money::{Money, Totals};
pub use order::{NewOrder, NewOrderItem, OrderStatus};
pub use submission::{OrderGateway, OrderReceipt, OrderService};
