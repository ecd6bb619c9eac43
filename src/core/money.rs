//! Money arithmetic - amounts in integer minor units (euro cents).
//!
//! Every price, subtotal, VAT and total in the system is a [`Money`]. The cart and the
//! order service both derive their totals from [`Totals::from_subtotal`], so the numbers a
//! store sees before submitting are the numbers the server recomputes and persists.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, Sub},
};

/// VAT (IVA) applied to every order subtotal, in percent.
pub const VAT_RATE_PERCENT: i64 = 10;

/// A currency amount stored as a whole number of cents.
///
/// On the wire it is a JSON number with at most two decimals (`3.5`, `19.25`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Zero euros.
    pub const ZERO: Self = Self { cents: 0 };

    /// Builds an amount from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.cents
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.cents < 0
    }

    /// Converts a decimal amount, rejecting anything finer than a cent.
    pub fn from_decimal(amount: Decimal) -> Result<Self> {
        if amount.normalize().scale() > 2 {
            return Err(Error::InvalidAmount {
                amount: amount.to_string(),
            });
        }

        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self::from_cents)
            .ok_or_else(|| Error::InvalidAmount {
                amount: amount.to_string(),
            })
    }

    /// The amount as a two-decimal [`Decimal`].
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self::from_cents(self.cents.saturating_mul(quantity as i64))
    }

    /// VAT due on this amount, rounded half away from zero to the cent.
    #[must_use]
    pub fn vat(self) -> Self {
        let exact = self.to_decimal() * Decimal::new(VAT_RATE_PERCENT, 2);
        let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        // Rounded to two places, so the mantissa times 100 always fits back in cents.
        Self::from_cents((rounded * Decimal::ONE_HUNDRED).to_i64().unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_cents(self.cents.saturating_sub(rhs.cents))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.to_decimal()
    }
}

/// Subtotal, VAT and grand total of a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of all line subtotals
    pub subtotal: Money,
    /// `subtotal` × [`VAT_RATE_PERCENT`]
    pub vat: Money,
    /// `subtotal` + `vat`
    pub total: Money,
}

impl Totals {
    /// Derives VAT and total from a subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Money) -> Self {
        let vat = subtotal.vat();
        Self {
            subtotal,
            vat,
            total: subtotal + vat,
        }
    }

    /// Totals over a sequence of line subtotals.
    pub fn of_lines<I: IntoIterator<Item = Money>>(line_subtotals: I) -> Self {
        Self::from_subtotal(line_subtotals.into_iter().sum())
    }
}
