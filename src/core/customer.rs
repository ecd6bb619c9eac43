//! Customer information collected in the first step of an order.
//!
//! The same rules apply in the draft (before anything is sent) and in the order
//! service (before anything is persisted): a store name of at least two characters
//! and a delivery day that is not before today.

use crate::errors::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Minimum length of a store name, in characters, after trimming.
pub const MIN_STORE_NAME_LEN: usize = 2;

/// Who is ordering and when the delivery is wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    /// Name of the store, required
    pub store_name: String,
    /// Person placing the order
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Requested delivery day, required before submission
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
}

impl CustomerInfo {
    /// Customer info with all required fields set.
    pub fn new(store_name: impl Into<String>, delivery_date: NaiveDate) -> Self {
        Self {
            store_name: store_name.into(),
            customer_name: None,
            delivery_date: Some(delivery_date),
        }
    }

    /// Sets the optional orderer name.
    #[must_use]
    pub fn with_customer_name(mut self, customer_name: impl Into<String>) -> Self {
        self.customer_name = Some(customer_name.into());
        self
    }

    /// Checks the fields against `today` and returns the delivery date.
    ///
    /// # Errors
    /// Returns a validation error naming the first offending field.
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate> {
        validate_store_name(&self.store_name)?;
        let delivery_date = self
            .delivery_date
            .ok_or_else(|| Error::validation("deliveryDate", "Delivery date is required"))?;
        validate_delivery_date(delivery_date, today)?;
        Ok(delivery_date)
    }
}

/// Store names must have at least [`MIN_STORE_NAME_LEN`] characters.
pub fn validate_store_name(store_name: &str) -> Result<()> {
    if store_name.trim().chars().count() < MIN_STORE_NAME_LEN {
        return Err(Error::validation(
            "storeName",
            "Store name must be at least 2 characters",
        ));
    }
    Ok(())
}

/// Delivery can be today or later.
pub fn validate_delivery_date(delivery_date: NaiveDate, today: NaiveDate) -> Result<()> {
    if delivery_date < today {
        return Err(Error::validation(
            "deliveryDate",
            format!("Delivery date {delivery_date} is in the past"),
        ));
    }
    Ok(())
}

/// Trims an optional name and drops it when blank.
#[must_use]
pub fn normalize_customer_name(customer_name: Option<&str>) -> Option<String> {
    customer_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
}

/// Deserializes a delivery day from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Browsers send the picked day as a UTC timestamp; see [`parse_delivery_date`].
pub fn deserialize_delivery_date<'de, D>(
    deserializer: D,
) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_delivery_date(&raw).map_err(serde::de::Error::custom)
}

/// Parses a delivery day from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are read in the server's local timezone, the same one delivery dates are
/// checked against.
pub fn parse_delivery_date(raw: &str) -> Result<NaiveDate> {
    parse_delivery_date_in(raw, &Local)
}

/// Parses a delivery day, taking the calendar date of a timestamp in `tz`.
///
/// Midnight of 20 October in Rome arrives as `2026-10-19T22:00:00.000Z` and is the 20th.
pub fn parse_delivery_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| {
            DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(tz).date_naive())
        })
        .map_err(|_| Error::validation("deliveryDate", format!("'{raw}' is not a date")))
}
