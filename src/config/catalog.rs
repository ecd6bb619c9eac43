//! Seed catalog loading from catalog.toml
//!
//! The products listed in catalog.toml are inserted on startup when the
//! products table is still empty, so a fresh install has something to order.

use crate::core::money::Money;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Products to seed
    pub products: Vec<ProductSeed>,
}

/// A single product entry in the seed catalog
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in euros, e.g. `3.50`
    pub price: Money,
    /// Optional image path
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Loads the seed catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A price has more than two decimals
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    parse_catalog(&contents)
}

/// Parses catalog TOML already held in memory.
pub fn parse_catalog(contents: &str) -> Result<Catalog> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog.toml: {e}"),
    })
}
