//! Product record definitions
//!
//! One `ProductRecord` is produced per product card found on the listing
//! page. Records are built once by the extractor and never mutated.

use serde::{Deserialize, Serialize};

/// Placeholder for a required text field whose element was not found
pub const NOT_AVAILABLE: &str = "N/A";

/// A single extracted listing item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// 1-based position on the page
    pub id: usize,

    /// Display name, or [`NOT_AVAILABLE`]
    pub name: String,

    /// Price as displayed (currency-formatted, unparsed), or [`NOT_AVAILABLE`]
    pub price: String,

    /// Pre-discount price as displayed
    pub original_price: Option<String>,

    /// Discount label as displayed
    pub discount: Option<String>,

    /// Absolute image URL
    pub image: Option<String>,

    /// Absolute product detail URL
    pub link: Option<String>,

    /// Aggregate rating as displayed
    pub rating: Option<String>,
}

impl ProductRecord {
    /// Returns true if the name could not be extracted
    pub fn is_missing_name(&self) -> bool {
        self.name == NOT_AVAILABLE
    }

    /// Returns true if the price could not be extracted
    pub fn is_missing_price(&self) -> bool {
        self.price == NOT_AVAILABLE
    }
}
