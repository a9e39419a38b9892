use crate::model::product::ProductRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The JSON body POSTed to the webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEnvelope {
    /// When the envelope was built
    pub timestamp: DateTime<Utc>,

    /// Origin site tag
    pub source: String,

    /// Listing tag
    pub category: String,

    /// Always equal to `products.len()`
    pub total_products: usize,

    /// Records in page order
    pub products: Vec<ProductRecord>,

    pub metadata: EnvelopeMetadata,
}

/// Provenance fields carried alongside the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    pub scraper_version: String,

    /// When the run that produced the batch started
    pub execution_time: DateTime<Utc>,
}

impl DeliveryEnvelope {
    /// Wraps a batch of records, stamping it with the current time
    ///
    /// `total_products` is computed here from the batch itself.
    pub fn new(
        source: impl Into<String>,
        category: impl Into<String>,
        products: Vec<ProductRecord>,
        metadata: EnvelopeMetadata,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
            category: category.into(),
            total_products: products.len(),
            products,
            metadata,
        }
    }
}
