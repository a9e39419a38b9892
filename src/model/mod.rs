//! Data model for extracted products and the delivery envelope
//!
//! This module contains:
//! - `ProductRecord`: one product card as read from the listing page
//! - `DeliveryEnvelope`: the batch plus run metadata sent downstream

mod envelope;
mod product;

pub use envelope::{DeliveryEnvelope, EnvelopeMetadata};
pub use product::{ProductRecord, NOT_AVAILABLE};
