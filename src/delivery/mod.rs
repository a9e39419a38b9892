//! Delivery module for handing the extracted batch to the webhook
//!
//! One envelope, one POST, no retries. The outcome is logged and reported
//! as a boolean to the pipeline.

mod client;

pub use client::WebhookClient;
